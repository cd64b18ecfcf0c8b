//! Tokens produced by the lexer.

use serde::Serialize;
use todolang_ast::syntax_kind::SyntaxKind;
use todolang_core::text::{Location, TextSpan};

/// A classified lexeme with its source position.
///
/// `value` holds the lexeme text, except for string literals (decoded
/// contents without quotes) and the end-of-file token (empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// The kind of token.
    pub kind: SyntaxKind,
    /// The token text.
    pub value: String,
    /// 1-based position of the first character.
    pub location: Location,
    /// Byte range in the source text.
    pub span: TextSpan,
}

impl Token {
    pub fn new(kind: SyntaxKind, value: impl Into<String>, location: Location, span: TextSpan) -> Self {
        Self {
            kind,
            value: value.into(),
            location,
            span,
        }
    }

    /// An end-of-file token positioned at `location`/`offset`.
    pub fn eof(location: Location, offset: u32) -> Self {
        Self::new(SyntaxKind::EndOfFileToken, String::new(), location, TextSpan::empty(offset))
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.location.line
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.location.column
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == SyntaxKind::EndOfFileToken
    }

    #[inline]
    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    /// A description of this token for diagnostics, e.g. `identifier 'count'`.
    pub fn describe(&self) -> String {
        match self.kind {
            SyntaxKind::Identifier => format!("identifier '{}'", self.value),
            SyntaxKind::NumericLiteral => format!("number {}", self.value),
            SyntaxKind::StringLiteral => format!("string \"{}\"", self.value.escape_default()),
            kind => kind.describe(),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} {:?}", self.location.line, self.location.column, self.kind)?;
        if !self.value.is_empty() {
            write!(f, " {:?}", self.value)?;
        }
        Ok(())
    }
}
