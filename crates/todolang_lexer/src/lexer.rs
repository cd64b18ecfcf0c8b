//! The TodoLang lexer.
//!
//! Converts source text into a stream of [`Token`]s in a single left-to-right
//! pass. Whitespace is skipped, comments are kept as `CommentTrivia` tokens,
//! and the stream always ends with exactly one `EndOfFileToken`.

use crate::token::Token;
use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use todolang_ast::syntax_kind::SyntaxKind;
use todolang_core::text::{Location, TextSpan};
use todolang_diagnostics::{
    messages, Diagnostic, DiagnosticCollection, LexErrorKind, LexerError,
};

lazy_static! {
    /// Reserved words, built once from the keyword kinds.
    static ref KEYWORDS: FxHashMap<&'static str, SyntaxKind> = SyntaxKind::KEYWORDS
        .iter()
        .filter_map(|&kind| kind.keyword_text().map(|text| (text, kind)))
        .collect();
}

/// Look up the keyword kind for an identifier-shaped lexeme.
pub fn keyword_kind(text: &str) -> Option<SyntaxKind> {
    KEYWORDS.get(text).copied()
}

/// Operators that start with `ch`, longest lexeme first.
fn operator_candidates(ch: char) -> &'static [(&'static str, SyntaxKind)] {
    use SyntaxKind::*;
    match ch {
        '(' => &[("(", OpenParenToken)],
        ')' => &[(")", CloseParenToken)],
        '{' => &[("{", OpenBraceToken)],
        '}' => &[("}", CloseBraceToken)],
        '[' => &[("[", OpenBracketToken)],
        ']' => &[("]", CloseBracketToken)],
        ';' => &[(";", SemicolonToken)],
        ',' => &[(",", CommaToken)],
        ':' => &[(":", ColonToken)],
        '.' => &[(".", DotToken)],
        '?' => &[("?", QuestionToken)],
        '<' => &[("</", LessThanSlashToken), ("<=", LessThanEqualsToken), ("<", LessThanToken)],
        '>' => &[(">=", GreaterThanEqualsToken), (">", GreaterThanToken)],
        '=' => &[("==", EqualsEqualsToken), ("=", EqualsToken)],
        '!' => &[("!=", ExclamationEqualsToken), ("!", ExclamationToken)],
        '+' => &[("++", PlusPlusToken), ("+=", PlusEqualsToken), ("+", PlusToken)],
        '-' => &[("--", MinusMinusToken), ("-=", MinusEqualsToken), ("-", MinusToken)],
        '*' => &[("*=", AsteriskEqualsToken), ("*", AsteriskToken)],
        '/' => &[("/>", SlashGreaterThanToken), ("/=", SlashEqualsToken), ("/", SlashToken)],
        '%' => &[("%", PercentToken)],
        '&' => &[("&&", AmpersandAmpersandToken)],
        '|' => &[("||", BarBarToken)],
        _ => &[],
    }
}

/// The lexer converts TodoLang source text into tokens.
pub struct Lexer<'s> {
    /// The source text being scanned.
    text: &'s str,
    /// Current byte offset.
    pos: usize,
    line: u32,
    column: u32,
    /// Set once the end-of-file token has been produced.
    finished: bool,
    /// Non-fatal diagnostics (unknown escape sequences).
    diagnostics: DiagnosticCollection,
}

impl<'s> Lexer<'s> {
    /// Create a new lexer for the given source text.
    pub fn new(text: &'s str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
            column: 1,
            finished: false,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Scan the whole input. The result always ends with one EOF token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::with_capacity(self.text.len() / 4 + 1);
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Scan a single token. Once the input is exhausted every call returns
    /// an EOF token.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();

        let start = self.pos;
        let location = self.location();

        let ch = match self.current_char() {
            Some(ch) => ch,
            None => {
                self.finished = true;
                return Ok(Token::eof(location, start as u32));
            }
        };

        match ch {
            '/' if self.char_at(1) == Some('/') => Ok(self.scan_line_comment(start, location)),
            '/' if self.char_at(1) == Some('*') => self.scan_block_comment(start, location),
            '"' | '\'' => self.scan_string_literal(ch, start, location),
            '0'..='9' => Ok(self.scan_number(start, location)),
            _ if is_identifier_start(ch) => Ok(self.scan_identifier(start, location)),
            _ => self.scan_operator(ch, start, location),
        }
    }

    /// Whether the EOF token has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Get the accumulated diagnostics.
    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    /// Look at the character `offset` characters past the current one.
    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(offset)
    }

    /// Advance past the current character, updating line and column.
    #[inline]
    fn next_char(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    #[inline]
    fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    #[inline]
    fn span_from(&self, start: usize) -> TextSpan {
        TextSpan::from_bounds(start as u32, self.pos as u32)
    }

    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r' | '\n') = self.current_char() {
            self.next_char();
        }
    }

    // ========================================================================
    // Token-specific scanning methods
    // ========================================================================

    fn scan_line_comment(&mut self, start: usize, location: Location) -> Token {
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            self.next_char();
        }
        let text = &self.text[start..self.pos];
        Token::new(SyntaxKind::CommentTrivia, text, location, self.span_from(start))
    }

    fn scan_block_comment(&mut self, start: usize, location: Location) -> Result<Token, LexerError> {
        // skip `/*`
        self.next_char();
        self.next_char();
        loop {
            match self.current_char() {
                None => {
                    return Err(LexerError::new(
                        LexErrorKind::UnterminatedComment,
                        location,
                        TextSpan::new(start as u32, 2),
                    ));
                }
                Some('*') if self.char_at(1) == Some('/') => {
                    self.next_char();
                    self.next_char();
                    break;
                }
                Some(_) => {
                    self.next_char();
                }
            }
        }
        let text = &self.text[start..self.pos];
        Ok(Token::new(SyntaxKind::CommentTrivia, text, location, self.span_from(start)))
    }

    fn scan_string_literal(
        &mut self,
        quote: char,
        start: usize,
        location: Location,
    ) -> Result<Token, LexerError> {
        let unterminated = || {
            LexerError::new(LexErrorKind::UnterminatedString, location, TextSpan::new(start as u32, 1))
        };

        self.next_char(); // skip opening quote
        let mut result = String::new();
        loop {
            let ch = self.current_char().ok_or_else(unterminated)?;
            if ch == quote {
                self.next_char();
                break;
            }
            if ch == '\\' {
                let escape_start = self.pos;
                let escape_location = self.location();
                self.next_char();
                let escaped = self.next_char().ok_or_else(unterminated)?;
                match escaped {
                    'n' => result.push('\n'),
                    't' => result.push('\t'),
                    'r' => result.push('\r'),
                    '0' => result.push('\0'),
                    '"' | '\'' | '\\' => result.push(escaped),
                    other => {
                        self.diagnostics.add(Diagnostic::with_location(
                            escape_location,
                            self.span_from(escape_start),
                            &messages::UNKNOWN_ESCAPE_SEQUENCE_0,
                            &[&other.to_string()],
                        ));
                        result.push(other);
                    }
                }
                continue;
            }
            result.push(ch);
            self.next_char();
        }
        Ok(Token::new(SyntaxKind::StringLiteral, result, location, self.span_from(start)))
    }

    fn scan_digits(&mut self) {
        while let Some('0'..='9') = self.current_char() {
            self.next_char();
        }
    }

    fn scan_number(&mut self, start: usize, location: Location) -> Token {
        self.scan_digits();
        if self.current_char() == Some('.') && self.char_at(1).map_or(false, |c| c.is_ascii_digit()) {
            self.next_char();
            self.scan_digits();
        }
        let text = &self.text[start..self.pos];
        Token::new(SyntaxKind::NumericLiteral, text, location, self.span_from(start))
    }

    fn scan_identifier(&mut self, start: usize, location: Location) -> Token {
        self.next_char();
        while self.current_char().map_or(false, is_identifier_part) {
            self.next_char();
        }
        let text = &self.text[start..self.pos];
        let kind = keyword_kind(text).unwrap_or(SyntaxKind::Identifier);
        Token::new(kind, text, location, self.span_from(start))
    }

    fn scan_operator(&mut self, ch: char, start: usize, location: Location) -> Result<Token, LexerError> {
        let text = self.text;
        let rest = &text[self.pos..];
        for &(lexeme, kind) in operator_candidates(ch) {
            if rest.starts_with(lexeme) {
                for _ in 0..lexeme.len() {
                    self.next_char();
                }
                return Ok(Token::new(kind, lexeme, location, self.span_from(start)));
            }
        }
        Err(LexerError::new(
            LexErrorKind::UnexpectedCharacter(ch),
            location,
            TextSpan::new(start as u32, ch.len_utf8() as u32),
        ))
    }
}

/// Tokenize `source` in one call.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    Lexer::new(source).tokenize()
}

/// Check if a character can start an identifier.
fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_ascii_alphabetic() || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_start(ch))
}

/// Check if a character can be part of an identifier.
fn is_identifier_part(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_ascii_alphanumeric() || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_continue(ch))
}
