//! Structured lexer and parser errors.
//!
//! Each error carries a kind, the 1-based location of the offending
//! character or token, and its byte span. The `Display` text is
//! `"<message> at line L, column C"`, and the span is exposed to `miette`
//! as a label so the CLI can render a source snippet.

// miette's derive macro expands to assignments that rustc reports as unused.
#![allow(unused_assignments)]

use crate::messages;
use crate::DiagnosticMessage;
use miette::Diagnostic;
use std::fmt;
use thiserror::Error;
use todolang_core::text::{Location, TextSpan};

// ============================================================================
// Lexer errors
// ============================================================================

/// The kind of lexical error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A string literal reached end of input before its closing quote.
    UnterminatedString,
    /// A `/*` comment reached end of input before `*/`.
    UnterminatedComment,
    /// A character that starts no token.
    UnexpectedCharacter(char),
}

impl LexErrorKind {
    pub fn diagnostic_message(&self) -> &'static DiagnosticMessage {
        match self {
            LexErrorKind::UnterminatedString => &messages::UNTERMINATED_STRING_LITERAL,
            LexErrorKind::UnterminatedComment => &messages::UNTERMINATED_BLOCK_COMMENT,
            LexErrorKind::UnexpectedCharacter(_) => &messages::UNEXPECTED_CHARACTER_0,
        }
    }

    pub(crate) fn args(&self) -> Vec<String> {
        match self {
            LexErrorKind::UnexpectedCharacter(ch) => vec![ch.to_string()],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        f.write_str(&crate::format_message(self.diagnostic_message().message, &args))
    }
}

/// An error produced while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind} at line {}, column {}", .location.line, .location.column)]
#[diagnostic(code(todolang::lexer))]
pub struct LexerError {
    pub kind: LexErrorKind,
    pub location: Location,
    #[label("{kind}")]
    pub span: TextSpan,
}

impl LexerError {
    pub fn new(kind: LexErrorKind, location: Location, span: TextSpan) -> Self {
        Self {
            kind,
            location,
            span,
        }
    }

    /// The message text without the position suffix.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn code(&self) -> u32 {
        self.kind.diagnostic_message().code
    }
}

// ============================================================================
// Parser errors
// ============================================================================

/// The kind of syntax error.
///
/// Token descriptions (`expected`, `found`) are already quoted for display,
/// e.g. `"'{'"`, `"identifier 'foo'"` or `"end of file"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedToken { expected: String, found: String },
    ExpressionExpected { found: String },
    DeclarationExpected { found: String },
    MemberExpected { container: String, found: String },
    TypeNameExpected { found: String },
    DuplicateState { component: String },
    DuplicateRender { component: String },
    MismatchedClosingTag { expected: String, found: String },
    UnterminatedElement { tag: String },
    InvalidAssignmentTarget,
    NestingTooDeep { limit: u32 },
}

impl ParseErrorKind {
    pub fn diagnostic_message(&self) -> &'static DiagnosticMessage {
        match self {
            ParseErrorKind::UnexpectedToken { .. } => &messages::EXPECTED_0_GOT_1,
            ParseErrorKind::ExpressionExpected { .. } => &messages::EXPRESSION_EXPECTED_GOT_0,
            ParseErrorKind::DeclarationExpected { .. } => &messages::DECLARATION_EXPECTED_GOT_0,
            ParseErrorKind::MemberExpected { .. } => &messages::MEMBER_EXPECTED_IN_0_GOT_1,
            ParseErrorKind::TypeNameExpected { .. } => &messages::TYPE_NAME_EXPECTED_GOT_0,
            ParseErrorKind::DuplicateState { .. } => &messages::DUPLICATE_STATE_BLOCK_IN_COMPONENT_0,
            ParseErrorKind::DuplicateRender { .. } => &messages::DUPLICATE_RENDER_BLOCK_IN_COMPONENT_0,
            ParseErrorKind::MismatchedClosingTag { .. } => {
                &messages::MISMATCHED_CLOSING_TAG_EXPECTED_0_GOT_1
            }
            ParseErrorKind::UnterminatedElement { .. } => &messages::UNTERMINATED_MARKUP_ELEMENT_0,
            ParseErrorKind::InvalidAssignmentTarget => &messages::INVALID_ASSIGNMENT_TARGET,
            ParseErrorKind::NestingTooDeep { .. } => &messages::MAXIMUM_NESTING_DEPTH_0_EXCEEDED,
        }
    }

    pub(crate) fn args(&self) -> Vec<String> {
        match self {
            ParseErrorKind::UnexpectedToken { expected, found } => {
                vec![expected.clone(), found.clone()]
            }
            ParseErrorKind::ExpressionExpected { found }
            | ParseErrorKind::DeclarationExpected { found }
            | ParseErrorKind::TypeNameExpected { found } => vec![found.clone()],
            ParseErrorKind::MemberExpected { container, found } => {
                vec![container.clone(), found.clone()]
            }
            ParseErrorKind::DuplicateState { component }
            | ParseErrorKind::DuplicateRender { component } => vec![component.clone()],
            ParseErrorKind::MismatchedClosingTag { expected, found } => {
                vec![expected.clone(), found.clone()]
            }
            ParseErrorKind::UnterminatedElement { tag } => vec![tag.clone()],
            ParseErrorKind::InvalidAssignmentTarget => Vec::new(),
            ParseErrorKind::NestingTooDeep { limit } => vec![limit.to_string()],
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        f.write_str(&crate::format_message(self.diagnostic_message().message, &args))
    }
}

/// An error produced while parsing a token stream.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind} at line {}, column {}", .location.line, .location.column)]
#[diagnostic(code(todolang::parser))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub location: Location,
    #[label("{kind}")]
    pub span: TextSpan,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, location: Location, span: TextSpan) -> Self {
        Self {
            kind,
            location,
            span,
        }
    }

    /// The message text without the position suffix.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn code(&self) -> u32 {
        self.kind.diagnostic_message().code
    }
}
