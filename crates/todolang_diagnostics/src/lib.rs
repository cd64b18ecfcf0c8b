//! todolang_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! This crate defines the diagnostic message catalog used by the TodoLang
//! front end, the structured [`LexerError`] and [`ParseError`] values the
//! lexer and parser return, and the [`Diagnostic`] records the driver
//! accumulates for reporting.

mod error;

pub use error::{LexErrorKind, LexerError, ParseError, ParseErrorKind};

use serde::Serialize;
use std::fmt;
use todolang_core::text::{Location, TextSpan};

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    /// The diagnostic code, rendered as `TL<code>`.
    pub code: u32,
    /// The category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The file path where this diagnostic occurred, if any.
    pub file: Option<String>,
    /// The byte span this diagnostic covers, if any.
    pub span: Option<TextSpan>,
    /// The 1-based line/column of the diagnostic, if any.
    pub location: Option<Location>,
    /// The resolved message text.
    pub message_text: String,
    /// The diagnostic code.
    pub code: u32,
    /// The category.
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Create a new diagnostic without location info (global diagnostic).
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            location: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Create a new diagnostic anchored at a source position.
    pub fn with_location(
        location: Location,
        span: TextSpan,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: None,
            span: Some(span),
            location: Some(location),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Attach the file this diagnostic belongs to.
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(location) = self.location {
                write!(f, "({},{})", location.line, location.column)?;
            }
            write!(f, ": ")?;
        } else if let Some(location) = self.location {
            write!(f, "({},{}): ", location.line, location.column)?;
        }
        write!(f, "{} TL{}: {}", self.category, self.code, self.message_text)
    }
}

impl From<&LexerError> for Diagnostic {
    fn from(error: &LexerError) -> Self {
        let args = error.kind.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        Diagnostic::with_location(error.location, error.span, error.kind.diagnostic_message(), &args)
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(error: &ParseError) -> Self {
        let args = error.kind.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        Diagnostic::with_location(error.location, error.span, error.kind.diagnostic_message(), &args)
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated during compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| !d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Keep only the first `max` error diagnostics; warnings are never dropped.
    pub fn truncate_errors(&mut self, max: usize) {
        let mut seen = 0usize;
        self.diagnostics.retain(|d| {
            if !d.is_error() {
                return true;
            }
            seen += 1;
            seen <= max
        });
    }

    /// Sort diagnostics by file and position.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| a.location.cmp(&b.location))
                .then_with(|| a.code.cmp(&b.code))
        });
    }
}

impl FromIterator<Diagnostic> for DiagnosticCollection {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self {
            diagnostics: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Lexer diagnostics (1000-1099)
    // ========================================================================
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1001, Error, "unterminated string literal");
    pub const UNTERMINATED_BLOCK_COMMENT: DiagnosticMessage = diag!(1002, Error, "unterminated block comment");
    pub const UNEXPECTED_CHARACTER_0: DiagnosticMessage = diag!(1003, Error, "unexpected character '{0}'");
    pub const UNKNOWN_ESCAPE_SEQUENCE_0: DiagnosticMessage = diag!(1050, Warning, "unknown escape sequence '\\{0}'");

    // ========================================================================
    // Parser diagnostics (2000-2099)
    // ========================================================================
    pub const EXPECTED_0_GOT_1: DiagnosticMessage = diag!(2001, Error, "expected {0}, got {1}");
    pub const EXPRESSION_EXPECTED_GOT_0: DiagnosticMessage = diag!(2002, Error, "expected expression, got {0}");
    pub const DECLARATION_EXPECTED_GOT_0: DiagnosticMessage = diag!(2003, Error, "expected 'component', 'model' or 'service', got {0}");
    pub const MEMBER_EXPECTED_IN_0_GOT_1: DiagnosticMessage = diag!(2004, Error, "expected a member of {0}, got {1}");
    pub const TYPE_NAME_EXPECTED_GOT_0: DiagnosticMessage = diag!(2005, Error, "expected type name, got {0}");
    pub const DUPLICATE_STATE_BLOCK_IN_COMPONENT_0: DiagnosticMessage = diag!(2010, Error, "duplicate state block in component '{0}'");
    pub const DUPLICATE_RENDER_BLOCK_IN_COMPONENT_0: DiagnosticMessage = diag!(2011, Error, "duplicate render block in component '{0}'");
    pub const MISMATCHED_CLOSING_TAG_EXPECTED_0_GOT_1: DiagnosticMessage = diag!(2020, Error, "mismatched closing tag: expected '</{0}>', got '</{1}>'");
    pub const UNTERMINATED_MARKUP_ELEMENT_0: DiagnosticMessage = diag!(2021, Error, "unterminated markup element '<{0}>'");
    pub const INVALID_ASSIGNMENT_TARGET: DiagnosticMessage = diag!(2030, Error, "invalid assignment target");
    pub const MAXIMUM_NESTING_DEPTH_0_EXCEEDED: DiagnosticMessage = diag!(2040, Error, "maximum nesting depth of {0} exceeded");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let result = format_message("expected {0}, got {1}", &["'{'", "end of file"]);
        assert_eq!(result, "expected '{', got end of file");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::with_location(
            Location::new(3, 7),
            TextSpan::new(20, 1),
            &messages::UNEXPECTED_CHARACTER_0,
            &["@"],
        )
        .in_file("todo.todo");
        assert_eq!(
            diag.to_string(),
            "todo.todo(3,7): error TL1003: unexpected character '@'"
        );
    }

    #[test]
    fn test_diagnostic_without_location() {
        let diag = Diagnostic::new(&messages::INVALID_ASSIGNMENT_TARGET, &[]);
        assert!(diag.file.is_none());
        assert!(diag.span.is_none());
        assert_eq!(diag.code, 2030);
        assert!(diag.is_error());
        assert_eq!(diag.to_string(), "error TL2030: invalid assignment target");
    }

    #[test]
    fn test_diagnostic_collection() {
        let mut collection = DiagnosticCollection::new();
        assert!(collection.is_empty());

        collection.add(Diagnostic::new(&messages::UNKNOWN_ESCAPE_SEQUENCE_0, &["q"]));
        assert!(!collection.has_errors());
        assert_eq!(collection.warning_count(), 1);

        collection.add(Diagnostic::new(&messages::INVALID_ASSIGNMENT_TARGET, &[]));
        assert!(collection.has_errors());
        assert_eq!(collection.error_count(), 1);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_diagnostic_collection_sort() {
        let at = |file: &str, line: u32| {
            Diagnostic::with_location(
                Location::new(line, 1),
                TextSpan::empty(0),
                &messages::INVALID_ASSIGNMENT_TARGET,
                &[],
            )
            .in_file(file)
        };
        let mut collection: DiagnosticCollection =
            vec![at("b.todo", 1), at("a.todo", 9), at("a.todo", 2)].into_iter().collect();
        collection.sort();
        let order: Vec<_> = collection
            .diagnostics()
            .iter()
            .map(|d| (d.file.clone().unwrap_or_default(), d.location.map(|l| l.line)))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a.todo".to_string(), Some(2)),
                ("a.todo".to_string(), Some(9)),
                ("b.todo".to_string(), Some(1)),
            ]
        );
    }

    #[test]
    fn test_truncate_errors_keeps_warnings() {
        let mut collection = DiagnosticCollection::new();
        for _ in 0..3 {
            collection.add(Diagnostic::new(&messages::INVALID_ASSIGNMENT_TARGET, &[]));
        }
        collection.add(Diagnostic::new(&messages::UNKNOWN_ESCAPE_SEQUENCE_0, &["q"]));
        collection.truncate_errors(1);
        assert_eq!(collection.error_count(), 1);
        assert_eq!(collection.warning_count(), 1);
    }
}
