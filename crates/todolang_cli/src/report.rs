//! Rich diagnostic rendering using miette.
//!
//! Converts compiler diagnostics into miette reports with the offending
//! source line and a label under the reported span.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, NamedSource, Severity, SourceCode, SourceSpan};
use thiserror::Error;
use todolang_diagnostics::{Diagnostic, DiagnosticCategory};

/// A compiler diagnostic paired with the text of its file.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SourceDiagnostic {
    pub category: DiagnosticCategory,
    /// Rendered code, e.g. `TL2001`.
    pub code: String,
    pub message: String,
    pub src: NamedSource<String>,
    pub span: Option<SourceSpan>,
}

impl SourceDiagnostic {
    pub fn new(diagnostic: &Diagnostic, file_name: &str, source: &str) -> Self {
        Self {
            category: diagnostic.category,
            code: format!("TL{}", diagnostic.code),
            message: diagnostic.message_text.clone(),
            src: NamedSource::new(file_name, source.to_string()),
            span: diagnostic.span.map(SourceSpan::from),
        }
    }
}

impl MietteDiagnostic for SourceDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.code))
    }

    fn severity(&self) -> Option<Severity> {
        Some(match self.category {
            DiagnosticCategory::Error => Severity::Error,
            DiagnosticCategory::Warning => Severity::Warning,
        })
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        let label = match self.category {
            DiagnosticCategory::Error => "error here",
            DiagnosticCategory::Warning => "warning here",
        };
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(label.to_string()),
            span,
        ))))
    }
}
