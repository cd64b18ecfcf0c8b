//! todolang_compiler: Compiler orchestration.
//!
//! Drives the lexer and parser over every source file of a compilation,
//! turns their errors into diagnostics and summarizes the result. Files
//! are independent, so `Compilation::check` parses them in parallel, each
//! into its own arena.

use std::path::Path;

use bumpalo::Bump;
use miette::Diagnostic as MietteDiagnostic;
use rayon::prelude::*;
use thiserror::Error;
use todolang_ast::Program;
use todolang_diagnostics::{Diagnostic, DiagnosticCollection, LexerError, ParseError};
use todolang_lexer::Lexer;
use todolang_options::CompilerOptions;
use todolang_parser::Parser;
use tracing::{debug, info, warn};

/// Errors that abort compilation of a file.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexerError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("cannot read '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not valid UTF-8 (first invalid byte at offset {valid_up_to})")]
    InvalidUtf8 { path: String, valid_up_to: usize },
}

// Written out by hand rather than derived: the derive forwards transparent
// variants via method-call syntax, which resolves to the inherent
// `LexerError::code`/`ParseError::code` (returning `u32`) instead of the
// trait method.
impl CompileError {
    fn transparent_inner(&self) -> Option<&dyn MietteDiagnostic> {
        match self {
            CompileError::Lex(e) => Some(e),
            CompileError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl MietteDiagnostic for CompileError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            CompileError::Lex(e) => MietteDiagnostic::code(e),
            CompileError::Parse(e) => MietteDiagnostic::code(e),
            CompileError::Io { .. } => Some(Box::new("todolang::io")),
            CompileError::InvalidUtf8 { .. } => Some(Box::new("todolang::encoding")),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        self.transparent_inner().and_then(|e| e.severity())
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.transparent_inner().and_then(|e| e.help())
    }

    fn url<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.transparent_inner().and_then(|e| e.url())
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.transparent_inner().and_then(|e| e.source_code())
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        self.transparent_inner().and_then(|e| e.labels())
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn MietteDiagnostic> + 'a>> {
        self.transparent_inner().and_then(|e| e.related())
    }

    fn diagnostic_source(&self) -> Option<&dyn MietteDiagnostic> {
        self.transparent_inner().and_then(|e| e.diagnostic_source())
    }
}

/// A source file of a compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

/// The result of lexing and parsing one file.
#[derive(Debug)]
pub struct ParseOutcome<'a> {
    /// The parsed program. `None` when lexing failed, or when parsing failed
    /// without recovery.
    pub program: Option<Program<'a>>,
    /// Errors and warnings for this file, sorted by position.
    pub diagnostics: DiagnosticCollection,
    /// Number of tokens produced by the lexer, EOF and comments included.
    pub token_count: usize,
}

/// Lex and parse `text`, allocating the tree in `arena`.
///
/// With `options.recover()` the parser reports every syntax error it can
/// find and keeps the declarations it could parse. Errors beyond
/// `options.max_errors()` are dropped; `0` keeps all of them.
pub fn parse_source<'a>(
    arena: &'a Bump,
    file_name: &str,
    text: &'a str,
    options: &CompilerOptions,
) -> ParseOutcome<'a> {
    let mut diagnostics = DiagnosticCollection::new();
    let mut lexer = Lexer::new(text);
    let tokens = lexer.tokenize();
    for warning in lexer.take_diagnostics().into_diagnostics() {
        diagnostics.add(warning.in_file(file_name));
    }

    let tokens = match tokens {
        Ok(tokens) => tokens,
        Err(error) => {
            debug!(file = file_name, error = %error, "lexing failed");
            diagnostics.add(Diagnostic::from(&error).in_file(file_name));
            return ParseOutcome {
                program: None,
                diagnostics,
                token_count: 0,
            };
        }
    };
    let token_count = tokens.len();
    debug!(file = file_name, tokens = token_count, "tokenized");

    let parser = Parser::with_source(arena, tokens, text);
    let program = if options.recover() {
        let (program, errors) = parser.parse_with_recovery();
        if !errors.is_empty() {
            warn!(file = file_name, errors = errors.len(), "recovered from syntax errors");
        }
        for error in &errors {
            diagnostics.add(Diagnostic::from(error).in_file(file_name));
        }
        Some(program)
    } else {
        match parser.parse() {
            Ok(program) => Some(program),
            Err(error) => {
                diagnostics.add(Diagnostic::from(&error).in_file(file_name));
                None
            }
        }
    };
    if let Some(program) = &program {
        debug!(file = file_name, declarations = program.declarations.len(), "parsed");
    }

    let max_errors = options.max_errors();
    if max_errors > 0 {
        diagnostics.truncate_errors(max_errors);
    }
    diagnostics.sort();

    ParseOutcome {
        program,
        diagnostics,
        token_count,
    }
}

/// Lex and parse `text`, stopping at the first error of either stage.
pub fn parse_program<'a>(arena: &'a Bump, text: &'a str) -> Result<Program<'a>, CompileError> {
    let tokens = Lexer::new(text).tokenize()?;
    Ok(Parser::with_source(arena, tokens, text).parse()?)
}

/// Read a file, validating its encoding.
pub fn read_source_file(path: &Path) -> Result<SourceFile, CompileError> {
    let name = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| CompileError::Io {
        path: name.clone(),
        source,
    })?;
    let text = simdutf8::compat::from_utf8(&bytes).map_err(|e| CompileError::InvalidUtf8 {
        path: name.clone(),
        valid_up_to: e.valid_up_to(),
    })?;
    Ok(SourceFile {
        name,
        text: text.to_owned(),
    })
}

/// Per-file counts from a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub file_name: String,
    pub token_count: usize,
    pub declaration_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

/// The outcome of checking every file of a compilation.
#[derive(Debug, Clone, Default)]
pub struct CompilationResult {
    /// One summary per file, in the order the files were added.
    pub files: Vec<FileSummary>,
    /// Diagnostics of all files, sorted by file and position.
    pub diagnostics: DiagnosticCollection,
}

impl CompilationResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.error_count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.warning_count()
    }
}

/// A set of source files checked together under one set of options.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    /// Compiler options.
    pub options: CompilerOptions,
    sources: Vec<SourceFile>,
}

impl Compilation {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            sources: Vec::new(),
        }
    }

    /// Add a source file to the compilation.
    pub fn add_source(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.sources.push(SourceFile {
            name: name.into(),
            text: text.into(),
        });
    }

    /// Load files from disk. Stops at the first file that cannot be read.
    pub fn load_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), CompileError> {
        for path in paths {
            let source = read_source_file(path.as_ref())?;
            debug!(file = %source.name, bytes = source.text.len(), "loaded");
            self.sources.push(source);
        }
        Ok(())
    }

    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    pub fn source(&self, name: &str) -> Option<&SourceFile> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Lex and parse every file and collect their diagnostics.
    pub fn check(&self) -> CompilationResult {
        let outcomes: Vec<(FileSummary, DiagnosticCollection)> =
            self.sources.par_iter().map(|s| self.check_file(s)).collect();

        let mut result = CompilationResult::default();
        for (summary, diagnostics) in outcomes {
            result.files.push(summary);
            result.diagnostics.extend(diagnostics);
        }
        result.diagnostics.sort();

        info!(
            files = result.files.len(),
            errors = result.error_count(),
            warnings = result.warning_count(),
            "check finished"
        );
        result
    }

    fn check_file(&self, source: &SourceFile) -> (FileSummary, DiagnosticCollection) {
        let arena = Bump::new();
        let outcome = parse_source(&arena, &source.name, &source.text, &self.options);
        let summary = FileSummary {
            file_name: source.name.clone(),
            token_count: outcome.token_count,
            declaration_count: outcome.program.as_ref().map_or(0, |p| p.declarations.len()),
            error_count: outcome.diagnostics.error_count(),
            warning_count: outcome.diagnostics.warning_count(),
        };
        (summary, outcome.diagnostics)
    }
}
