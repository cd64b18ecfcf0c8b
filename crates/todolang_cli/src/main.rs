//! tlc: The TodoLang compiler front end CLI.
//!
//! Usage:
//!   tlc [options] [file...]
//!
//! Checks TodoLang sources for lexical and syntax errors, and can dump the
//! token stream or the syntax tree of each file.

mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use bumpalo::Bump;
use clap::{ArgAction, Parser as ClapParser};
use miette::{IntoDiagnostic, MietteHandlerOpts, Result};
use todolang_compiler::{parse_source, Compilation};
use todolang_diagnostics::{Diagnostic, DiagnosticCollection};
use todolang_lexer::Lexer;
use todolang_options::{find_config_file, parse_config_file, CompilerOptions, TodoLangConfig, CONFIG_FILE_NAME};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::report::SourceDiagnostic;

#[derive(ClapParser, Debug)]
#[command(name = "tlc", version, about = "tlc - the TodoLang compiler front end")]
struct Cli {
    /// TodoLang files to check.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to todolang.json, or a directory containing one.
    #[arg(short = 'p', long = "project")]
    project: Option<PathBuf>,

    /// Print the tokens of each file instead of parsing it.
    #[arg(long, conflicts_with = "ast")]
    tokens: bool,

    /// Print the syntax tree of each file as JSON.
    #[arg(long)]
    ast: bool,

    /// Keep parsing after a syntax error and report every error found.
    #[arg(long)]
    recover: bool,

    /// Maximum number of errors reported per file (0 for no limit).
    #[arg(long = "max-errors", value_name = "N")]
    max_errors: Option<usize>,

    /// Write a default todolang.json to the current directory.
    #[arg(long)]
    init: bool,

    /// List all files that are part of the compilation.
    #[arg(long = "list-files")]
    list_files: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

const EXIT_FAILURE: u8 = 1;
const EXIT_DIAGNOSTICS: u8 = 2;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GRAY: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version are not errors
            return if err.use_stderr() {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.verbose);
    let use_color = atty_is_terminal();
    install_report_hook(use_color);

    match run(&cli, use_color) {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{:?}", report);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn directive_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Logs go to stderr so they never mix with `--tokens` or `--ast` output.
/// `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn install_report_hook(use_color: bool) {
    let installed = miette::set_hook(Box::new(move |_| {
        Box::new(
            MietteHandlerOpts::new()
                .color(use_color)
                .unicode(use_color)
                .context_lines(2)
                .build(),
        )
    }));
    if let Err(err) = installed {
        debug!(error = %err, "report hook already installed");
    }
}

fn run(cli: &Cli, use_color: bool) -> Result<ExitCode> {
    if cli.init {
        return run_init();
    }

    let start = Instant::now();
    let (files, config) = resolve_input_files(cli)?;
    if files.is_empty() {
        print_error("no input files found", use_color);
        return Ok(ExitCode::from(EXIT_FAILURE));
    }

    if cli.list_files {
        for file in &files {
            println!("{}", file.display());
        }
    }

    let mut options = config.as_ref().map(TodoLangConfig::options).unwrap_or_default();
    options.merge(&CompilerOptions {
        recover: cli.recover.then_some(true),
        max_errors: cli.max_errors,
    });
    debug!(?options, "resolved compiler options");

    let mut compilation = Compilation::new(options);
    compilation.load_files(&files)?;

    let diagnostics = if cli.tokens {
        print_tokens(&compilation)
    } else if cli.ast {
        print_ast(&compilation)?
    } else {
        compilation.check().diagnostics
    };

    for diagnostic in diagnostics.diagnostics() {
        print_diagnostic(&compilation, diagnostic);
    }

    let elapsed = start.elapsed();
    info!(files = files.len(), elapsed_ms = elapsed.as_millis() as u64, "done");

    let warnings = diagnostics.warning_count();
    if diagnostics.has_errors() {
        let count = diagnostics.error_count();
        let summary = format!(
            "Found {} error{}{}.",
            count,
            if count == 1 { "" } else { "s" },
            warning_suffix(warnings)
        );
        if use_color {
            eprintln!("\n{}{}{}", RED, summary, RESET);
        } else {
            eprintln!("\n{}", summary);
        }
        return Ok(ExitCode::from(EXIT_DIAGNOSTICS));
    }

    if warnings > 0 {
        let summary = format!("Found {} warning{}.", warnings, if warnings == 1 { "" } else { "s" });
        if use_color {
            eprintln!("\n{}{}{}", YELLOW, summary, RESET);
        } else {
            eprintln!("\n{}", summary);
        }
    }

    if use_color {
        eprintln!(
            "{}Checked {} file{} in {:.2}s.{}",
            GRAY,
            files.len(),
            if files.len() == 1 { "" } else { "s" },
            elapsed.as_secs_f64(),
            RESET
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn warning_suffix(warnings: usize) -> String {
    match warnings {
        0 => String::new(),
        1 => " and 1 warning".to_string(),
        n => format!(" and {} warnings", n),
    }
}

/// Decide which files to check.
///
/// An explicit `--project` wins, then files named on the command line, then
/// a todolang.json found in the working directory or one of its parents.
fn resolve_input_files(cli: &Cli) -> Result<(Vec<PathBuf>, Option<TodoLangConfig>)> {
    if let Some(project) = &cli.project {
        let config_path = if project.is_dir() {
            project.join(CONFIG_FILE_NAME)
        } else {
            project.clone()
        };
        let (files, config) = load_project(&config_path)?;
        return Ok((files, Some(config)));
    }

    if !cli.files.is_empty() {
        return Ok((cli.files.clone(), None));
    }

    let cwd = std::env::current_dir().into_diagnostic()?;
    match find_config_file(&cwd) {
        Some(config_path) => {
            let (files, config) = load_project(&config_path)?;
            Ok((files, Some(config)))
        }
        None => Ok((Vec::new(), None)),
    }
}

fn load_project(config_path: &Path) -> Result<(Vec<PathBuf>, TodoLangConfig)> {
    let config = parse_config_file(config_path)?;
    let root = config_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let files = config.source_files(root)?;
    info!(config = %config_path.display(), files = files.len(), "loaded project");
    Ok((files, config))
}

fn run_init() -> Result<ExitCode> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        miette::bail!("a {} file already exists in the current directory", CONFIG_FILE_NAME);
    }
    let mut content = TodoLangConfig::init_default().to_json_pretty();
    content.push('\n');
    std::fs::write(config_path, content).into_diagnostic()?;
    println!("Created a new {}.", CONFIG_FILE_NAME);
    Ok(ExitCode::SUCCESS)
}

fn print_tokens(compilation: &Compilation) -> DiagnosticCollection {
    let mut diagnostics = DiagnosticCollection::new();
    let with_headers = compilation.sources().len() > 1;
    for source in compilation.sources() {
        if with_headers {
            println!("// {}", source.name);
        }
        let mut lexer = Lexer::new(&source.text);
        let tokens = lexer.tokenize();
        for warning in lexer.take_diagnostics().into_diagnostics() {
            diagnostics.add(warning.in_file(&source.name));
        }
        match tokens {
            Ok(tokens) => {
                for token in &tokens {
                    println!("{}", token);
                }
            }
            Err(error) => diagnostics.add(Diagnostic::from(&error).in_file(&source.name)),
        }
    }
    diagnostics.sort();
    diagnostics
}

fn print_ast(compilation: &Compilation) -> Result<DiagnosticCollection> {
    let mut diagnostics = DiagnosticCollection::new();
    for source in compilation.sources() {
        let arena = Bump::new();
        let outcome = parse_source(&arena, &source.name, &source.text, &compilation.options);
        if let Some(program) = &outcome.program {
            let json = serde_json::to_string_pretty(program).into_diagnostic()?;
            println!("{}", json);
        }
        diagnostics.extend(outcome.diagnostics);
    }
    diagnostics.sort();
    Ok(diagnostics)
}

/// Render a diagnostic with its source snippet when the file and span are
/// known, as a single line otherwise.
fn print_diagnostic(compilation: &Compilation, diagnostic: &Diagnostic) {
    let source = diagnostic.file.as_deref().and_then(|name| compilation.source(name));
    match source {
        Some(source) if diagnostic.span.is_some() => {
            let report = miette::Report::new(SourceDiagnostic::new(diagnostic, &source.name, &source.text));
            eprintln!("{:?}", report);
        }
        _ => eprintln!("{}", diagnostic),
    }
}

fn print_error(msg: &str, use_color: bool) {
    if use_color {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

fn atty_is_terminal() -> bool {
    // On Unix, check whether stderr is a terminal
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
