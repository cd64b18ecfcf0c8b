//! todolang_options: todolang.json parsing and compiler options.
//!
//! Parses project configuration files, provides the `CompilerOptions`
//! structure used by the driver, and discovers the source files a project
//! includes.

mod discovery;

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use discovery::{discover_source_files, find_config_file, glob_to_regex};

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "todolang.json";

/// Extension of TodoLang source files, without the dot.
pub const SOURCE_EXTENSION: &str = "todo";

/// Diagnostics reported per file when `maxErrors` is not set.
pub const DEFAULT_MAX_ERRORS: usize = 20;

/// Include pattern used when a project does not list any.
pub const DEFAULT_INCLUDE: &str = "**/*.todo";

/// Compiler options, matching the `compilerOptions` object of todolang.json.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Keep parsing after a syntax error and report every error found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recover: Option<bool>,
    /// Maximum number of errors reported per file. `0` means no limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_errors: Option<usize>,
}

impl CompilerOptions {
    pub fn recover(&self) -> bool {
        self.recover.unwrap_or(false)
    }

    pub fn max_errors(&self) -> usize {
        self.max_errors.unwrap_or(DEFAULT_MAX_ERRORS)
    }

    /// Overlay the options set in `other` on top of these.
    pub fn merge(&mut self, other: &CompilerOptions) {
        if other.recover.is_some() {
            self.recover = other.recover;
        }
        if other.max_errors.is_some() {
            self.max_errors = other.max_errors;
        }
    }
}

/// The todolang.json file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoLangConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_options: Option<CompilerOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
}

impl TodoLangConfig {
    /// The configuration written by `tlc --init`.
    pub fn init_default() -> Self {
        Self {
            compiler_options: Some(CompilerOptions {
                recover: Some(true),
                max_errors: Some(DEFAULT_MAX_ERRORS),
            }),
            include: Some(vec![format!("src/{}", DEFAULT_INCLUDE)]),
            exclude: Some(vec!["dist".to_string()]),
            files: None,
        }
    }

    pub fn options(&self) -> CompilerOptions {
        self.compiler_options.clone().unwrap_or_default()
    }

    pub fn include_patterns(&self) -> Vec<String> {
        match &self.include {
            Some(include) => include.clone(),
            None => vec![DEFAULT_INCLUDE.to_string()],
        }
    }

    pub fn exclude_patterns(&self) -> &[String] {
        self.exclude.as_deref().unwrap_or(&[])
    }

    /// Source files of the project rooted at `root`.
    pub fn source_files(&self, root: &Path) -> Result<Vec<PathBuf>, ConfigError> {
        discover_source_files(
            root,
            &self.include_patterns(),
            self.exclude_patterns(),
            self.files.as_deref(),
        )
    }

    pub fn to_json_pretty(&self) -> String {
        // Serializing plain strings, bools and integers cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Errors from loading a project configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("cannot read '{path}'")]
    #[diagnostic(code(todolang::config::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration{}", path_suffix(.path))]
    #[diagnostic(code(todolang::config::parse), help("see `tlc --init` for a valid todolang.json"))]
    Parse {
        path: Option<String>,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid file pattern '{pattern}'")]
    #[diagnostic(code(todolang::config::pattern))]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

fn path_suffix(path: &Option<String>) -> String {
    match path {
        Some(path) => format!(" in '{}'", path),
        None => String::new(),
    }
}

/// Parse a todolang.json file from a string.
pub fn parse_config(content: &str) -> Result<TodoLangConfig, ConfigError> {
    serde_json::from_str(content).map_err(|source| ConfigError::Parse { path: None, source })
}

/// Parse a todolang.json file from a path.
pub fn parse_config_file(path: &Path) -> Result<TodoLangConfig, ConfigError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: Some(display),
        source,
    })
}
