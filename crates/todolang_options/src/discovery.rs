//! Source file discovery for include/exclude glob patterns.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::{ConfigError, CONFIG_FILE_NAME};

/// Directories never searched by include patterns.
const SKIPPED_DIRECTORIES: &[&str] = &[".git", "node_modules", "target"];

/// Translate a glob pattern into an anchored regex over `/`-separated
/// relative paths. `**` spans directories, `*` and `?` stay within one
/// path segment.
pub fn glob_to_regex(pattern: &str) -> Result<Regex, ConfigError> {
    compile(pattern, format!("^{}$", glob_source(pattern)))
}

/// An exclude pattern matches a path itself or anything beneath it.
fn exclude_to_regex(pattern: &str) -> Result<Regex, ConfigError> {
    let trimmed = pattern.trim_end_matches('/');
    compile(pattern, format!("^{}(?:/.*)?$", glob_source(trimmed)))
}

fn compile(pattern: &str, source: String) -> Result<Regex, ConfigError> {
    Regex::new(&source).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn glob_source(pattern: &str) -> String {
    let pattern = pattern.trim_start_matches("./");
    let mut source = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    source.push_str("(?:.*/)?");
                } else {
                    source.push_str(".*");
                }
            }
            '*' => source.push_str("[^/]*"),
            '?' => source.push_str("[^/]"),
            '\\' => source.push('/'),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    source
}

/// Discover source files matching include/exclude patterns.
///
/// When `files` is given it replaces the include patterns: each listed file
/// that exists is returned and excludes do not apply. The result is sorted
/// and free of duplicates.
pub fn discover_source_files(
    root: &Path,
    include: &[String],
    exclude: &[String],
    files: Option<&[String]>,
) -> Result<Vec<PathBuf>, ConfigError> {
    let mut result = Vec::new();

    if let Some(file_list) = files {
        for file in file_list {
            let path = if Path::new(file).is_absolute() {
                PathBuf::from(file)
            } else {
                root.join(file)
            };
            if path.is_file() {
                result.push(path);
            } else {
                debug!(file = %path.display(), "listed file does not exist");
            }
        }
    } else {
        let include = include
            .iter()
            .map(|p| glob_to_regex(p))
            .collect::<Result<Vec<_>, _>>()?;
        let exclude = exclude
            .iter()
            .map(|p| exclude_to_regex(p))
            .collect::<Result<Vec<_>, _>>()?;
        walk_directory(root, root, &include, &exclude, &mut result);
    }

    result.sort();
    result.dedup();
    debug!(root = %root.display(), count = result.len(), "discovered source files");
    Ok(result)
}

fn walk_directory(
    root: &Path,
    dir: &Path,
    include: &[Regex],
    exclude: &[Regex],
    result: &mut Vec<PathBuf>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), error = %err, "skipping unreadable directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let relative = relative_path(root, &path);
        if exclude.iter().any(|re| re.is_match(&relative)) {
            continue;
        }

        if path.is_dir() {
            let dir_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if SKIPPED_DIRECTORIES.contains(&dir_name) {
                continue;
            }
            walk_directory(root, &path, include, exclude, result);
        } else if path.is_file() && include.iter().any(|re| re.is_match(&relative)) {
            result.push(path);
        }
    }
}

/// `path` relative to `root`, with `/` separators on every platform.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Search `start` and its ancestors for a todolang.json file.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}
