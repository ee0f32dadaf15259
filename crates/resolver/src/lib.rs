//! Expansion of dependency paths containing `*` / `?` wildcards into existing files.

use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no file(s) exist for dependency `{pattern}`")]
    NoMatches { pattern: String },
    #[error("invalid dependency pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("failed to search `{}` for dependency `{pattern}`: {source}", start.display())]
    Walk {
        pattern: String,
        start: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Resolve `pattern` into existing paths.
///
/// A pattern naming an existing file or directory resolves to itself. Otherwise
/// `*` matches any run of characters (separators included) and `?` a single
/// character; the search walks the longest wildcard-free leading directory and
/// only regular files are returned, sorted.
pub fn resolve(pattern: &Path) -> Result<Vec<PathBuf>, ResolveError> {
    let pattern_text = pattern.to_string_lossy().into_owned();
    if pattern.exists() {
        return Ok(vec![pattern.to_path_buf()]);
    }
    if !has_wildcard(&pattern_text) {
        return Err(ResolveError::NoMatches {
            pattern: pattern_text,
        });
    }

    let matcher = glob_to_regex(&pattern_text).map_err(|source| ResolveError::Pattern {
        pattern: pattern_text.clone(),
        source,
    })?;
    let start = starting_directory(pattern);
    debug!(pattern = %pattern_text, start = %start.display(), "expanding dependency pattern");

    let mut matches = Vec::new();
    for entry in WalkDir::new(&start).min_depth(1) {
        let entry = entry.map_err(|source| ResolveError::Walk {
            pattern: pattern_text.clone(),
            start: start.clone(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if matcher.is_match(&entry.path().to_string_lossy()) {
            matches.push(entry.into_path());
        }
    }

    if matches.is_empty() {
        return Err(ResolveError::NoMatches {
            pattern: pattern_text,
        });
    }
    matches.sort();
    Ok(matches)
}

fn has_wildcard(text: &str) -> bool {
    text.contains(['*', '?'])
}

fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut expression = String::with_capacity(pattern.len() * 2 + 2);
    expression.push('^');
    let mut literal = [0u8; 4];
    for character in pattern.chars() {
        match character {
            '*' => expression.push_str(".*"),
            '?' => expression.push('.'),
            other => expression.push_str(&regex::escape(other.encode_utf8(&mut literal))),
        }
    }
    expression.push('$');
    Regex::new(&expression)
}

fn starting_directory(pattern: &Path) -> PathBuf {
    let mut start = PathBuf::new();
    for component in pattern.components() {
        if has_wildcard(&component.as_os_str().to_string_lossy()) {
            break;
        }
        start.push(component);
    }
    start
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
