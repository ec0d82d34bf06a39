//! Utility functions for Sibyl

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

pub mod file_selection;

pub use file_selection::collect_source_files;

static BRANCH_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(if|else|elif|for|foreach|while|match|switch|case|catch|except)\b|&&|\|\|")
        .expect("branch token regex is valid")
});

/// Number of non-blank lines in a chunk of code
pub fn line_count(code: &str) -> usize {
    code.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Rough branching-density estimate for a chunk of code.
///
/// Counts branch keywords and boolean operators per non-blank line,
/// scaled so typical code lands in the low single digits. Good enough
/// for prompt context, nothing more.
pub fn estimate_complexity(code: &str) -> f64 {
    let lines = line_count(code).max(1);
    let branches = BRANCH_TOKENS.find_iter(code).count();
    branches as f64 / lines as f64 * 10.0
}

/// Read the given files into an ordered path to content map.
///
/// Files that are not valid UTF-8 are skipped with a warning; other
/// read failures propagate.
pub fn read_files(files: &[PathBuf]) -> io::Result<BTreeMap<PathBuf, String>> {
    let mut contents = BTreeMap::new();
    for path in files {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                contents.insert(path.clone(), content);
            }
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                warn!("Skipping non-UTF-8 file {}", path.display());
            }
            Err(err) => return Err(err),
        }
    }
    Ok(contents)
}

/// Render a path relative to the current directory when possible
pub fn display_path(path: &Path) -> String {
    if path.is_absolute() {
        if let Ok(cwd) = std::env::current_dir() {
            if let Some(relative) = pathdiff::diff_paths(path, &cwd) {
                return relative.display().to_string();
            }
        }
    }
    path.display().to_string()
}
