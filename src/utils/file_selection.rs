//! Source file collection for analysis requests

use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use log::{debug, warn};
use walkdir::WalkDir;

/// Extensions treated as analyzable source code
const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "jsx", "ts", "tsx", "go", "rb", "php", "java", "c", "h", "cpp", "hpp",
    "cc", "cs", "swift", "kt", "scala", "sh", "sql", "vue", "html", "css",
];

/// Whether a path looks like source code we can analyze
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Collect source files from a mix of files, directories and glob
/// patterns.
///
/// Explicitly named files are always included. Directories are walked
/// (honoring .gitignore when asked to) and filtered down to source
/// extensions and past the exclude patterns. The result is sorted and
/// de-duplicated so downstream cache keys stay stable.
pub fn collect_source_files(
    paths: &[PathBuf],
    excludes: &[String],
    respect_gitignore: bool,
) -> io::Result<Vec<PathBuf>> {
    let exclude_set = build_exclude_set(excludes);
    let mut files = Vec::new();

    for path in paths {
        let raw = path.to_string_lossy();
        if raw.contains('*') || raw.contains('?') || raw.contains('[') {
            collect_from_pattern(&raw, &exclude_set, &mut files);
        } else if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            collect_from_dir(path, &exclude_set, respect_gitignore, &mut files);
        } else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Path '{}' does not exist", path.display()),
            ));
        }
    }

    files.sort();
    files.dedup();
    debug!("Collected {} source files", files.len());
    Ok(files)
}

fn collect_from_pattern(pattern: &str, exclude_set: &GlobSet, files: &mut Vec<PathBuf>) {
    match glob::glob(pattern) {
        Ok(entries) => {
            for entry in entries.flatten() {
                if entry.is_file() && !exclude_set.is_match(&entry) {
                    files.push(entry);
                }
            }
        }
        Err(err) => warn!("Ignoring invalid glob pattern '{pattern}': {err}"),
    }
}

fn collect_from_dir(
    dir: &Path,
    exclude_set: &GlobSet,
    respect_gitignore: bool,
    files: &mut Vec<PathBuf>,
) {
    if respect_gitignore {
        for entry in WalkBuilder::new(dir).build().flatten() {
            let path = entry.path();
            if entry.file_type().map_or(false, |t| t.is_file())
                && is_source_file(path)
                && !exclude_set.is_match(path)
            {
                files.push(path.to_path_buf());
            }
        }
    } else {
        for entry in WalkDir::new(dir).into_iter().flatten() {
            let path = entry.path();
            if entry.file_type().is_file() && is_source_file(path) && !exclude_set.is_match(path)
            {
                files.push(path.to_path_buf());
            }
        }
    }
}

fn build_exclude_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(err) => warn!("Ignoring invalid exclude pattern '{pattern}': {err}"),
        }
    }
    builder.build().unwrap_or_else(|err| {
        warn!("Failed to build exclude set: {err}");
        GlobSet::empty()
    })
}
