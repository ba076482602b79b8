//! Filesystem scanning behind the search tools.
//!
//! Everything here is blocking; the tools run it on the blocking pool.

use crate::SearchError;
use glob::{MatchOptions, Pattern};
use regex::Regex;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Directory names that are never entered.
pub const IGNORED_DIRS: [&str; 4] = ["node_modules", "build", "dist", ".git"];

static DEFINITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:export\s+)?(?:class|function|interface|type|const|let|var)\s+(\w+)")
        .unwrap_or_else(|e| unreachable!("definition regex is valid: {e}"))
});

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    // Hidden entries are skipped like dotfiles in shell globs
    name.starts_with('.') || (entry.file_type().is_dir() && IGNORED_DIRS.contains(&name.as_ref()))
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn has_extension(file: &str, extensions: &[String]) -> bool {
    Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|wanted| wanted.trim_start_matches('.') == ext)
        })
}

fn read_text(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Skipping unreadable file");
            None
        }
    }
}

/// Every regular file under `dir`, as sorted `/`-separated relative paths.
pub fn scan_files(dir: &Path) -> Result<Vec<String>, SearchError> {
    if !dir.is_dir() {
        return Err(SearchError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(dir) {
            files.push(to_slash(relative));
        }
    }

    files.sort();
    Ok(files)
}

/// Lines containing `pattern` literally, optionally limited to `file_types`.
pub fn search_in_files(
    dir: &Path,
    pattern: &str,
    file_types: Option<&[String]>,
) -> Result<String, SearchError> {
    let file_types = file_types.filter(|types| !types.is_empty());
    let mut results = String::new();

    for file in scan_files(dir)? {
        if file_types.is_some_and(|types| !has_extension(&file, types)) {
            continue;
        }
        let Some(content) = read_text(&dir.join(&file)) else {
            continue;
        };
        for (index, line) in content.split('\n').enumerate() {
            if line.contains(pattern) {
                let _ = write!(results, "\nFile: {file}:{}\n{}\n", index + 1, line.trim());
            }
        }
    }

    if results.is_empty() {
        results.push_str("No matches found");
    }
    Ok(results)
}

/// Files whose relative path matches the glob `pattern`.
pub fn find_files(dir: &Path, pattern: &str) -> Result<Vec<String>, SearchError> {
    let pattern = Pattern::new(pattern)?;
    Ok(scan_files(dir)?
        .into_iter()
        .filter(|file| pattern.matches_with(file, GLOB_OPTIONS))
        .collect())
}

/// Top-level declarations (`class`, `function`, `interface`, `type`,
/// `const`, `let`, `var`, optionally `export`ed) in files of `file_types`.
pub fn find_code_definitions(dir: &Path, file_types: &[String]) -> Result<String, SearchError> {
    let mut definitions = String::new();

    for file in scan_files(dir)? {
        if !has_extension(&file, file_types) {
            continue;
        }
        let Some(content) = read_text(&dir.join(&file)) else {
            continue;
        };
        for captures in DEFINITION_RE.captures_iter(&content) {
            let _ = writeln!(definitions, "{file}: {}", &captures[1]);
        }
    }

    if definitions.is_empty() {
        definitions.push_str("No definitions found");
    }
    Ok(definitions)
}
