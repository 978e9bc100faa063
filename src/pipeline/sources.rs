//! Input resolution for pipelines.
//!
//! Expands the configured input list into concrete files, in list order.
//! Glob entries expand to their matches sorted by path; literal entries must
//! exist. A file reached more than once is kept at its first position only.

use glob::{glob, Pattern};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};
use tracing::{debug, warn};

use super::PipelineError;
use crate::config::duplicate_entries;

/// Check whether an input entry contains glob metacharacters.
pub fn is_glob(entry: &str) -> bool {
    entry.chars().any(|c| matches!(c, '*' | '?' | '['))
}

/// Drop `.` components so `./a/b.js` and `a/b.js` compare equal.
pub fn normalize(path: &Path) -> PathBuf {
    path.components().filter(|c| !matches!(c, Component::CurDir)).collect()
}

/// Resolve the input list against `root`.
pub fn resolve_inputs(root: &Path, entries: &[String]) -> Result<Vec<PathBuf>, PipelineError> {
    for duplicate in duplicate_entries(entries) {
        warn!(entry = duplicate, "input listed more than once; keeping the first occurrence");
    }

    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for entry in entries {
        let full = normalize(&root.join(entry));

        let matches = if is_glob(entry) {
            expand_glob(root, entry)?
        } else if full.is_file() {
            vec![full]
        } else {
            return Err(PipelineError::MissingInput(full));
        };

        for path in matches {
            if seen.insert(path.clone()) {
                resolved.push(path);
            } else {
                debug!(path = %path.display(), entry = entry.as_str(), "already included");
            }
        }
    }

    Ok(resolved)
}

/// Glob pattern for `entry` under `root`. The root is escaped so directory
/// names like `site[1]` match literally.
pub fn glob_pattern(root: &Path, entry: &str) -> String {
    let entry = normalize(Path::new(entry));
    let root = normalize(root);
    if entry.is_absolute() || root.as_os_str().is_empty() {
        return entry.to_string_lossy().into_owned();
    }
    format!(
        "{}{}{}",
        Pattern::escape(&root.to_string_lossy()),
        MAIN_SEPARATOR,
        entry.to_string_lossy()
    )
}

fn expand_glob(root: &Path, entry: &str) -> Result<Vec<PathBuf>, PipelineError> {
    let pattern = glob_pattern(root, entry);
    let paths = glob(&pattern)
        .map_err(|source| PipelineError::InvalidPattern { pattern: entry.to_string(), source })?;

    let mut files = Vec::new();
    for item in paths {
        match item {
            Ok(path) => {
                if path.is_file() {
                    files.push(normalize(&path));
                }
            }
            Err(e) => {
                warn!("error reading path while expanding '{}': {}", entry, e);
            }
        }
    }

    if files.is_empty() {
        warn!(pattern = entry, "glob matched no files");
    }

    files.sort();
    Ok(files)
}
