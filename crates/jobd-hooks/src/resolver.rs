//! Glob expansion of a hook pattern into an ordered script set.

use std::path::PathBuf;

use crate::error::{HookError, Result};

/// Expand `pattern` into the ordered list of matching script paths.
///
/// Matches come back in expansion order (lexicographic within each
/// directory), so numbered hook files like `10-mount` and `20-limits`
/// run in a predictable sequence. Zero matches is an empty set, not an
/// error. An unreadable directory anywhere in the expansion aborts
/// resolution: hooks must never be silently skipped because a directory
/// was unlistable.
///
/// Each returned path is an owned copy; nothing borrows from the
/// expansion machinery once this returns.
pub fn resolve_scripts(pattern: &str) -> Result<Vec<PathBuf>> {
    if pattern.is_empty() {
        return Ok(Vec::new());
    }

    let matches = glob::glob(pattern).map_err(|source| HookError::BadPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut scripts = Vec::new();
    for entry in matches {
        match entry {
            Ok(path) => scripts.push(path),
            Err(source) => {
                return Err(HookError::UnreadableDir {
                    pattern: pattern.to_string(),
                    source,
                });
            }
        }
    }

    Ok(scripts)
}
