//! Error types for hook resolution and execution.

use std::path::PathBuf;

use thiserror::Error;

use crate::status::ScriptStatus;

/// Errors surfaced while resolving or running a hook chain.
#[derive(Debug, Error)]
pub enum HookError {
    /// Script is not readable and executable by this process; it was
    /// never spawned.
    #[error("cannot run {} [{}]: not readable and executable", .name, .path.display())]
    PermissionDenied { name: String, path: PathBuf },

    /// Process creation failed before the script could start.
    #[error("executing {} [{}]: {}", .name, .path.display(), .source)]
    Spawn {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The glob pattern itself does not parse.
    #[error("invalid hook pattern {pattern}: {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// A directory matched during expansion could not be read.
    #[error("cannot read directory while expanding {pattern}: {source}")]
    UnreadableDir {
        pattern: String,
        #[source]
        source: glob::GlobError,
    },

    /// The first script in the chain that terminated unsuccessfully.
    #[error("{} script {} {}", .name, .path.display(), .status)]
    ScriptFailed {
        name: String,
        path: PathBuf,
        status: ScriptStatus,
    },
}

impl HookError {
    /// Wait-status style code for daemon callers: the failing script's
    /// raw status, or -1 when the failure happened before any script ran.
    pub fn raw_status(&self) -> i32 {
        match self {
            HookError::ScriptFailed { status, .. } => status.raw(),
            _ => -1,
        }
    }
}

/// Result type for hook operations.
pub type Result<T> = std::result::Result<T, HookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_failure_carries_its_raw_status() {
        let err = HookError::ScriptFailed {
            name: "epilog".to_string(),
            path: PathBuf::from("/etc/jobd/epilog.d/10-cleanup"),
            status: ScriptStatus::Exited(3),
        };
        assert_eq!(err.raw_status(), 0x0300);
    }

    #[test]
    fn pre_execution_failures_map_to_sentinel() {
        let err = HookError::PermissionDenied {
            name: "prolog".to_string(),
            path: PathBuf::from("/etc/jobd/prolog.d/10-setup"),
        };
        assert_eq!(err.raw_status(), -1);
    }
}
