//! Sequential driver for one hook chain.

use tracing::error;

use crate::error::{HookError, Result};
use crate::executor::{run_one_script, HookContext};
use crate::resolver::resolve_scripts;

/// Run every script matching `pattern`, in resolved order, stopping at
/// the first failure.
///
/// An empty pattern, or a pattern matching nothing, is a success: there
/// was nothing to run. Scripts execute strictly one at a time, in the
/// order resolution produced, because numbered hooks may depend on their
/// predecessors. The first script that fails to start or terminates
/// unsuccessfully short-circuits the chain; later scripts are never
/// spawned.
pub fn run_hook_scripts(ctx: &HookContext<'_>, pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        return Ok(());
    }

    let scripts = resolve_scripts(pattern).map_err(|err| {
        error!("unable to run {} [{}]: {}", ctx.name, pattern, err);
        err
    })?;

    for path in scripts {
        let status = run_one_script(ctx, &path)?;
        if !status.is_success() {
            error!("{}: exited with status 0x{:04x}", path.display(), status.raw());
            return Err(HookError::ScriptFailed {
                name: ctx.name.to_string(),
                path,
                status,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ScriptStatus;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_script(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn chain_ctx<'a>(env: &'a [String]) -> HookContext<'a> {
        HookContext {
            name: "epilog",
            job_id: 0,
            max_wait_secs: -1,
            env,
        }
    }

    #[test]
    fn empty_pattern_is_a_no_op() {
        let env = Vec::new();
        assert!(run_hook_scripts(&chain_ctx(&env), "").is_ok());
    }

    #[test]
    fn zero_matches_is_a_success() {
        let dir = TempDir::new().unwrap();
        let env = Vec::new();
        let pattern = format!("{}/none-*.sh", dir.path().display());
        assert!(run_hook_scripts(&chain_ctx(&env), &pattern).is_ok());
    }

    #[test]
    fn scripts_run_in_order_and_all_successes_return_ok() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("ran.log");
        write_script(dir.path(), "10-first.sh", "#!/bin/sh\necho 10 >> \"$LOG\"\n");
        write_script(dir.path(), "20-second.sh", "#!/bin/sh\necho 20 >> \"$LOG\"\n");
        write_script(dir.path(), "30-third.sh", "#!/bin/sh\necho 30 >> \"$LOG\"\n");

        let env = vec![format!("LOG={}", log.display())];
        let pattern = format!("{}/*.sh", dir.path().display());
        run_hook_scripts(&chain_ctx(&env), &pattern).unwrap();

        assert_eq!(fs::read_to_string(&log).unwrap(), "10\n20\n30\n");
    }

    #[test]
    fn first_failure_short_circuits_the_chain() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("ran.log");
        write_script(dir.path(), "10-first.sh", "#!/bin/sh\necho 10 >> \"$LOG\"\n");
        write_script(
            dir.path(),
            "20-second.sh",
            "#!/bin/sh\necho 20 >> \"$LOG\"\nexit 3\n",
        );
        write_script(dir.path(), "30-third.sh", "#!/bin/sh\necho 30 >> \"$LOG\"\n");

        let env = vec![format!("LOG={}", log.display())];
        let pattern = format!("{}/*.sh", dir.path().display());
        let err = run_hook_scripts(&chain_ctx(&env), &pattern).unwrap_err();

        match &err {
            HookError::ScriptFailed { path, status, .. } => {
                assert!(path.ends_with("20-second.sh"));
                assert_eq!(*status, ScriptStatus::Exited(3));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.raw_status(), 0x0300);

        // The failing script ran; the one after it never did.
        assert_eq!(fs::read_to_string(&log).unwrap(), "10\n20\n");
    }

    #[test]
    fn unrunnable_script_stops_the_chain_too() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("ran.log");
        write_script(dir.path(), "10-first.sh", "#!/bin/sh\necho 10 >> \"$LOG\"\n");
        let blocked = dir.path().join("20-blocked.sh");
        fs::write(&blocked, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&blocked, fs::Permissions::from_mode(0o644)).unwrap();
        write_script(dir.path(), "30-third.sh", "#!/bin/sh\necho 30 >> \"$LOG\"\n");

        let env = vec![format!("LOG={}", log.display())];
        let pattern = format!("{}/*.sh", dir.path().display());
        let err = run_hook_scripts(&chain_ctx(&env), &pattern).unwrap_err();

        assert!(matches!(err, HookError::PermissionDenied { .. }));
        assert_eq!(fs::read_to_string(&log).unwrap(), "10\n");
    }

    #[test]
    fn unparsable_pattern_aborts_before_any_execution() {
        let env = Vec::new();
        let err = run_hook_scripts(&chain_ctx(&env), "/etc/jobd/epilog.d/[").unwrap_err();
        assert!(matches!(err, HookError::BadPattern { .. }));
    }
}
