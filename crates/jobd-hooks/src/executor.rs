//! Single-script execution with a bounded wait and process-group kill.
//!
//! Each script runs as the leader of a fresh process group, so a timeout
//! can deliver one SIGKILL to the script and everything it spawned
//! without touching the daemon or sibling hooks. The wait policy is a
//! synchronous once-per-second poll on the calling thread; there is no
//! async surface.

use std::io;
use std::path::Path;
use std::process::{Child, Command};
use std::thread;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{access, AccessFlags, Pid};
use tracing::{debug, error, warn};

use crate::error::{HookError, Result};
use crate::status::ScriptStatus;

/// Parameters shared by every script in one hook chain.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    /// Hook class label ("prolog", "epilog", ...) used in diagnostics.
    pub name: &'a str,
    /// Associated job id; 0 means no job context.
    pub job_id: u32,
    /// Wall-clock budget in seconds for each script; negative waits
    /// forever.
    pub max_wait_secs: i32,
    /// `NAME=VALUE` entries forming the child's entire environment.
    /// Nothing from this process leaks in unless the caller put it here.
    pub env: &'a [String],
}

/// Run one script to completion or forced termination.
///
/// An empty `path` is a no-op success: there is nothing to run. The
/// script must be readable and executable by this process before any
/// spawn is attempted. It is started with `argv = [path]` and exactly
/// the environment from `ctx`, as the leader of its own process group.
///
/// With a negative `ctx.max_wait_secs` the wait blocks until the script
/// terminates. Otherwise the child is polled once per second and, when
/// the budget runs out, its whole process group is SIGKILLed and reaped.
/// Either way the group is signalled once more after the script is
/// reaped, so no descendant survives the hook.
///
/// Deliberate quirk, relied on by callers: a `waitpid` failure other
/// than EINTR is logged and reported as success rather than failing the
/// script. An infrastructure wait error is not a script failure.
pub fn run_one_script(ctx: &HookContext<'_>, path: &Path) -> Result<ScriptStatus> {
    if path.as_os_str().is_empty() {
        return Ok(ScriptStatus::Exited(0));
    }

    if ctx.job_id != 0 {
        debug!(
            job_id = ctx.job_id,
            "attempting to run {} [{}]",
            ctx.name,
            path.display()
        );
    } else {
        debug!("attempting to run {} [{}]", ctx.name, path.display());
    }

    if access(path, AccessFlags::R_OK | AccessFlags::X_OK).is_err() {
        error!(
            "cannot run {} [{}]: not readable and executable",
            ctx.name,
            path.display()
        );
        return Err(HookError::PermissionDenied {
            name: ctx.name.to_string(),
            path: path.to_path_buf(),
        });
    }

    let child = match spawn_in_own_group(ctx, path) {
        Ok(child) => child,
        Err(err) if is_resource_exhaustion(&err) => {
            error!("executing {}: spawn: {}", ctx.name, err);
            return Err(HookError::Spawn {
                name: ctx.name.to_string(),
                path: path.to_path_buf(),
                source: err,
            });
        }
        Err(err) => {
            // The process forked but the script image could not be
            // executed (bad interpreter, file vanished). Such a child
            // exits 127; report the same status.
            error!("execve {} [{}]: {}", ctx.name, path.display(), err);
            return Ok(ScriptStatus::Exited(127));
        }
    };

    wait_and_reap(Pid::from_raw(child.id() as i32), ctx.max_wait_secs)
}

/// Spawn `path` with the supplied environment as a new group leader.
fn spawn_in_own_group(ctx: &HookContext<'_>, path: &Path) -> io::Result<Child> {
    use std::os::unix::process::CommandExt;

    let mut cmd = Command::new(path);
    cmd.env_clear();
    for entry in ctx.env {
        match entry.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                cmd.env(name, value);
            }
            _ => {
                warn!(
                    "{}: ignoring malformed environment entry {:?}",
                    ctx.name, entry
                );
            }
        }
    }

    unsafe {
        // Runs between fork and exec; only async-signal-safe calls here.
        cmd.pre_exec(|| {
            if libc::setpgid(0, 0) != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }

    cmd.spawn()
}

/// Spawn errors that mean process creation itself failed, as opposed to
/// the exec-image class reported through exit code 127.
fn is_resource_exhaustion(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EAGAIN) | Some(libc::ENOMEM))
}

/// Wait for the script with the bounded-poll policy, then signal its
/// group so nothing it spawned outlives it.
fn wait_and_reap(pid: Pid, max_wait_secs: i32) -> Result<ScriptStatus> {
    let mut budget = max_wait_secs;
    let mut flags = if max_wait_secs < 0 {
        WaitPidFlag::empty()
    } else {
        WaitPidFlag::WNOHANG
    };

    loop {
        match waitpid(pid, Some(flags)) {
            Err(Errno::EINTR) => continue,
            Err(errno) => {
                // Infrastructure wait errors do not fail the script.
                error!("waitpid: {}", errno);
                return Ok(ScriptStatus::Exited(0));
            }
            Ok(WaitStatus::StillAlive) => {
                thread::sleep(Duration::from_secs(1));
                budget -= 1;
                if budget <= 0 {
                    let _ = killpg(pid, Signal::SIGKILL);
                    flags = WaitPidFlag::empty();
                }
            }
            Ok(WaitStatus::Exited(_, code)) => {
                kill_group(pid);
                return Ok(ScriptStatus::Exited(code));
            }
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                kill_group(pid);
                return Ok(ScriptStatus::Signaled(signal));
            }
            // Stop/continue events are not requested by these flags.
            Ok(_) => continue,
        }
    }
}

/// SIGKILL the script's process group. An already-empty group (ESRCH)
/// is fine; the point is that no descendant survives.
fn kill_group(pid: Pid) {
    let _ = killpg(pid, Signal::SIGKILL);
}
