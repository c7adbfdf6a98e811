//! Job lifecycle hook execution for jobd.
//!
//! A compute daemon runs administrator-supplied scripts at job lifecycle
//! points ("prolog" before a job starts, "epilog" after it ends). Each
//! hook class is configured as a glob pattern; every matching script is
//! executed sequentially in resolved order, bounded by an optional
//! wall-clock timeout, and forcibly terminated together with everything
//! it spawned when the budget runs out.
//!
//! The whole run is synchronous from the caller's point of view: the
//! daemon blocks until the chain finished or the first script failed.
//!
//! ```no_run
//! use jobd_hooks::{run_hook_scripts, HookContext};
//!
//! let env = vec![
//!     "JOBD_JOB_ID=42".to_string(),
//!     "PATH=/usr/bin:/bin".to_string(),
//! ];
//! let ctx = HookContext {
//!     name: "prolog",
//!     job_id: 42,
//!     max_wait_secs: 30,
//!     env: &env,
//! };
//! run_hook_scripts(&ctx, "/etc/jobd/prolog.d/*")?;
//! # Ok::<(), jobd_hooks::HookError>(())
//! ```

mod error;
mod executor;
mod resolver;
mod runner;
mod status;

pub use error::{HookError, Result};
pub use executor::{run_one_script, HookContext};
pub use resolver::resolve_scripts;
pub use runner::run_hook_scripts;
pub use status::ScriptStatus;
