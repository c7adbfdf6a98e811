//! Run a jobd hook chain from the command line.
//!
//! Lets an administrator exercise a prolog/epilog pattern outside the
//! daemon and observe the same outcome the daemon would see:
//!
//! ```bash
//! # Dry-run a prolog chain with a 30 second budget per script
//! jobd-hookrun --name prolog --max-wait 30 \
//!     --env JOBD_JOB_ID=42 '/etc/jobd/prolog.d/*'
//! ```
//!
//! The exit code follows shell convention: a failing script's exit code
//! as-is, `128 + signal` when it was killed, `1` for failures before any
//! script ran.

use std::process::ExitCode;

use clap::Parser;

use jobd_hooks::{run_hook_scripts, HookContext, HookError, ScriptStatus};

/// Execute every hook script matching a glob pattern, in order.
#[derive(Parser, Debug)]
#[command(name = "jobd-hookrun")]
#[command(version, about, long_about = None)]
struct Args {
    /// Glob pattern naming the hook scripts to run
    pattern: String,

    /// Hook class label used in diagnostics (e.g. prolog, epilog)
    #[arg(short, long, default_value = "hook")]
    name: String,

    /// Associated job id (0 = no job context)
    #[arg(short, long, default_value_t = 0)]
    job_id: u32,

    /// Seconds to wait for each script before killing its process
    /// group; negative waits forever
    #[arg(
        short = 't',
        long,
        default_value_t = -1,
        allow_negative_numbers = true
    )]
    max_wait: i32,

    /// NAME=VALUE entry for the child environment (repeatable)
    #[arg(short, long = "env")]
    env: Vec<String>,

    /// Seed the child environment from this process's environment
    #[arg(long)]
    inherit_env: bool,

    /// Show debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("jobd_hooks={}", log_level).parse().unwrap())
                .add_directive(format!("jobd_hookrun={}", log_level).parse().unwrap()),
        )
        .try_init();

    let mut env = Vec::new();
    if args.inherit_env {
        env.extend(std::env::vars().map(|(name, value)| format!("{}={}", name, value)));
    }
    env.extend(args.env.iter().cloned());

    let ctx = HookContext {
        name: &args.name,
        job_id: args.job_id,
        max_wait_secs: args.max_wait,
        env: &env,
    };

    match run_hook_scripts(&ctx, &args.pattern) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("jobd-hookrun: {}", err);
            ExitCode::from(exit_code_for(&err))
        }
    }
}

/// Shell-convention exit code for a failed chain.
fn exit_code_for(err: &HookError) -> u8 {
    match err {
        HookError::ScriptFailed {
            status: ScriptStatus::Exited(code),
            ..
        } => *code as u8,
        HookError::ScriptFailed {
            status: ScriptStatus::Signaled(signal),
            ..
        } => (128 + *signal as i32) as u8,
        _ => 1,
    }
}
