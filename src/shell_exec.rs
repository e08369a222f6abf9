//! Subprocess execution
//!
//! Every external program gitline starts (`git`, `git.exe`, `wslpath`) goes
//! through [`run`], so the debug log shows one line per invocation with its
//! timing. Nothing here retries or applies timeouts; callers decide what a
//! failed invocation means.

use std::process::{Command, Output};
use std::time::Instant;

/// Execute a command with timing and debug logging.
///
/// This is the **only** way to run external commands in gitline.
///
/// ```text
/// $ git -C /repo status --porcelain=2 [/repo]
/// [gitline-trace] context=/repo cmd="..." dur=4.1ms ok=true
/// ```
///
/// `context` is usually the directory the command operates on; `None` for
/// commands that don't belong to a repository.
pub fn run(cmd: &mut Command, context: Option<&str>) -> std::io::Result<Output> {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy()).collect();
    let cmd_str = if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    };

    match context {
        Some(ctx) => log::debug!("$ {} [{}]", cmd_str, ctx),
        None => log::debug!("$ {}", cmd_str),
    }

    let t0 = Instant::now();
    let result = cmd.output();
    let duration_ms = t0.elapsed().as_secs_f64() * 1000.0;

    let ctx = context.map(|c| format!("context={c} ")).unwrap_or_default();
    match &result {
        Ok(output) => {
            log::debug!(
                "[gitline-trace] {}cmd=\"{}\" dur={:.1}ms ok={}",
                ctx,
                cmd_str,
                duration_ms,
                output.status.success()
            );
            if !output.status.success() {
                for line in String::from_utf8_lossy(&output.stderr).lines() {
                    log::debug!("  ! {}", line);
                }
            }
        }
        Err(e) => {
            log::debug!(
                "[gitline-trace] {}cmd=\"{}\" dur={:.1}ms err=\"{}\"",
                ctx,
                cmd_str,
                duration_ms,
                e
            );
        }
    }

    result
}

/// Run a command and return its trimmed stdout, or `None` when it could not
/// be started, exited non-zero, or printed nothing.
pub fn run_stdout(cmd: &mut Command, context: Option<&str>) -> Option<String> {
    let output = run(cmd, context).ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Whether `program` resolves to an executable on `PATH`.
pub fn command_exists(program: &str) -> bool {
    let found = which::which(program).is_ok();
    if !found {
        log::debug!("{program} not found on PATH");
    }
    found
}
