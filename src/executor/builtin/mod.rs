// src/executor/builtin/mod.rs
mod core;
mod fs;
mod jobs;

use crate::error::BuiltinError;
use crate::parser::ast::CommandLine;
use crate::shell::{Flow, Shell};

pub type BuiltinResult = Result<Flow, BuiltinError>;

/// Names handled in-process, for completion.
pub const BUILTIN_NAMES: &[&str] = &["cd", "ln", "rm", "bg", "fg", "jobs", "exit"];

/// Run `cmd` if it is a builtin; `None` means it must be launched.
pub fn run_builtin(shell: &mut Shell, cmd: &CommandLine) -> Option<BuiltinResult> {
    let args = cmd.args.as_slice();
    let result = match cmd.name.as_str() {
        // ── Filesystem ────────────────────────────────────────
        "cd"   => core::builtin_cd(shell, args),
        "ln"   => fs::builtin_ln(args),
        "rm"   => fs::builtin_rm(args),

        // ── Job control ───────────────────────────────────────
        "bg"   => jobs::builtin_bg(shell, args),
        "fg"   => jobs::builtin_fg(shell, args),
        "jobs" => jobs::builtin_jobs(shell),

        // ── Shell primitives ──────────────────────────────────
        "exit" => Ok(Flow::Exit),

        _      => return None,
    };
    tracing::debug!(builtin = %cmd.name, ok = result.is_ok(), "builtin finished");
    Some(result)
}

/// Exactly `N` arguments, or the builtin's usage error.
fn expect_args<'a, const N: usize>(
    args: &'a [String],
    name: &'static str,
    usage: &'static str,
) -> Result<&'a [String; N], BuiltinError> {
    args.try_into().map_err(|_| BuiltinError::Usage { name, usage })
}
