// src/executor/builtin/jobs.rs
use std::io::Write;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

use super::{expect_args, BuiltinResult};
use crate::error::BuiltinError;
use crate::executor::{terminal, wait_foreground};
use crate::shell::{Flow, Shell};

pub fn builtin_jobs(shell: &mut Shell) -> BuiltinResult {
    shell.reap();
    let mut out = std::io::stdout().lock();
    for job in shell.jobs.iter() {
        let _ = writeln!(out, "{job}");
    }
    let _ = out.flush();
    Ok(Flow::Continue)
}

/// Resume a job without giving it the terminal.
pub fn builtin_bg(shell: &mut Shell, args: &[String]) -> BuiltinResult {
    let [target] = expect_args(args, "bg", "bg <job>")?;
    let pid = resolve(shell, "bg", target)?;

    continue_group("bg", pid)?;
    tracing::debug!(%pid, "resumed in background");
    Ok(Flow::Continue)
}

/// Resume a job in the foreground and wait for it like a launched command.
pub fn builtin_fg(shell: &mut Shell, args: &[String]) -> BuiltinResult {
    let [target] = expect_args(args, "fg", "fg <job>")?;
    // A stop still queued from earlier would otherwise end the wait below
    // as soon as it starts.
    shell.reap();
    let pid = resolve(shell, "fg", target)?;
    if let Some(job) = shell.jobs.get(pid) {
        println!("{}", job.name);
    }

    shell.relay.set_foreground(pid);
    terminal::hand_to(pid);
    if let Err(e) = continue_group("fg", pid) {
        shell.relay.clear_foreground();
        terminal::reclaim();
        return Err(e);
    }
    tracing::debug!(%pid, "resumed in foreground");
    wait_foreground(shell, pid);
    Ok(Flow::Continue)
}

/// `%N` names a job id; anything else must be the pid of a tracked job.
fn resolve(shell: &Shell, name: &'static str, target: &str) -> Result<Pid, BuiltinError> {
    if let Some(id) = target.strip_prefix('%') {
        return id
            .parse()
            .ok()
            .and_then(|id| shell.jobs.pid_of(id))
            .ok_or(BuiltinError::NoSuchJob(name));
    }
    target
        .parse()
        .ok()
        .map(Pid::from_raw)
        .filter(|&pid| shell.tracks(pid))
        .ok_or(BuiltinError::NoSuchProcess(name))
}

fn continue_group(name: &'static str, pid: Pid) -> Result<(), BuiltinError> {
    signal::killpg(pid, Signal::SIGCONT).map_err(|source| BuiltinError::Signal { name, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::jobs::JobState;
    use crate::signals::Relay;
    use assert_matches::assert_matches;

    fn shell_with_job(id: usize, raw_pid: i32) -> Shell {
        let mut shell = Shell::new(Config::default(), Box::leak(Box::new(Relay::new())));
        shell
            .jobs
            .add(id, Pid::from_raw(raw_pid), JobState::Stopped, "/bin/sleep")
            .unwrap();
        shell
    }

    #[test]
    fn percent_prefix_looks_up_job_ids() {
        let shell = shell_with_job(3, 4242);
        assert_eq!(resolve(&shell, "fg", "%3").unwrap(), Pid::from_raw(4242));
        assert_matches!(resolve(&shell, "fg", "%4"), Err(BuiltinError::NoSuchJob("fg")));
        assert_matches!(resolve(&shell, "fg", "%x"), Err(BuiltinError::NoSuchJob("fg")));
    }

    #[test]
    fn raw_pids_must_be_tracked() {
        let shell = shell_with_job(1, 4242);
        assert_eq!(resolve(&shell, "bg", "4242").unwrap(), Pid::from_raw(4242));
        assert_matches!(resolve(&shell, "bg", "4243"), Err(BuiltinError::NoSuchProcess("bg")));
        assert_matches!(resolve(&shell, "bg", "abc"), Err(BuiltinError::NoSuchProcess("bg")));
    }

    #[test]
    fn unknown_targets_fail_before_any_signal() {
        let mut shell = shell_with_job(1, 4242);
        let err = builtin_bg(&mut shell, &["%2".into()]).unwrap_err();
        assert_eq!(err.to_string(), "bg: Job ID not found");
        let err = builtin_fg(&mut shell, &["99999".into()]).unwrap_err();
        assert_eq!(err.to_string(), "fg: Process ID not found");
        assert_eq!(shell.relay.foreground(), None);
    }

    #[test]
    fn bg_and_fg_take_exactly_one_argument() {
        let mut shell = shell_with_job(1, 4242);
        let err = builtin_bg(&mut shell, &[]).unwrap_err();
        assert_eq!(err.to_string(), "bg: Usage: bg <job>");
        let err = builtin_fg(&mut shell, &["%1".into(), "%1".into()]).unwrap_err();
        assert_eq!(err.to_string(), "fg: Usage: fg <job>");
    }
}
