// src/executor/mod.rs - builtin dispatch, process launch, foreground wait
pub mod builtin;
pub mod launch;
pub mod terminal;

use nix::unistd::Pid;

use crate::parser::ast::CommandLine;
use crate::shell::{Flow, Shell};

/// Run one parsed command. Errors are reported here; only `exit` stops
/// the loop.
pub fn execute(shell: &mut Shell, cmd: &CommandLine) -> Flow {
    match builtin::run_builtin(shell, cmd) {
        Some(Ok(flow)) => return flow,
        Some(Err(e)) => {
            eprintln!("{e}");
            return Flow::Continue;
        }
        None => {}
    }

    if let Err(e) = launch::launch(shell, cmd) {
        eprintln!("{e}");
    }
    Flow::Continue
}

/// Block until `pid` leaves the foreground, by exiting, dying, or
/// stopping, then take the terminal back.
///
/// This is a coarse poll: each round drains pending child notifications,
/// checks the foreground slot, and sleeps one poll interval.
pub fn wait_foreground(shell: &mut Shell, pid: Pid) {
    let interval = shell.config.poll_interval();
    loop {
        shell.reap();
        if shell.relay.foreground() != Some(pid) {
            break;
        }
        std::thread::sleep(interval);
    }
    tracing::debug!(%pid, "foreground job finished or stopped");
    terminal::reclaim();
}
