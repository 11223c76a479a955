// src/executor/terminal.rs
//
// Ownership of the controlling terminal's foreground process group.

use std::io::IsTerminal;

use nix::sys::signal::Signal;
use nix::unistd::{self, Pid};

use crate::signals::BlockedSignals;

/// Make `pgid` the terminal's foreground group.
///
/// SIGTTOU is blocked around the call: when the shell is not in the
/// foreground, `tcsetpgrp` would otherwise stop the shell itself. Does
/// nothing when standard input is not a terminal.
pub fn hand_to(pgid: Pid) {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return;
    }
    // The line editor leaves raw mode after each read; make sure a job
    // never inherits it.
    crossterm::terminal::disable_raw_mode().ok();

    let _guard = match BlockedSignals::block(&[Signal::SIGTTOU]) {
        Ok(guard) => guard,
        Err(e) => {
            tracing::warn!(error = %e, "cannot block SIGTTOU");
            return;
        }
    };
    match unistd::tcsetpgrp(&stdin, pgid) {
        Ok(()) => tracing::trace!(%pgid, "terminal handed over"),
        Err(e) => tracing::debug!(%pgid, error = %e, "tcsetpgrp failed"),
    }
}

/// Give the terminal back to the shell's own process group.
pub fn reclaim() {
    hand_to(unistd::getpgrp());
}
