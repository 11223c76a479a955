// src/signals.rs
//
// Signal relay. Handlers only touch atomics and kill(2); the job table is
// updated on the main thread by `Relay::drain`.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use nix::errno::Errno;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::jobs::{JobState, JobTable};

/// Signals that belong to whatever job owns the terminal.
pub const INTERACTIVE: [Signal; 3] = [Signal::SIGINT, Signal::SIGTSTP, Signal::SIGQUIT];

/// State shared between the handlers and the main thread.
pub struct Relay {
    /// Foreground process-group id; 0 means the shell itself.
    foreground: AtomicI32,
    children_changed: AtomicBool,
}

static RELAY: Relay = Relay::new();

/// Install the SIGCHLD and interactive-signal handlers and return the relay
/// they report to.
pub fn install() -> nix::Result<&'static Relay> {
    catch(Signal::SIGCHLD, on_child)?;
    for sig in INTERACTIVE {
        catch(sig, on_interactive)?;
    }
    tracing::debug!("signal handlers installed");
    Ok(&RELAY)
}

fn catch(sig: Signal, handler: extern "C" fn(libc::c_int)) -> nix::Result<()> {
    let mut mask = SigSet::empty();
    mask.add(sig);
    let action = SigAction::new(SigHandler::Handler(handler), SaFlags::SA_RESTART, mask);
    // SAFETY: both handlers only use atomics and kill(2), which are
    // async-signal-safe.
    unsafe { signal::sigaction(sig, &action) }?;
    Ok(())
}

extern "C" fn on_child(_: libc::c_int) {
    RELAY.children_changed.store(true, Ordering::SeqCst);
}

extern "C" fn on_interactive(sig: libc::c_int) {
    let fg = RELAY.foreground.load(Ordering::SeqCst);
    if fg > 0 {
        // SAFETY: kill(2) is async-signal-safe.
        unsafe {
            libc::kill(-fg, sig);
        }
    }
}

/// A change reported by `Relay::drain`, already applied to the job table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Exited { pid: Pid, code: i32 },
    Killed { job: usize, pid: Pid, signal: Signal },
    Stopped { job: usize, pid: Pid, signal: Signal },
    Continued { pid: Pid },
}

impl Relay {
    pub const fn new() -> Self {
        Relay {
            foreground: AtomicI32::new(0),
            children_changed: AtomicBool::new(false),
        }
    }

    pub fn foreground(&self) -> Option<Pid> {
        match self.foreground.load(Ordering::SeqCst) {
            0 => None,
            raw => Some(Pid::from_raw(raw)),
        }
    }

    pub fn set_foreground(&self, pid: Pid) {
        self.foreground.store(pid.as_raw(), Ordering::SeqCst);
    }

    pub fn clear_foreground(&self) {
        self.foreground.store(0, Ordering::SeqCst);
    }

    fn clear_foreground_if(&self, pid: Pid) {
        let _ = self.foreground.compare_exchange(
            pid.as_raw(),
            0,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Reap every child whose state changed and apply it to `jobs`.
    /// Killed and stopped jobs are announced on standard output.
    pub fn drain(&self, jobs: &mut JobTable) -> Vec<Notice> {
        if !self.children_changed.swap(false, Ordering::SeqCst) {
            return Vec::new();
        }

        let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        let mut notices = Vec::new();
        loop {
            let status = match waitpid(Pid::from_raw(-1), Some(flags)) {
                Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
                Ok(status) => status,
                Err(Errno::EINTR) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "waitpid failed");
                    break;
                }
            };
            tracing::trace!(?status, "child state changed");
            if let Some(notice) = self.apply(jobs, status) {
                notices.push(notice);
            }
        }

        announce(&notices);
        notices
    }

    fn apply(&self, jobs: &mut JobTable, status: WaitStatus) -> Option<Notice> {
        match status {
            WaitStatus::Exited(pid, code) => {
                jobs.remove_by_pid(pid);
                self.clear_foreground_if(pid);
                Some(Notice::Exited { pid, code })
            }
            WaitStatus::Signaled(pid, signal, _) => {
                let job = jobs.remove_by_pid(pid).map(|j| j.id).unwrap_or(0);
                self.clear_foreground_if(pid);
                Some(Notice::Killed { job, pid, signal })
            }
            WaitStatus::Stopped(pid, signal) => {
                jobs.update_state_by_pid(pid, JobState::Stopped);
                self.clear_foreground_if(pid);
                let job = jobs.job_id_of(pid).unwrap_or(0);
                Some(Notice::Stopped { job, pid, signal })
            }
            WaitStatus::Continued(pid) => {
                jobs.update_state_by_pid(pid, JobState::Running);
                Some(Notice::Continued { pid })
            }
            _ => None,
        }
    }
}

fn announce(notices: &[Notice]) {
    let mut out = std::io::stdout().lock();
    for notice in notices {
        let line = match notice {
            Notice::Killed { job, pid, signal } => format!(
                "sh: Job [{job}] ({pid}) terminated by signal {} ({})",
                *signal as i32,
                signal.as_str()
            ),
            Notice::Stopped { job, pid, signal } => format!(
                "sh: Job [{job}] ({pid}) stopped by signal {} ({})",
                *signal as i32,
                signal.as_str()
            ),
            Notice::Exited { pid, code } => {
                tracing::debug!(%pid, code, "job exited");
                continue;
            }
            Notice::Continued { pid } => {
                tracing::debug!(%pid, "job continued");
                continue;
            }
        };
        let _ = writeln!(out, "{line}");
    }
    let _ = out.flush();
}

/// Signals blocked for the guard's lifetime; the previous mask is restored
/// on drop.
pub struct BlockedSignals {
    previous: SigSet,
}

impl BlockedSignals {
    pub fn block(signals: &[Signal]) -> nix::Result<Self> {
        let mut set = SigSet::empty();
        for &sig in signals {
            set.add(sig);
        }
        let mut previous = SigSet::empty();
        signal::sigprocmask(SigmaskHow::SIG_BLOCK, Some(&set), Some(&mut previous))?;
        Ok(BlockedSignals { previous })
    }

    /// Restore the previous mask now. Used in a forked child, where the
    /// guard is never dropped because the process image is replaced.
    pub fn restore(&self) -> nix::Result<()> {
        signal::sigprocmask(SigmaskHow::SIG_SETMASK, Some(&self.previous), None)
    }
}

impl Drop for BlockedSignals {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            tracing::warn!(error = %e, "failed to restore signal mask");
        }
    }
}
