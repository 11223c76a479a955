// src/shell.rs
use std::path::PathBuf;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

use crate::config::Config;
use crate::jobs::JobTable;
use crate::signals::{Notice, Relay};

/// Everything the main loop owns: jobs, working directory, settings, and
/// the handle the signal handlers report through.
pub struct Shell {
    pub jobs: JobTable,
    pub cwd: PathBuf,
    pub config: Config,
    pub relay: &'static Relay,
}

/// What the main loop does after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

impl Shell {
    pub fn new(config: Config, relay: &'static Relay) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Shell {
            jobs: JobTable::new(),
            cwd,
            config,
            relay,
        }
    }

    /// Apply pending child state changes to the job table.
    pub fn reap(&mut self) -> Vec<Notice> {
        self.relay.drain(&mut self.jobs)
    }

    pub fn refresh_cwd(&mut self) {
        if let Ok(cwd) = std::env::current_dir() {
            self.cwd = cwd;
        }
    }

    pub fn build_prompt(&self) -> String {
        if !self.config.prompt {
            return String::new();
        }
        format!("{} $ ", self.cwd.display())
    }

    /// Kill every job that is still tracked and forget it.
    pub fn shutdown(&mut self) {
        self.reap();
        if !self.jobs.is_empty() {
            tracing::debug!(remaining = self.jobs.len(), "killing remaining jobs");
        }
        while let Some(pid) = self.jobs.next_untracked_pid() {
            if let Err(e) = signal::killpg(pid, Signal::SIGKILL) {
                tracing::debug!(%pid, error = %e, "killpg at shutdown");
            }
            self.jobs.remove_by_pid(pid);
        }
        self.relay.clear_foreground();
        self.jobs.clear();
    }

    /// Whether `pid` names a tracked job's group leader.
    pub fn tracks(&self, pid: Pid) -> bool {
        self.jobs.job_id_of(pid).is_some()
    }
}
