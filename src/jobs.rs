// src/jobs.rs
//
// The job table. Every mutation happens on the main thread; the SIGCHLD
// handler only raises a flag that the main thread drains (see signals.rs).

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use nix::unistd::Pid;

use crate::error::JobTableError;

pub type JobId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Stopped,
    Done,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Running => write!(f, "Running"),
            JobState::Stopped => write!(f, "Stopped"),
            JobState::Done    => write!(f, "Done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    /// Group leader; doubles as the process-group id.
    pub pid: Pid,
    pub state: JobState,
    pub name: String,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ({}) {} {}", self.id, self.pid, self.state, self.name)
    }
}

/// Jobs keyed by id. Ids only grow, so id order is insertion order.
#[derive(Debug)]
pub struct JobTable {
    jobs: BTreeMap<JobId, Job>,
    by_pid: HashMap<Pid, JobId>,
    next_id: JobId,
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTable {
    pub fn new() -> Self {
        JobTable {
            jobs: BTreeMap::new(),
            by_pid: HashMap::new(),
            next_id: 1,
        }
    }

    /// Hand out the next job id. An id is consumed even if the launch that
    /// asked for it later fails.
    pub fn allocate_id(&mut self) -> JobId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add(
        &mut self,
        id: JobId,
        pid: Pid,
        state: JobState,
        name: impl Into<String>,
    ) -> Result<(), JobTableError> {
        if self.by_pid.contains_key(&pid) {
            return Err(JobTableError::DuplicatePid(pid));
        }
        if self.jobs.contains_key(&id) {
            return Err(JobTableError::DuplicateJobId(id));
        }
        // Ids handed to `add` directly must not run behind the allocator.
        self.next_id = self.next_id.max(id + 1);

        let name = name.into();
        tracing::debug!(job = id, %pid, %state, %name, "job added");
        self.by_pid.insert(pid, id);
        self.jobs.insert(id, Job { id, pid, state, name });
        Ok(())
    }

    pub fn remove_by_pid(&mut self, pid: Pid) -> Option<Job> {
        let id = self.by_pid.remove(&pid)?;
        tracing::debug!(job = id, %pid, "job removed");
        self.jobs.remove(&id)
    }

    /// No-op for unknown pids. `Done` jobs leave the table.
    pub fn update_state_by_pid(&mut self, pid: Pid, state: JobState) {
        if state == JobState::Done {
            self.remove_by_pid(pid);
            return;
        }
        let Some(id) = self.by_pid.get(&pid) else { return };
        if let Some(job) = self.jobs.get_mut(id) {
            tracing::trace!(job = job.id, %pid, from = %job.state, to = %state, "job state");
            job.state = state;
        }
    }

    pub fn pid_of(&self, id: JobId) -> Option<Pid> {
        self.jobs.get(&id).map(|job| job.pid)
    }

    pub fn job_id_of(&self, pid: Pid) -> Option<JobId> {
        self.by_pid.get(&pid).copied()
    }

    pub fn get(&self, pid: Pid) -> Option<&Job> {
        self.jobs.get(self.by_pid.get(&pid)?)
    }

    /// Any still-tracked pid, for draining the table at shutdown.
    pub fn next_untracked_pid(&self) -> Option<Pid> {
        self.jobs.values().next().map(|job| job.pid)
    }

    /// Jobs in launch order. The iterator is cheap to clone and restart.
    pub fn iter(&self) -> impl Iterator<Item = &Job> + Clone {
        self.jobs.values()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
        self.by_pid.clear();
    }
}
