//! Signal relay state machine
//!
//! `JobControl` owns the job registry together with the foreground marker and is the
//! only place where child-state notifications turn into registry transitions.
//! Notifications come from two paths that share `handle_event`:
//! - the foreground wait (`wait_foreground`) after launching a stage or `fg`
//! - `drain_children`, run at safe points once SIGCHLD has been flagged
//!
//! The foreground marker is explicit state here; every change is mirrored into
//! `signals::FOREGROUND_PID` so the SIGINT/SIGTSTP handlers know whom to relay to.

use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::error::{FatalOp, ShellError};
use crate::jobs::{JobId, JobRegistry, JobStatus};
use crate::signals;

/// A state change of a child process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildEvent {
    Exited(Pid, i32),
    Signaled(Pid, Signal),
    Stopped(Pid, Signal),
    Continued(Pid),
}

impl ChildEvent {
    /// Convert a `waitpid` status; `None` for "nothing to report" and ptrace events
    pub fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(pid, code) => Some(ChildEvent::Exited(pid, code)),
            WaitStatus::Signaled(pid, sig, _) => Some(ChildEvent::Signaled(pid, sig)),
            WaitStatus::Stopped(pid, sig) => Some(ChildEvent::Stopped(pid, sig)),
            WaitStatus::Continued(pid) => Some(ChildEvent::Continued(pid)),
            _ => None,
        }
    }
}

/// Job registry plus foreground marker
#[derive(Debug)]
pub struct JobControl {
    registry: JobRegistry,
    foreground: Option<JobId>,
    /// Re-promote any continued job to the foreground marker
    promote_on_continue: bool,
}

impl Default for JobControl {
    fn default() -> Self {
        Self::new(false)
    }
}

impl JobControl {
    pub fn new(promote_on_continue: bool) -> Self {
        JobControl {
            registry: JobRegistry::new(),
            foreground: None,
            promote_on_continue,
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn foreground(&self) -> Option<JobId> {
        self.foreground
    }

    /// Register a freshly forked process as a new Active job
    pub fn register(&mut self, pid: Pid, command: &str) -> JobId {
        let id = self.registry.next_id();
        self.registry.add(id, pid, JobStatus::Active, command);
        log::debug!("job [{}] registered: pid {} ({})", id, pid, command);
        id
    }

    pub fn set_status(&mut self, id: JobId, status: JobStatus) -> bool {
        let changed = self.registry.set_status(id, status);
        if changed {
            log::debug!("job [{}] -> {}", id, status);
        }
        changed
    }

    pub fn set_foreground(&mut self, id: JobId) {
        self.foreground = Some(id);
        self.publish();
    }

    pub fn clear_foreground(&mut self) {
        self.foreground = None;
        self.publish();
    }

    /// Process the foreground marker resolves to, if that job is still registered
    pub fn relay_target(&self) -> Option<Pid> {
        self.foreground.and_then(|id| self.registry.find_handle(id))
    }

    /// Apply one child notification to the registry
    pub fn handle_event(&mut self, event: ChildEvent) {
        match event {
            ChildEvent::Exited(pid, _) | ChildEvent::Signaled(pid, _) => {
                if let Some(job) = self.registry.remove(pid) {
                    log::debug!("job [{}] removed: pid {} ({:?})", job.id, pid, event);
                }
            }
            ChildEvent::Stopped(pid, _) => {
                if let Some(id) = self.registry.find_id(pid) {
                    self.set_status(id, JobStatus::Suspended);
                }
            }
            ChildEvent::Continued(pid) => {
                if let Some(id) = self.registry.find_id(pid) {
                    self.set_status(id, JobStatus::Active);
                    if self.promote_on_continue {
                        self.foreground = Some(id);
                    }
                }
            }
        }
        self.publish();
    }

    /// Reap every pending child notification without blocking
    pub fn drain_children(&mut self) -> Result<usize, ShellError> {
        let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        let mut handled = 0;
        loop {
            match waitpid(None, Some(flags)) {
                Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
                Ok(status) => {
                    if let Some(event) = ChildEvent::from_wait_status(status) {
                        self.handle_event(event);
                        handled += 1;
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(ShellError::fatal(FatalOp::Wait, e)),
            }
        }
        Ok(handled)
    }

    /// Drain children if SIGCHLD arrived since the last call
    pub fn poll(&mut self) -> Result<(), ShellError> {
        if signals::take_sigchld() {
            self.drain_children()?;
        }
        Ok(())
    }

    /// Block until `pid` exits or stops, then record the outcome
    pub fn wait_foreground(&mut self, pid: Pid) -> Result<ChildEvent, ShellError> {
        loop {
            match waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
                Ok(status) => {
                    if let Some(event) = ChildEvent::from_wait_status(status) {
                        self.handle_event(event);
                        return Ok(event);
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(ShellError::fatal(FatalOp::Wait, e)),
            }
        }
    }

    /// Mirror the marker for the signal handlers
    fn publish(&self) {
        match self.relay_target() {
            Some(pid) => signals::set_foreground_pid(pid),
            None => signals::clear_foreground_pid(),
        }
    }
}
