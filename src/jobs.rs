//! Job registry
//!
//! Tracks every process launched by the shell. Pure data: no I/O, no signals.
//! Lookups in both directions (id → pid, pid → id) go through side indexes;
//! iteration follows insertion order for `lj`.

use nix::unistd::Pid;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub type JobId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Active,
    Suspended,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Active => f.write_str("Actif"),
            JobStatus::Suspended => f.write_str("Suspendu"),
        }
    }
}

/// One tracked process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub pid: Pid,
    pub status: JobStatus,
    /// Program name of the first pipeline stage
    pub command: String,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}\t{}\t{}", self.id, self.pid, self.status, self.command)
    }
}

/// Insertion-ordered collection of jobs
#[derive(Debug, Default)]
pub struct JobRegistry {
    /// Jobs keyed by insertion sequence
    jobs: BTreeMap<u64, Job>,
    by_id: HashMap<JobId, u64>,
    by_pid: HashMap<Pid, u64>,
    next_seq: u64,
    next_id: JobId,
}

impl JobRegistry {
    pub fn new() -> Self {
        JobRegistry {
            next_id: 1,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Allocate the id for a job about to be added.
    ///
    /// Ids restart at 1 whenever the registry is empty at allocation time.
    pub fn next_id(&mut self) -> JobId {
        if self.is_empty() {
            self.next_id = 1;
        }
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append a job. The caller guarantees `id` and `pid` are not already registered.
    pub fn add(&mut self, id: JobId, pid: Pid, status: JobStatus, command: impl Into<String>) {
        debug_assert!(!self.by_id.contains_key(&id), "duplicate job id {}", id);
        debug_assert!(!self.by_pid.contains_key(&pid), "duplicate pid {}", pid);

        let seq = self.next_seq;
        self.next_seq += 1;
        self.jobs.insert(
            seq,
            Job {
                id,
                pid,
                status,
                command: command.into(),
            },
        );
        self.by_id.insert(id, seq);
        self.by_pid.insert(pid, seq);
        if id >= self.next_id {
            self.next_id = id + 1;
        }
    }

    /// Remove the job owning `pid`; returns it if there was one
    pub fn remove(&mut self, pid: Pid) -> Option<Job> {
        let seq = self.by_pid.remove(&pid)?;
        let job = self.jobs.remove(&seq)?;
        self.by_id.remove(&job.id);
        Some(job)
    }

    /// Update a job's status; returns false when no job has `id`
    pub fn set_status(&mut self, id: JobId, status: JobStatus) -> bool {
        match self.by_id.get(&id).and_then(|seq| self.jobs.get_mut(seq)) {
            Some(job) => {
                job.status = status;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.by_id.get(&id).and_then(|seq| self.jobs.get(seq))
    }

    pub fn find_handle(&self, id: JobId) -> Option<Pid> {
        self.get(id).map(|job| job.pid)
    }

    pub fn find_id(&self, pid: Pid) -> Option<JobId> {
        self.by_pid
            .get(&pid)
            .and_then(|seq| self.jobs.get(seq))
            .map(|job| job.id)
    }

    /// Jobs in insertion order
    pub fn list(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: i32) -> Pid {
        Pid::from_raw(n)
    }

    fn register(reg: &mut JobRegistry, raw: i32, cmd: &str) -> JobId {
        let id = reg.next_id();
        reg.add(id, pid(raw), JobStatus::Active, cmd);
        id
    }

    #[test]
    fn starts_empty() {
        let reg = JobRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
        assert_eq!(reg.list().count(), 0);
    }

    #[test]
    fn ids_increase_while_non_empty() {
        let mut reg = JobRegistry::new();
        assert_eq!(register(&mut reg, 100, "sleep"), 1);
        assert_eq!(register(&mut reg, 101, "cat"), 2);
        reg.remove(pid(100));
        // Still non-empty, so ids keep climbing
        assert_eq!(register(&mut reg, 102, "wc"), 3);
    }

    #[test]
    fn ids_reset_when_empty() {
        let mut reg = JobRegistry::new();
        register(&mut reg, 100, "sleep");
        register(&mut reg, 101, "sleep");
        reg.remove(pid(100));
        reg.remove(pid(101));
        assert!(reg.is_empty());
        assert_eq!(register(&mut reg, 102, "echo"), 1);
    }

    #[test]
    fn ids_unique_across_churn() {
        let mut reg = JobRegistry::new();
        let mut raw = 1000;
        for round in 0..20 {
            for _ in 0..3 {
                raw += 1;
                register(&mut reg, raw, "job");
            }
            // Remove the oldest job each round, leaving the registry non-empty
            let oldest = reg.list().next().map(|j| j.pid).unwrap();
            reg.remove(oldest);

            let mut ids: Vec<JobId> = reg.list().map(|j| j.id).collect();
            let before = ids.len();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), before, "duplicate id in round {}", round);
        }
    }

    #[test]
    fn remove_unknown_pid_is_noop() {
        let mut reg = JobRegistry::new();
        register(&mut reg, 100, "sleep");
        assert!(reg.remove(pid(999)).is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn remove_returns_job() {
        let mut reg = JobRegistry::new();
        register(&mut reg, 100, "sleep");
        let job = reg.remove(pid(100)).unwrap();
        assert_eq!(job.id, 1);
        assert_eq!(job.command, "sleep");
        assert!(reg.find_id(pid(100)).is_none());
        assert!(reg.find_handle(1).is_none());
    }

    #[test]
    fn set_status_and_lookup() {
        let mut reg = JobRegistry::new();
        let id = register(&mut reg, 100, "sleep");
        assert!(reg.set_status(id, JobStatus::Suspended));
        assert_eq!(reg.get(id).unwrap().status, JobStatus::Suspended);
        assert!(!reg.set_status(42, JobStatus::Active));
        assert_eq!(reg.find_handle(id), Some(pid(100)));
        assert_eq!(reg.find_id(pid(100)), Some(id));
    }

    #[test]
    fn list_keeps_insertion_order() {
        let mut reg = JobRegistry::new();
        register(&mut reg, 300, "a");
        register(&mut reg, 100, "b");
        register(&mut reg, 200, "c");
        reg.remove(pid(100));
        let names: Vec<&str> = reg.list().map(|j| j.command.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn display_format() {
        let job = Job {
            id: 3,
            pid: pid(4242),
            status: JobStatus::Suspended,
            command: "sleep".into(),
        };
        assert_eq!(job.to_string(), "[3] 4242\tSuspendu\tsleep");
    }
}
