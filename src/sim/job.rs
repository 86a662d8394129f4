use rustc_hash::FxHashSet;

use crate::core::{Task, Ticks};
use crate::error::{Error, Result};

/// One input record: a unit of work and when it shows up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub arrival: Ticks,
    pub burst: Ticks,
    pub priority: i64,
}

impl Job {
    pub fn new<S: Into<String>>(id: S, arrival: Ticks, burst: Ticks, priority: i64) -> Self {
        Self {
            id: id.into(),
            arrival,
            burst,
            priority,
        }
    }
}

/// Validated, ordered list of jobs handed to the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSet {
    jobs: Vec<Job>,
}

impl TaskSet {
    pub fn new(jobs: Vec<Job>) -> Result<Self> {
        let mut seen = FxHashSet::default();
        for job in &jobs {
            if job.burst == 0 {
                return Err(Error::invalid_task(&job.id, "burst must be positive"));
            }
            if !seen.insert(job.id.as_str()) {
                return Err(Error::DuplicateTask(job.id.clone()));
            }
        }
        Ok(Self { jobs })
    }

    /// Workload used when no usable input is supplied.
    pub fn sample() -> Self {
        Self {
            jobs: vec![
                Job::new("P1", 0, 7, 2),
                Job::new("P2", 1, 4, 1),
                Job::new("P3", 2, 9, 3),
                Job::new("P4", 3, 5, 2),
                Job::new("P5", 6, 3, 1),
            ],
        }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.jobs
            .into_iter()
            .enumerate()
            .map(|(id, job)| Task::new(id, job.id, job.arrival, job.burst, job.priority))
            .collect()
    }
}
