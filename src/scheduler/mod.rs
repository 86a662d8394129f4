pub mod fifo;
pub mod priq;
pub mod sjf;

use std::fmt;
use std::str::FromStr;

use crate::core::{Task, TaskId, Ticks};
pub use fifo::FifoQueue;
pub use priq::PriorityQueue;
pub use sjf::ShortestRemainingQueue;

/// Holds the indices of tasks eligible to run.
///
/// Ordering keys are read from the live task table at push time. A queued
/// task is never mutated, so the key stays current until it is popped.
pub trait ReadyQueue: fmt::Debug + Send {
    fn push(&mut self, task: TaskId, tasks: &[Task]);

    fn pop(&mut self) -> Option<TaskId>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, task: TaskId) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Policy {
    #[default]
    RoundRobin,
    /// Shortest remaining time first, runs to completion once picked.
    Sjf,
    /// Smallest priority value first, earlier arrival on ties; runs to completion.
    Priority,
}

impl Policy {
    pub fn ready_queue(self) -> Box<dyn ReadyQueue> {
        match self {
            Policy::RoundRobin => Box::new(FifoQueue::new()),
            Policy::Sjf => Box::new(ShortestRemainingQueue::new()),
            Policy::Priority => Box::new(PriorityQueue::new()),
        }
    }

    pub fn is_preemptive(self) -> bool {
        matches!(self, Policy::RoundRobin)
    }

    /// Ticks a task with `remaining` work runs for once dispatched.
    pub fn slice(self, quantum: Ticks, remaining: Ticks) -> Ticks {
        if self.is_preemptive() {
            quantum.min(remaining)
        } else {
            remaining
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Policy::RoundRobin => "RR",
            Policy::Sjf => "SJF",
            Policy::Priority => "PRIORITY",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rr" | "round-robin" => Ok(Policy::RoundRobin),
            "sjf" => Ok(Policy::Sjf),
            "priority" | "prio" => Ok(Policy::Priority),
            other => Err(format!("unknown policy {other:?} (expected rr, sjf or priority)")),
        }
    }
}

#[cfg(test)]
pub(crate) fn task_table(specs: &[(Ticks, Ticks, i64)]) -> Vec<Task> {
    specs
        .iter()
        .enumerate()
        .map(|(i, &(arrival, burst, priority))| {
            let mut task = Task::new(i, format!("T{i}"), arrival, burst, priority);
            task.remaining = burst;
            task
        })
        .collect()
}
