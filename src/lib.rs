//! Multi-core CPU scheduling simulator.
//!
//! A dispatcher thread owns a virtual clock and admits tasks as they arrive;
//! one worker thread per simulated core pulls tasks from a policy-specific
//! ready queue (round-robin, shortest-job-first or static priority), runs a
//! slice, and requeues or retires it. Schedules are deterministic: the same
//! task set and configuration always yield the same start and finish times.

pub mod config;
pub mod core;
pub mod error;
pub mod metrics;
pub mod scheduler;
pub mod sim;

pub use crate::config::{SchedConfig, SchedConfigBuilder};
pub use crate::core::{ExecClock, SchedEvent, Task, TaskId, TaskState, Ticks, VirtualClock, WallClock};
pub use crate::error::{Error, Result};
pub use crate::metrics::{Metrics, Report};
pub use crate::scheduler::{Policy, ReadyQueue};
pub use crate::sim::{Job, Schedule, Sim, TaskSet};
