use std::path::PathBuf;

use crate::core::Ticks;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read task set from {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("task set is empty")]
    EmptyTaskSet,

    #[error("duplicate task id {0:?}")]
    DuplicateTask(String),

    #[error("invalid task {id:?}: {reason}")]
    InvalidTask { id: String, reason: String },

    #[error(
        "scheduling did not converge: {live} task(s) still live at tick {tick} (max_ticks = {max_ticks})"
    )]
    NotConverged {
        tick: Ticks,
        live: usize,
        max_ticks: Ticks,
    },

    #[error("task {task:?} has not finished")]
    Unfinished { task: String },

    #[error("failed to spawn scheduler thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("worker panic: {0}")]
    WorkerPanic(String),
}

impl Error {
    pub fn invalid_task<S: Into<String>, R: Into<String>>(id: S, reason: R) -> Self {
        Error::InvalidTask {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// True when the run itself failed, as opposed to a bad input.
    pub fn is_convergence_failure(&self) -> bool {
        matches!(self, Error::NotConverged { .. })
    }
}
