use std::fmt;

use super::state::{CoreId, TaskId, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedEvent {
    Admitted {
        tick: Ticks,
        task: TaskId,
    },
    Dispatched {
        tick: Ticks,
        task: TaskId,
        core: CoreId,
        slice: Ticks,
    },
    // Slice expired with work left; task went back to the ready queue
    Requeued {
        tick: Ticks,
        task: TaskId,
        remaining: Ticks,
    },
    Retired {
        tick: Ticks,
        task: TaskId,
    },
    // Safety bound reached with tasks still live
    Aborted {
        tick: Ticks,
        live: usize,
    },
}

impl SchedEvent {
    pub fn tick(&self) -> Ticks {
        match *self {
            Self::Admitted { tick, .. }
            | Self::Dispatched { tick, .. }
            | Self::Requeued { tick, .. }
            | Self::Retired { tick, .. }
            | Self::Aborted { tick, .. } => tick,
        }
    }

    pub fn task(&self) -> Option<TaskId> {
        match *self {
            Self::Admitted { task, .. }
            | Self::Dispatched { task, .. }
            | Self::Requeued { task, .. }
            | Self::Retired { task, .. } => Some(task),
            Self::Aborted { .. } => None,
        }
    }
}

impl fmt::Display for SchedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admitted { tick, task } => write!(f, "t={tick} admit task={task}"),
            Self::Dispatched {
                tick,
                task,
                core,
                slice,
            } => write!(f, "t={tick} dispatch task={task} core={core} slice={slice}"),
            Self::Requeued {
                tick,
                task,
                remaining,
            } => write!(f, "t={tick} requeue task={task} remaining={remaining}"),
            Self::Retired { tick, task } => write!(f, "t={tick} retire task={task}"),
            Self::Aborted { tick, live } => write!(f, "t={tick} abort live={live}"),
        }
    }
}
