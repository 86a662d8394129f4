use std::fmt;
use std::thread;
use std::time::Duration;

use super::state::{TaskId, Ticks};

/// Paces the execution of one slice. Called by a worker outside the lock.
pub trait ExecClock: fmt::Debug + Send + Sync {
    fn run(&self, task: TaskId, slice: Ticks);
}

/// Slices take no wall time; only the virtual clock moves.
#[derive(Debug, Default, Clone, Copy)]
pub struct VirtualClock;

impl ExecClock for VirtualClock {
    fn run(&self, _task: TaskId, _slice: Ticks) {}
}

/// Sleeps `tick` per slice tick. Useful for watching a run unfold.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    tick: Duration,
}

impl WallClock {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }
}

impl ExecClock for WallClock {
    fn run(&self, _task: TaskId, slice: Ticks) {
        let ticks = u32::try_from(slice).unwrap_or(u32::MAX);
        thread::sleep(self.tick.saturating_mul(ticks));
    }
}
