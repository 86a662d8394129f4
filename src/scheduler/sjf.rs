use std::cmp::Reverse;

use keyed_priority_queue::KeyedPriorityQueue;

use super::ReadyQueue;
use crate::core::{Task, TaskId, Ticks};

// KeyedPriorityQueue is a max-heap, so the key is reversed
type RemainingKey = Reverse<(Ticks, Ticks, TaskId)>;

/// Smallest `remaining` first; ties go to the earlier arrival, then the lower index.
#[derive(Debug)]
pub struct ShortestRemainingQueue {
    tasks: KeyedPriorityQueue<TaskId, RemainingKey>,
}

impl ShortestRemainingQueue {
    pub fn new() -> Self {
        Self {
            tasks: KeyedPriorityQueue::new(),
        }
    }
}

impl Default for ShortestRemainingQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadyQueue for ShortestRemainingQueue {
    fn push(&mut self, task: TaskId, tasks: &[Task]) {
        let t = &tasks[task];
        let previous = self.tasks.push(task, Reverse((t.remaining, t.arrival, task)));
        debug_assert!(previous.is_none(), "Task {task} already queued");
    }

    fn pop(&mut self) -> Option<TaskId> {
        self.tasks.pop().map(|(task, _)| task)
    }

    fn len(&self) -> usize {
        self.tasks.len()
    }

    fn contains(&self, task: TaskId) -> bool {
        self.tasks.iter().any(|(id, _)| *id == task)
    }
}
