use std::cmp::Reverse;

use keyed_priority_queue::KeyedPriorityQueue;

use super::ReadyQueue;
use crate::core::{Task, TaskId, Ticks};

// Smaller priority value is more urgent; reversed for the max-heap
type PriorityKey = Reverse<(i64, Ticks, TaskId)>;

#[derive(Debug)]
pub struct PriorityQueue {
    tasks: KeyedPriorityQueue<TaskId, PriorityKey>,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self {
            tasks: KeyedPriorityQueue::new(),
        }
    }
}

impl Default for PriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadyQueue for PriorityQueue {
    fn push(&mut self, task: TaskId, tasks: &[Task]) {
        let t = &tasks[task];
        let previous = self.tasks.push(task, Reverse((t.priority, t.arrival, task)));
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
