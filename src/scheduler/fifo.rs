use std::collections::VecDeque;

use super::ReadyQueue;
use crate::core::{Task, TaskId};

/// Round-robin order: arrivals and requeues both go to the tail.
#[derive(Debug, Default)]
pub struct FifoQueue {
    tasks: VecDeque<TaskId>,
}

impl FifoQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadyQueue for FifoQueue {
    fn push(&mut self, task: TaskId, _tasks: &[Task]) {
        self.tasks.push_back(task);
    }

    fn pop(&mut self) -> Option<TaskId> {
        self.tasks.pop_front()
    }

    fn len(&self) -> usize {
        self.tasks.len()
    }

    fn contains(&self, task: TaskId) -> bool {
        self.tasks.contains(&task)
    }
}
