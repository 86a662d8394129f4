use super::state::{SchedState, TaskState};

/// Checks scheduler invariants each time the dispatcher settles a tick.
#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
    peak_ready: usize,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, state: &SchedState) {
        self.step += 1;
        self.peak_ready = self.peak_ready.max(state.ready.len());

        if !cfg!(debug_assertions) {
            return;
        }

        for core in &state.cores {
            if let Some(slice) = core.current {
                let task = state.task(slice.task);
                debug_assert_eq!(
                    task.state,
                    TaskState::Running,
                    "core.current task {} must be Running",
                    slice.task
                );
                debug_assert_eq!(
                    task.current_core,
                    Some(core.id),
                    "Task {} metadata current_core mismatch",
                    slice.task
                );
                debug_assert!(
                    slice.until > state.now,
                    "Core {} holds an expired slice",
                    core.id
                );
            }
        }

        let mut live = 0;
        for task in &state.tasks {
            debug_assert!(
                task.remaining <= task.burst,
                "Task {} remaining exceeds burst",
                task.id
            );
            match task.state {
                TaskState::Pending => debug_assert!(task.arrival > state.now),
                TaskState::Ready => debug_assert!(
                    state.ready.contains(task.id),
                    "Ready task {} missing from ready queue",
                    task.id
                ),
                TaskState::Running => debug_assert!(
                    !state.ready.contains(task.id),
                    "Running task {} must not appear in the ready queue",
                    task.id
                ),
                TaskState::Completed => debug_assert!(
                    task.remaining == 0 && task.finish_time.is_some(),
                    "Completed task {} not fully retired",
                    task.id
                ),
            }
            if task.state != TaskState::Completed {
                live += 1;
            }
        }
        debug_assert_eq!(live, state.live, "live-task counter drifted");
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn peak_ready(&self) -> usize {
        self.peak_ready
    }
}
