use tracing::{debug, trace};

use super::{
    clock::ExecClock,
    state::{CoreId, Shared},
};
use crate::config::SchedConfig;

/// One simulated core. Picks ready tasks, runs a slice, requeues or retires.
#[derive(Debug)]
pub struct Worker<'a> {
    id: CoreId,
    shared: &'a Shared,
    config: &'a SchedConfig,
    clock: &'a dyn ExecClock,
}

impl<'a> Worker<'a> {
    pub fn new(
        id: CoreId,
        shared: &'a Shared,
        config: &'a SchedConfig,
        clock: &'a dyn ExecClock,
    ) -> Self {
        Self {
            id,
            shared,
            config,
            clock,
        }
    }

    // main loop
    pub fn run(self) {
        let _guard = self.shared.close_on_panic();
        let shared = self.shared;
        let mut slices = 0u64;

        loop {
            let slice = {
                let mut state = shared.lock();
                shared.wait_until(&mut state, |s| s.finished() || s.selection_ready());
                if state.finished() {
                    break;
                }

                let Some(task) = state.ready.pop() else {
                    continue;
                };
                let len = self.config.slice_for(state.task(task).remaining);
                let slice = state.set_running(self.id, task, len);
                debug!(
                    tick = state.now,
                    core = self.id,
                    task = %state.task(task).name,
                    slice = len,
                    "dispatched"
                );
                // Dispatcher may be waiting for this core to leave idle
                shared.notify_all();
                slice
            };

            self.clock.run(slice.task, slice.len);

            let mut state = shared.lock();
            let id = self.id;
            shared.wait_until(&mut state, |s| {
                s.closed || s.completing.front() == Some(&id)
            });
            if state.closed {
                break;
            }

            state.completing.pop_front();
            match state.finish_slice(id) {
                Some(task) => debug!(
                    tick = state.now,
                    core = id,
                    task = %state.task(task).name,
                    "retired"
                ),
                None => trace!(
                    tick = state.now,
                    core = id,
                    task = %state.task(slice.task).name,
                    remaining = state.task(slice.task).remaining,
                    "requeued"
                ),
            }
            slices += 1;
            drop(state);
            shared.notify_all();
        }

        debug!(core = self.id, slices, "worker exiting");
    }
}
