use parking_lot::MutexGuard;
use tracing::{debug, error, trace};

use super::{
    event::SchedEvent,
    observer::Observer,
    state::{SchedState, Shared, TaskId, Ticks},
};
use crate::error::{Error, Result};

/// Owns the virtual clock: admits arrivals, releases due slices, and decides
/// when the run has converged or must be aborted.
#[derive(Debug)]
pub struct Dispatcher<'a> {
    shared: &'a Shared,
    // Task ids sorted by (arrival, id); everything before the cursor is admitted
    arrivals: Vec<TaskId>,
    cursor: usize,
    max_ticks: Ticks,
    observer: Observer,
}

impl<'a> Dispatcher<'a> {
    pub fn new(shared: &'a Shared, max_ticks: Ticks) -> Self {
        let arrivals = {
            let state = shared.lock();
            let mut arrivals: Vec<TaskId> = (0..state.tasks.len()).collect();
            arrivals.sort_by_key(|&id| (state.task(id).arrival, id));
            arrivals
        };

        Self {
            shared,
            arrivals,
            cursor: 0,
            max_ticks,
            observer: Observer::new(),
        }
    }

    pub fn run(mut self) -> Result<()> {
        let shared = self.shared;
        let _guard = shared.close_on_panic();
        let mut state = shared.lock();

        let outcome = loop {
            // Admission and the due list for a tick land under one lock hold
            self.handle_arrivals(&mut state);
            state.mark_due();
            shared.notify_all();

            shared.wait_until(&mut state, |s| s.closed || s.quiescent());
            if state.closed {
                break Err(Error::WorkerPanic(
                    "worker exited before the run converged".to_string(),
                ));
            }
            self.observer.observe(&state);

            if state.live == 0 {
                break Ok(());
            }

            match self.next_event(&state) {
                Some(next) if next <= self.max_ticks => {
                    trace!(from = state.now, to = next, "advancing clock");
                    state.advance_to(next);
                }
                next => {
                    let (tick, live) = (state.now, state.live);
                    error!(
                        tick,
                        live,
                        next_event = ?next,
                        max_ticks = self.max_ticks,
                        "scheduling did not converge, aborting run"
                    );
                    state.aborted = true;
                    state.record(SchedEvent::Aborted { tick, live });
                    break Err(Error::NotConverged {
                        tick,
                        live,
                        max_ticks: self.max_ticks,
                    });
                }
            }
        };

        // No more arrivals will ever occur
        state.closed = true;
        debug!(
            tick = state.now,
            steps = self.observer.steps(),
            peak_ready = self.observer.peak_ready(),
            "dispatcher exiting"
        );
        drop(state);
        shared.notify_all();
        outcome
    }

    fn handle_arrivals(&mut self, state: &mut MutexGuard<'_, SchedState>) {
        let now = state.now;
        while let Some(&task_id) = self.arrivals.get(self.cursor) {
            // Contiguous, since arrivals are sorted
            if state.task(task_id).arrival != now {
                break;
            }
            state.admit(task_id);
            debug!(tick = now, task = %state.task(task_id).name, "admitted");
            self.cursor += 1;
        }
    }

    fn next_event(&self, state: &SchedState) -> Option<Ticks> {
        let next_arrival = self
            .arrivals
            .get(self.cursor)
            .map(|&id| state.task(id).arrival);

        match (next_arrival, state.next_slice_end()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
