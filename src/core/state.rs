use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::thread;

use super::event::SchedEvent;
use crate::scheduler::ReadyQueue;

// Index into Task Vec
pub type TaskId = usize;
pub type CoreId = usize;
pub type Ticks = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Not yet arrived; invisible to every ready queue.
    Pending,
    Ready,
    Running,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub arrival: Ticks,
    pub burst: Ticks,
    pub priority: i64,
    pub remaining: Ticks,
    pub state: TaskState,
    pub current_core: Option<CoreId>,
    pub start_time: Option<Ticks>,
    pub finish_time: Option<Ticks>,
    /// Sum of every slice run so far.
    pub executed: Ticks,
    pub dispatches: u32,
}

impl Task {
    pub fn new(id: TaskId, name: String, arrival: Ticks, burst: Ticks, priority: i64) -> Self {
        Self {
            id,
            name,
            arrival,
            burst,
            priority,
            remaining: 0,
            state: TaskState::Pending,
            current_core: None,
            start_time: None,
            finish_time: None,
            executed: 0,
            dispatches: 0,
        }
    }

}

/// A dispatched run of `len` ticks that ends at `until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub task: TaskId,
    pub len: Ticks,
    pub until: Ticks,
}

#[derive(Debug)]
pub struct CoreState {
    pub id: CoreId,
    pub current: Option<Slice>,
}

#[derive(Debug)]
pub struct SchedState {
    pub now: Ticks,
    pub tasks: Vec<Task>,
    pub cores: Vec<CoreState>,
    pub ready: Box<dyn ReadyQueue>,
    /// Tasks not yet retired.
    pub live: usize,
    /// Cores whose slice ends at `now`, in the order they must complete.
    pub completing: VecDeque<CoreId>,
    /// No further arrivals or completions will happen.
    pub closed: bool,
    pub aborted: bool,
    pub events: Vec<SchedEvent>,
}

impl SchedState {
    pub fn new(tasks: Vec<Task>, num_cores: usize, ready: Box<dyn ReadyQueue>) -> Self {
        debug_assert!(
            tasks.iter().enumerate().all(|(i, t)| t.id == i),
            "TaskId must match Vec index"
        );

        Self {
            now: 0,
            live: tasks.len(),
            tasks,
            cores: (0..num_cores)
                .map(|id| CoreState { id, current: None })
                .collect(),
            ready,
            completing: VecDeque::new(),
            closed: false,
            aborted: false,
            events: Vec::new(),
        }
    }

    pub fn task(&self, task_id: TaskId) -> &Task {
        &self.tasks[task_id]
    }

    pub fn record(&mut self, event: SchedEvent) {
        self.events.push(event);
    }

    pub fn advance_to(&mut self, tick: Ticks) {
        debug_assert!(tick > self.now, "virtual clock must move forward");
        self.now = tick;
    }

    pub fn admit(&mut self, task_id: TaskId) {
        let now = self.now;
        let task = &mut self.tasks[task_id];
        debug_assert_eq!(task.state, TaskState::Pending, "Task {task_id} admitted twice");
        debug_assert_eq!(task.arrival, now, "Task {task_id} admitted off its arrival tick");

        task.remaining = task.burst;
        task.state = TaskState::Ready;
        self.ready.push(task_id, &self.tasks);
        self.record(SchedEvent::Admitted {
            tick: now,
            task: task_id,
        });
    }

    pub fn set_running(&mut self, core: CoreId, task_id: TaskId, len: Ticks) -> Slice {
        debug_assert!(
            self.cores[core].current.is_none(),
            "Core {core} already running a task"
        );
        debug_assert!(
            !self.ready.contains(task_id),
            "Running task {task_id} must not be enqueued"
        );

        let now = self.now;
        let task = &mut self.tasks[task_id];
        debug_assert_eq!(task.state, TaskState::Ready);
        debug_assert!(len > 0 && len <= task.remaining, "bad slice {len}");

        task.start_time.get_or_insert(now);
        task.state = TaskState::Running;
        task.current_core = Some(core);
        task.dispatches += 1;

        // A slice past the end of time never completes; the dispatcher aborts
        let slice = Slice {
            task: task_id,
            len,
            until: now.saturating_add(len),
        };
        self.cores[core].current = Some(slice);
        self.record(SchedEvent::Dispatched {
            tick: now,
            task: task_id,
            core,
            slice: len,
        });
        slice
    }

    // Return TaskId if the slice retired its task
    pub fn finish_slice(&mut self, core: CoreId) -> Option<TaskId> {
        let slice = self.cores[core].current.take()?;
        let now = self.now;
        debug_assert_eq!(slice.until, now, "Core {core} completed off its slice end");

        let task = &mut self.tasks[slice.task];
        task.remaining -= slice.len;
        task.executed += slice.len;
        task.current_core = None;

        if task.remaining > 0 {
            let remaining = task.remaining;
            task.state = TaskState::Ready;
            self.ready.push(slice.task, &self.tasks);
            self.record(SchedEvent::Requeued {
                tick: now,
                task: slice.task,
                remaining,
            });
            return None;
        }

        task.state = TaskState::Completed;
        task.finish_time = Some(now);
        self.live -= 1;
        self.record(SchedEvent::Retired {
            tick: now,
            task: slice.task,
        });
        Some(slice.task)
    }

    /// Queue every core whose slice ends now, lowest task index first.
    pub fn mark_due(&mut self) {
        let now = self.now;
        let mut due: Vec<(TaskId, CoreId)> = self
            .cores
            .iter()
            .filter_map(|core| {
                core.current
                    .filter(|slice| slice.until == now)
                    .map(|slice| (slice.task, core.id))
            })
            .collect();
        due.sort_unstable();
        self.completing.extend(due.into_iter().map(|(_, core)| core));
    }

    pub fn next_slice_end(&self) -> Option<Ticks> {
        self.cores
            .iter()
            .filter_map(|core| core.current.map(|slice| slice.until))
            .min()
    }

    pub fn idle_cores(&self) -> usize {
        self.cores.iter().filter(|core| core.current.is_none()).count()
    }

    pub fn finished(&self) -> bool {
        self.live == 0 || self.closed
    }

    /// Idle cores may pick work only once the tick's completions are applied.
    pub fn selection_ready(&self) -> bool {
        self.completing.is_empty() && !self.ready.is_empty()
    }

    /// Nothing more can happen at the current tick.
    pub fn quiescent(&self) -> bool {
        self.completing.is_empty() && (self.ready.is_empty() || self.idle_cores() == 0)
    }
}

/// Scheduler state behind the single coordination lock, plus its wake condition.
#[derive(Debug)]
pub struct Shared {
    state: Mutex<SchedState>,
    wake: Condvar,
}

impl Shared {
    pub fn new(state: SchedState) -> Self {
        Self {
            state: Mutex::new(state),
            wake: Condvar::new(),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, SchedState> {
        self.state.lock()
    }

    /// Block until `ready` holds. Re-checked on every wake.
    pub fn wait_until<F>(&self, guard: &mut MutexGuard<'_, SchedState>, mut ready: F)
    where
        F: FnMut(&SchedState) -> bool,
    {
        self.wake
            .wait_while(guard, |state: &mut SchedState| !ready(&*state));
    }

    pub fn notify_all(&self) {
        self.wake.notify_all();
    }

    /// Stop the run and wake everyone. Used on abnormal exits.
    pub fn close(&self, aborted: bool) {
        let mut state = self.lock();
        state.closed = true;
        state.aborted |= aborted;
        drop(state);
        self.notify_all();
    }

    /// Closes the run if the holding thread unwinds.
    pub fn close_on_panic(&self) -> PanicGuard<'_> {
        PanicGuard(self)
    }

    pub fn into_inner(self) -> SchedState {
        self.state.into_inner()
    }
}

// A thread that dies mid-run would otherwise leave its peers waiting forever.
#[derive(Debug)]
pub struct PanicGuard<'a>(&'a Shared);

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.close(true);
        }
    }
}
