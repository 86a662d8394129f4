use std::any::Any;
use std::thread::{self, ScopedJoinHandle};

use tracing::info;

use super::job::TaskSet;
use crate::{
    config::SchedConfig,
    core::{
        clock::{ExecClock, VirtualClock},
        driver::Dispatcher,
        event::SchedEvent,
        state::{SchedState, Shared, Task, TaskId, Ticks},
        worker::Worker,
    },
    error::{Error, Result},
    scheduler::Policy,
};

/// Composition root: owns the task table for one run, spawns the dispatcher
/// and one worker thread per core, and hands back the finished schedule.
#[derive(Debug)]
pub struct Sim {
    tasks: Vec<Task>,
    config: SchedConfig,
    clock: Box<dyn ExecClock>,
}

impl Sim {
    pub fn new(task_set: TaskSet, config: SchedConfig) -> Self {
        Self {
            tasks: task_set.into_tasks(),
            config,
            clock: Box::new(VirtualClock),
        }
    }

    pub fn with_clock<C: ExecClock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &SchedConfig {
        &self.config
    }

    pub fn run(self) -> Result<Schedule> {
        let Sim {
            tasks,
            config,
            clock,
        } = self;
        info!(
            policy = %config.policy,
            cores = config.cores,
            quantum = config.quantum,
            tasks = tasks.len(),
            "starting run"
        );

        let state = SchedState::new(tasks, config.cores, config.policy.ready_queue());
        let shared = Shared::new(state);

        thread::scope(|scope| -> Result<()> {
            let mut workers = Vec::with_capacity(config.cores);
            for id in 0..config.cores {
                let worker = Worker::new(id, &shared, &config, clock.as_ref());
                let spawned = thread::Builder::new()
                    .name(format!("core-{id}"))
                    .spawn_scoped(scope, move || worker.run());
                match spawned {
                    Ok(handle) => workers.push(handle),
                    Err(e) => {
                        shared.close(true);
                        join_all(workers)?;
                        return Err(Error::Spawn(e));
                    }
                }
            }

            let dispatcher = Dispatcher::new(&shared, config.max_ticks);
            let converged = match thread::Builder::new()
                .name("dispatcher".to_string())
                .spawn_scoped(scope, move || dispatcher.run())
            {
                Ok(handle) => handle.join().unwrap_or_else(|payload| {
                    shared.close(true);
                    Err(Error::WorkerPanic(panic_message(payload)))
                }),
                Err(e) => {
                    shared.close(true);
                    join_all(workers)?;
                    return Err(Error::Spawn(e));
                }
            };

            // Dispatcher already closed the run; make sure nobody sleeps through it
            shared.notify_all();
            join_all(workers)?;
            converged
        })?;

        let state = shared.into_inner();
        let schedule = Schedule {
            tasks: state.tasks,
            events: state.events,
            policy: config.policy,
            cores: config.cores,
        };
        info!(makespan = schedule.makespan(), "run converged");
        Ok(schedule)
    }
}

fn join_all(workers: Vec<ScopedJoinHandle<'_, ()>>) -> Result<()> {
    let mut outcome = Ok(());
    for handle in workers {
        if let Err(payload) = handle.join() {
            outcome = Err(Error::WorkerPanic(panic_message(payload)));
        }
    }
    outcome
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Result of a converged run: every task has a finish time.
#[derive(Debug, Clone)]
pub struct Schedule {
    tasks: Vec<Task>,
    events: Vec<SchedEvent>,
    policy: Policy,
    cores: usize,
}

impl Schedule {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn events(&self) -> &[SchedEvent] {
        &self.events
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn cores(&self) -> usize {
        self.cores
    }

    pub fn task_by_name(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Latest finish time, or 0 for an empty schedule.
    pub fn makespan(&self) -> Ticks {
        self.tasks
            .iter()
            .filter_map(|t| t.finish_time)
            .max()
            .unwrap_or(0)
    }

    /// Task names ordered by finish time, then index.
    pub fn finish_order(&self) -> Vec<&str> {
        let mut done: Vec<&Task> = self.tasks.iter().collect();
        done.sort_by_key(|t| (t.finish_time, t.id));
        done.into_iter().map(|t| t.name.as_str()).collect()
    }

    /// Tasks in the order they were first dispatched.
    pub fn dispatch_order(&self) -> Vec<&str> {
        let mut seen = vec![false; self.tasks.len()];
        self.events
            .iter()
            .filter_map(|event| match *event {
                SchedEvent::Dispatched { task, .. } if !seen[task] => {
                    seen[task] = true;
                    Some(self.tasks[task].name.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// `(tick, slice)` of every dispatch of `task`.
    pub fn slices_of(&self, task: TaskId) -> Vec<(Ticks, Ticks)> {
        self.events
            .iter()
            .filter_map(|event| match *event {
                SchedEvent::Dispatched {
                    tick,
                    task: t,
                    slice,
                    ..
                } if t == task => Some((tick, slice)),
                _ => None,
            })
            .collect()
    }
}
