use std::collections::BTreeSet;

use parking_lot::Mutex;
use sched_sim::sim::{Bernoulli, bernoulli_jobs};
use sched_sim::*;

fn task_set(jobs: &[(&str, Ticks, Ticks, i64)]) -> TaskSet {
    TaskSet::new(
        jobs.iter()
            .map(|&(id, arrival, burst, priority)| Job::new(id, arrival, burst, priority))
            .collect(),
    )
    .unwrap()
}

fn run(set: TaskSet, policy: Policy, cores: usize, quantum: Ticks) -> Schedule {
    let config = SchedConfig::builder()
        .policy(policy)
        .cores(cores)
        .quantum(quantum)
        .build();
    Sim::new(set, config).run().unwrap()
}

fn finish(schedule: &Schedule, name: &str) -> Ticks {
    schedule.task_by_name(name).unwrap().finish_time.unwrap()
}

fn start(schedule: &Schedule, name: &str) -> Ticks {
    schedule.task_by_name(name).unwrap().start_time.unwrap()
}

fn random_workload(seed: u64) -> TaskSet {
    bernoulli_jobs(
        Bernoulli {
            ticks: 60,
            p_arrival: 0.5,
            ..Bernoulli::default()
        },
        seed,
    )
}

fn assert_fully_retired(schedule: &Schedule) {
    let ticks: Vec<Ticks> = schedule.events().iter().map(SchedEvent::tick).collect();
    assert!(ticks.is_sorted(), "event log out of time order");

    for task in schedule.tasks() {
        assert_eq!(task.state, TaskState::Completed, "{}", task.name);
        assert_eq!(task.remaining, 0, "{}", task.name);
        assert_eq!(task.executed, task.burst, "{}", task.name);

        let finish = task.finish_time.unwrap();
        assert!(finish >= task.arrival + task.burst, "{}", task.name);
        assert!(task.start_time.unwrap() >= task.arrival, "{}", task.name);

        let retirements = schedule
            .events()
            .iter()
            .filter(|e| matches!(e, SchedEvent::Retired { task: t, .. } if *t == task.id))
            .count();
        assert_eq!(retirements, 1, "{} retired more than once", task.name);
    }
}

#[test]
fn round_robin_single_core_trace() {
    let set = task_set(&[("P1", 0, 7, 0), ("P2", 1, 4, 0)]);
    let schedule = run(set, Policy::RoundRobin, 1, 4);

    assert_eq!(schedule.finish_order(), vec!["P2", "P1"]);
    // P1 0..4, P2 4..8, P1 8..11
    assert_eq!(finish(&schedule, "P2"), 8);
    assert_eq!(finish(&schedule, "P1"), 11);
    assert_eq!(schedule.slices_of(0), vec![(0, 4), (8, 3)]);
    assert_eq!(schedule.slices_of(1), vec![(4, 4)]);

    let report = Report::from_schedule(&schedule).unwrap();
    assert!((report.avg_turnaround - 9.0).abs() < 1e-9);
    assert!((report.throughput - 2.0 / 12.0).abs() < 1e-9);
}

#[test]
fn sjf_runs_shortest_first() {
    let set = task_set(&[
        ("T1", 0, 7, 0),
        ("T2", 0, 4, 0),
        ("T3", 0, 9, 0),
        ("T4", 0, 5, 0),
        ("T5", 0, 3, 0),
    ]);
    let schedule = run(set, Policy::Sjf, 1, 4);

    assert_eq!(schedule.dispatch_order(), vec!["T5", "T2", "T4", "T1", "T3"]);
    assert_eq!(finish(&schedule, "T5"), 3);
    assert_eq!(finish(&schedule, "T2"), 7);
    assert_eq!(finish(&schedule, "T4"), 12);
    assert_eq!(finish(&schedule, "T1"), 19);
    assert_eq!(finish(&schedule, "T3"), 28);
    // Non-preemptive: one dispatch each
    assert!(schedule.tasks().iter().all(|t| t.dispatches == 1));
}

#[test]
fn priority_tie_goes_to_earlier_arrival() {
    let set = task_set(&[
        ("X", 0, 5, 0),
        ("Y", 0, 10, 0),
        ("A", 2, 3, 1),
        ("B", 1, 3, 1),
    ]);
    let schedule = run(set, Policy::Priority, 2, 4);

    assert_eq!(start(&schedule, "B"), 5);
    assert_eq!(start(&schedule, "A"), 8);
    assert_eq!(finish(&schedule, "A"), 11);
    assert_eq!(finish(&schedule, "Y"), 10);
}

#[test]
fn unreachable_arrival_reports_abort() {
    let set = task_set(&[("P1", 0, 3, 0), ("LATE", 500, 2, 0)]);
    let config = SchedConfig::builder().max_ticks(100).build();
    let err = Sim::new(set, config).run().unwrap_err();

    assert!(err.is_convergence_failure());
    match err {
        Error::NotConverged {
            live, max_ticks, ..
        } => {
            assert_eq!(live, 1);
            assert_eq!(max_ticks, 100);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn huge_burst_is_a_convergence_failure() {
    for policy in [Policy::Sjf, Policy::Priority, Policy::RoundRobin] {
        let set = task_set(&[("A", 1, Ticks::MAX, 0), ("B", 0, 2, 0)]);
        let config = SchedConfig::builder()
            .policy(policy)
            .cores(1)
            .max_ticks(100)
            .build();
        let err = Sim::new(set, config).run().unwrap_err();

        assert!(err.is_convergence_failure(), "{policy}: {err:?}");
        match err {
            Error::NotConverged { tick, live, .. } => {
                assert_eq!(live, 1, "{policy}");
                assert!(tick <= 100, "{policy}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}

#[test]
fn sample_workload_converges_under_every_policy() {
    for policy in [Policy::RoundRobin, Policy::Sjf, Policy::Priority] {
        for cores in [1, 2, 3, 8] {
            let schedule = run(TaskSet::sample(), policy, cores, 4);
            assert_eq!(schedule.policy(), policy);
            assert_eq!(schedule.cores(), cores);
            assert_fully_retired(&schedule);
            Report::from_schedule(&schedule).unwrap();
        }
    }
}

#[test]
fn slices_sum_to_burst() {
    for seed in 0..4 {
        let schedule = run(random_workload(seed), Policy::RoundRobin, 3, 2);
        assert_fully_retired(&schedule);
        for task in schedule.tasks() {
            let total: Ticks = schedule.slices_of(task.id).iter().map(|&(_, s)| s).sum();
            assert_eq!(total, task.burst, "{}", task.name);
            assert!(schedule.slices_of(task.id).iter().all(|&(_, s)| s <= 2));
        }
    }
}

#[test]
fn round_robin_wait_is_bounded() {
    let quantum = 2;
    let bursts = [5, 7, 3, 6, 4];
    let jobs: Vec<_> = bursts
        .iter()
        .enumerate()
        .map(|(i, &b)| Job::new(format!("T{i}"), 0, b, 0))
        .collect();
    let n = jobs.len() as Ticks;
    let schedule = run(TaskSet::new(jobs).unwrap(), Policy::RoundRobin, 1, quantum);

    for task in schedule.tasks() {
        let slices = schedule.slices_of(task.id);
        assert!(slices[0].0 <= (n - 1) * quantum, "{} waited too long to start", task.name);
        for pair in slices.windows(2) {
            let (prev_tick, prev_len) = pair[0];
            let gap = pair[1].0 - (prev_tick + prev_len);
            assert!(gap <= (n - 1) * quantum, "{} starved for {gap} ticks", task.name);
        }
    }
}

// Replays the event log, keeping the ready set, and checks each dispatch
// took the smallest key.
fn assert_dispatches_follow<K: Ord + Copy>(schedule: &Schedule, key: impl Fn(&Task, Ticks) -> K) {
    let tasks = schedule.tasks();
    let mut ready: BTreeSet<(K, TaskId)> = BTreeSet::new();
    let mut remaining: Vec<Ticks> = tasks.iter().map(|t| t.burst).collect();

    for event in schedule.events() {
        match *event {
            SchedEvent::Admitted { task, .. } => {
                ready.insert((key(&tasks[task], remaining[task]), task));
            }
            SchedEvent::Requeued { task, remaining: r, .. } => {
                remaining[task] = r;
                ready.insert((key(&tasks[task], r), task));
            }
            SchedEvent::Dispatched { task, .. } => {
                let best = ready.pop_first().expect("dispatch from an empty ready set");
                assert_eq!(best.1, task, "dispatched {} over {}", tasks[task].name, tasks[best.1].name);
            }
            SchedEvent::Retired { .. } | SchedEvent::Aborted { .. } => {}
        }
    }
    assert!(ready.is_empty());
}

#[test]
fn sjf_always_picks_smallest_remaining() {
    for seed in 0..4 {
        let schedule = run(random_workload(seed), Policy::Sjf, 2, 4);
        assert_fully_retired(&schedule);
        assert_dispatches_follow(&schedule, |t, remaining| (remaining, t.arrival));
    }
}

#[test]
fn priority_always_picks_most_urgent() {
    for seed in 0..4 {
        let schedule = run(random_workload(seed), Policy::Priority, 3, 4);
        assert_fully_retired(&schedule);
        assert_dispatches_follow(&schedule, |t, _| (t.priority, t.arrival));
    }
}

#[test]
fn schedules_are_reproducible() {
    for policy in [Policy::RoundRobin, Policy::Sjf, Policy::Priority] {
        let timings = |s: &Schedule| -> Vec<(Ticks, Ticks)> {
            s.tasks()
                .iter()
                .map(|t| (t.start_time.unwrap(), t.finish_time.unwrap()))
                .collect()
        };
        let baseline = timings(&run(random_workload(11), policy, 4, 3));
        for _ in 0..5 {
            assert_eq!(timings(&run(random_workload(11), policy, 4, 3)), baseline);
        }
    }
}

#[test]
fn more_cores_than_tasks_start_together() {
    let set = task_set(&[("A", 0, 3, 0), ("B", 0, 5, 0), ("C", 0, 2, 0)]);
    let schedule = run(set, Policy::RoundRobin, 8, 4);
    for task in schedule.tasks() {
        assert_eq!(task.start_time, Some(0));
    }
    assert_eq!(schedule.makespan(), 5);
}

#[test]
fn late_arrival_is_admitted_at_its_tick() {
    let set = task_set(&[("A", 0, 2, 0), ("B", 10, 1, 0)]);
    let schedule = run(set, Policy::Sjf, 1, 4);
    assert_eq!(start(&schedule, "B"), 10);
    assert_eq!(finish(&schedule, "B"), 11);
}

#[test]
fn empty_task_set_produces_empty_schedule() {
    let schedule = run(TaskSet::default(), Policy::RoundRobin, 2, 4);
    assert!(schedule.tasks().is_empty());
    assert_eq!(schedule.makespan(), 0);
}

#[derive(Debug, Default)]
struct RecordingClock {
    slices: Mutex<Vec<(TaskId, Ticks)>>,
}

impl ExecClock for RecordingClock {
    fn run(&self, task: TaskId, slice: Ticks) {
        self.slices.lock().push((task, slice));
    }
}

#[test]
fn pluggable_clock_sees_every_slice() {
    use std::sync::Arc;

    #[derive(Debug, Clone, Default)]
    struct Shared(Arc<RecordingClock>);

    impl ExecClock for Shared {
        fn run(&self, task: TaskId, slice: Ticks) {
            self.0.run(task, slice);
        }
    }

    let clock = Shared::default();
    let set = task_set(&[("P1", 0, 7, 0), ("P2", 1, 4, 0)]);
    let config = SchedConfig::builder().cores(2).quantum(3).build();
    let schedule = Sim::new(set, config).with_clock(clock.clone()).run().unwrap();

    let mut seen = clock.0.slices.lock().clone();
    seen.sort_unstable();
    let mut expected: Vec<(TaskId, Ticks)> = schedule
        .tasks()
        .iter()
        .flat_map(|t| schedule.slices_of(t.id).into_iter().map(move |(_, s)| (t.id, s)))
        .collect();
    expected.sort_unstable();
    assert_eq!(seen, expected);
}

#[test]
fn wall_clock_keeps_the_same_schedule() {
    let set = task_set(&[("P1", 0, 3, 0), ("P2", 0, 2, 0)]);
    let config = SchedConfig::builder().cores(2).build();
    let schedule = Sim::new(set, config)
        .with_clock(WallClock::new(std::time::Duration::from_millis(1)))
        .run()
        .unwrap();
    assert_eq!(finish(&schedule, "P1"), 3);
    assert_eq!(finish(&schedule, "P2"), 2);
}
