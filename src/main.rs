use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};

use sched_sim::{
    Policy, Report, SchedConfig, Sim, WallClock,
    sim::{Bernoulli, TaskSource, resolve_task_set},
};

#[derive(Debug, Parser)]
#[command(name = "sched-sim", about = "Simulate RR / SJF / PRIORITY scheduling over N cores")]
struct CliArgs {
    /// Scheduling policy: rr, sjf or priority
    #[arg(long, default_value = "rr")]
    policy: String,

    /// Number of simulated cores (clamped to at least 1)
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    cores: i64,

    /// Round-robin time quantum in ticks (clamped to at least 1)
    #[arg(long, default_value_t = 4, allow_negative_numbers = true)]
    quantum: i64,

    /// Task file with `id,arrival,burst,priority` records
    #[arg(long, conflicts_with = "random")]
    input: Option<PathBuf>,

    /// Generate a random workload spanning this many ticks
    #[arg(long)]
    random: Option<u64>,

    /// Seed for --random
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Abort the run if the virtual clock would pass this tick
    #[arg(long, default_value_t = sched_sim::config::DEFAULT_MAX_TICKS)]
    max_ticks: u64,

    /// Sleep this many milliseconds per executed tick
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Print every scheduling event
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let policy = args.policy.parse::<Policy>().unwrap_or_else(|reason| {
        warn!(%reason, "falling back to round-robin");
        Policy::RoundRobin
    });
    let config = SchedConfig::builder()
        .policy(policy)
        .cores(usize::try_from(args.cores).unwrap_or(0))
        .quantum(u64::try_from(args.quantum).unwrap_or(0))
        .max_ticks(args.max_ticks)
        .build();

    let source = match (&args.input, args.random) {
        (_, Some(ticks)) => TaskSource::Random {
            shape: Bernoulli {
                ticks,
                ..Bernoulli::default()
            },
            seed: args.seed,
        },
        (Some(path), None) => TaskSource::File(path.as_path()),
        (None, None) => TaskSource::Sample,
    };
    let task_set = resolve_task_set(source);

    let mut sim = Sim::new(task_set, config);
    if let Some(ms) = args.tick_ms {
        sim = sim.with_clock(WallClock::new(Duration::from_millis(ms)));
    }
    let config = sim.config();
    println!(
        "Policy: {} | Cores: {} | Quantum: {}",
        config.policy, config.cores, config.quantum
    );

    let schedule = match sim.run() {
        Ok(schedule) => schedule,
        Err(e) if e.is_convergence_failure() => {
            error!("{e}");
            return Err(e).context("scheduling aborted, no report produced");
        }
        Err(e) => return Err(e).context("scheduler failed"),
    };

    if args.trace {
        println!(
            "--- trace: {} on {} core(s), {} event(s) ---",
            schedule.policy(),
            schedule.cores(),
            schedule.events().len()
        );
        for event in schedule.events() {
            match event.task() {
                Some(task) => println!("{event} ({})", schedule.tasks()[task].name),
                None => println!("{event}"),
            }
        }
    }

    let report = Report::from_schedule(&schedule).context("failed to build report")?;
    println!("\n{report}");
    Ok(())
}
