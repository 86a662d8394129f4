use std::fs;
use std::path::Path;

use rustc_hash::FxHashSet;
use tracing::warn;

use super::job::{Job, TaskSet};
use super::workload::{Bernoulli, bernoulli_jobs};
use crate::core::Ticks;
use crate::error::{Error, Result};

/// Parse `id,arrival,burst,priority` records.
///
/// Blank lines and `#` comments are ignored. Malformed records, and records
/// that repeat an earlier id, are skipped with a warning.
pub fn parse_task_set(text: &str) -> Result<TaskSet> {
    let mut jobs = Vec::new();
    let mut seen = FxHashSet::default();

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_record(line) {
            Ok(job) => {
                if seen.insert(job.id.clone()) {
                    jobs.push(job);
                } else {
                    warn!(line = lineno + 1, id = %job.id, "skipping duplicate task id");
                }
            }
            Err(reason) => warn!(line = lineno + 1, %reason, "skipping malformed record"),
        }
    }

    if jobs.is_empty() {
        return Err(Error::EmptyTaskSet);
    }
    TaskSet::new(jobs)
}

pub fn load_task_set(path: &Path) -> Result<TaskSet> {
    let text = fs::read_to_string(path).map_err(|source| Error::Load {
        path: path.to_path_buf(),
        source,
    })?;
    parse_task_set(&text)
}

/// Where a run's task set comes from.
#[derive(Debug, Clone, Copy)]
pub enum TaskSource<'a> {
    Sample,
    File(&'a Path),
    Random { shape: Bernoulli, seed: u64 },
}

/// Build the task set for `source`, using the sample workload whenever the
/// source yields nothing usable.
pub fn resolve_task_set(source: TaskSource<'_>) -> TaskSet {
    match source {
        TaskSource::Sample => TaskSet::sample(),
        TaskSource::File(path) => load_task_set(path).unwrap_or_else(|e| {
            warn!(error = %e, "failed to load input file, using sample workload");
            TaskSet::sample()
        }),
        TaskSource::Random { shape, seed } => {
            let set = bernoulli_jobs(shape, seed);
            if set.is_empty() {
                warn!(ticks = shape.ticks, seed, "random workload is empty, using sample workload");
                return TaskSet::sample();
            }
            set
        }
    }
}

fn parse_record(line: &str) -> std::result::Result<Job, String> {
    let mut fields = line.split(',').map(str::trim);
    let mut next = |name: &str| {
        fields
            .next()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| format!("missing {name}"))
    };

    let id = next("id")?;
    let arrival = next("arrival")?;
    let burst = next("burst")?;
    let priority = next("priority")?;

    let arrival = arrival
        .parse::<Ticks>()
        .map_err(|e| format!("bad arrival {arrival:?}: {e}"))?;
    let burst = burst
        .parse::<Ticks>()
        .map_err(|e| format!("bad burst {burst:?}: {e}"))?;
    let priority = priority
        .parse::<i64>()
        .map_err(|e| format!("bad priority {priority:?}: {e}"))?;

    if burst == 0 {
        return Err("burst must be positive".to_string());
    }
    Ok(Job::new(id, arrival, burst, priority))
}
