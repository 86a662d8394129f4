use rand::prelude::*;

use super::job::{Job, TaskSet};
use crate::core::Ticks;

/// Shape of a synthetic workload: at most one arrival per tick.
#[derive(Debug, Clone, Copy)]
pub struct Bernoulli {
    pub ticks: Ticks,
    pub p_arrival: f64,
    pub p_short: f64,
    pub short_ticks: Ticks,
    pub long_ticks: Ticks,
    /// Priorities are drawn uniformly from `0..=max_priority`.
    pub max_priority: i64,
}

impl Default for Bernoulli {
    fn default() -> Self {
        Self {
            ticks: 100,
            p_arrival: 0.3,
            p_short: 0.3,
            short_ticks: 2,
            long_ticks: 6,
            max_priority: 4,
        }
    }
}

pub fn bernoulli_jobs(shape: Bernoulli, seed: u64) -> TaskSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut jobs = Vec::new();

    for t in 0..shape.ticks {
        if rng.random::<f64>() < shape.p_arrival {
            let burst = if rng.random::<f64>() < shape.p_short {
                shape.short_ticks
            } else {
                shape.long_ticks
            };
            let priority = rng.random_range(0..=shape.max_priority.max(0));

            jobs.push(Job::new(format!("J{}", jobs.len()), t, burst.max(1), priority));
        }
    }

    // Ids are generated unique and bursts positive
    TaskSet::new(jobs).unwrap_or_default()
}
