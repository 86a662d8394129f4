use std::fmt;

use average::{Estimate, Mean};

use crate::core::{Task, Ticks};
use crate::error::{Error, Result};
use crate::sim::Schedule;

/// Per-task timings derived from a finished task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub turnaround: Ticks,
    pub waiting: Ticks,
    /// Ticks from arrival to first dispatch.
    pub response: Ticks,
}

impl Metrics {
    pub fn of(task: &Task) -> Result<Self> {
        let unfinished = || Error::Unfinished {
            task: task.name.clone(),
        };
        let finish = task.finish_time.ok_or_else(unfinished)?;
        let start = task.start_time.ok_or_else(unfinished)?;

        debug_assert!(finish >= task.arrival.saturating_add(task.burst));
        let turnaround = finish - task.arrival;
        Ok(Self {
            turnaround,
            waiting: turnaround.saturating_sub(task.burst),
            response: start - task.arrival,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub name: String,
    pub arrival: Ticks,
    pub burst: Ticks,
    pub priority: i64,
    pub start: Ticks,
    pub finish: Ticks,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rows: Vec<TaskRow>,
    pub avg_turnaround: f64,
    pub avg_waiting: f64,
    pub avg_response: f64,
    /// Tasks per tick: count / (latest finish + 1).
    pub throughput: f64,
    pub makespan: Ticks,
}

impl Report {
    pub fn new(tasks: &[Task]) -> Result<Self> {
        let rows = tasks
            .iter()
            .map(|task| {
                let metrics = Metrics::of(task)?;
                Ok(TaskRow {
                    name: task.name.clone(),
                    arrival: task.arrival,
                    burst: task.burst,
                    priority: task.priority,
                    start: task.start_time.unwrap_or_default(),
                    finish: task.finish_time.unwrap_or_default(),
                    metrics,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let makespan = rows.iter().map(|r| r.finish).max().unwrap_or(0);
        let throughput = if rows.is_empty() {
            0.0
        } else {
            rows.len() as f64 / (makespan + 1) as f64
        };

        Ok(Self {
            avg_turnaround: avg(rows.iter().map(|r| r.metrics.turnaround)),
            avg_waiting: avg(rows.iter().map(|r| r.metrics.waiting)),
            avg_response: avg(rows.iter().map(|r| r.metrics.response)),
            throughput,
            makespan,
            rows,
        })
    }

    pub fn from_schedule(schedule: &Schedule) -> Result<Self> {
        Self::new(schedule.tasks())
    }
}

fn avg(iter: impl Iterator<Item = Ticks>) -> f64 {
    let mean: Mean = iter.map(|v| v as f64).collect();
    if mean.is_empty() { 0.0 } else { mean.estimate() }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Report ===")?;
        writeln!(
            f,
            "{:<6}{:<10}{:<8}{:<10}{:<8}{:<9}{:<11}{:<9}{:<9}",
            "PID", "Arrival", "Burst", "Priority", "Start", "Finish", "Turnaround", "Waiting",
            "Response"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<6}{:<10}{:<8}{:<10}{:<8}{:<9}{:<11}{:<9}{:<9}",
                row.name,
                row.arrival,
                row.burst,
                row.priority,
                row.start,
                row.finish,
                row.metrics.turnaround,
                row.metrics.waiting,
                row.metrics.response
            )?;
        }
        write!(
            f,
            "Avg Turnaround: {:.2} | Avg Waiting: {:.2} | Avg Response: {:.2} | Throughput: {:.2} proc/tick",
            self.avg_turnaround, self.avg_waiting, self.avg_response, self.throughput
        )
    }
}
