use tracing::warn;

use crate::core::Ticks;
use crate::scheduler::Policy;

pub const DEFAULT_CORES: usize = 2;
pub const DEFAULT_QUANTUM: Ticks = 4;
pub const DEFAULT_MAX_TICKS: Ticks = 100_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedConfig {
    pub policy: Policy,
    pub cores: usize,
    /// Round-robin time slice; ignored by the non-preemptive policies.
    pub quantum: Ticks,
    /// Latest tick the dispatcher may reach before the run is aborted.
    pub max_ticks: Ticks,
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self {
            policy: Policy::default(),
            cores: DEFAULT_CORES,
            quantum: DEFAULT_QUANTUM,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

impl SchedConfig {
    pub fn builder() -> SchedConfigBuilder {
        SchedConfigBuilder::new()
    }

    /// Slice length a core runs `remaining` ticks of work for under this config.
    pub fn slice_for(&self, remaining: Ticks) -> Ticks {
        self.policy.slice(self.quantum, remaining)
    }
}

#[derive(Debug, Default)]
pub struct SchedConfigBuilder {
    config: SchedConfig,
}

impl SchedConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SchedConfig::default(),
        }
    }

    pub fn policy(mut self, policy: Policy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn cores(mut self, n: usize) -> Self {
        self.config.cores = n;
        self
    }

    pub fn quantum(mut self, q: Ticks) -> Self {
        self.config.quantum = q;
        self
    }

    pub fn max_ticks(mut self, ticks: Ticks) -> Self {
        self.config.max_ticks = ticks;
        self
    }

    /// Out-of-range values are clamped rather than rejected.
    pub fn build(mut self) -> SchedConfig {
        if self.config.cores == 0 {
            warn!("cores must be at least 1, clamping");
            self.config.cores = 1;
        }
        if self.config.quantum == 0 {
            warn!("quantum must be at least 1, clamping");
            self.config.quantum = 1;
        }
        self.config
    }
}
