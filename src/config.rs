//! Benchmark options.
//!
//! Options can be built in code or read from a JSON file:
//!
//! ```json
//! { "wall_time": true, "cpu_time": true, "peak_memory": false,
//!   "repeat": 10, "failure_policy": "record_and_continue" }
//! ```
//!
//! Missing fields take their defaults.

use crate::error::{BenchError, Result};
use crate::measure::MetricSet;
use crate::runner::FailurePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// What to measure and how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchOptions {
    pub wall_time: bool,
    pub cpu_time: bool,
    pub peak_memory: bool,
    /// Repetitions per unit, at least 1.
    pub repeat: usize,
    pub failure_policy: FailurePolicy,
    /// RSS polling interval of the peak memory sampler.
    pub memory_interval_ms: u64,
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            wall_time: true,
            cpu_time: true,
            peak_memory: true,
            repeat: 1,
            failure_policy: FailurePolicy::Abort,
            memory_interval_ms: 1,
        }
    }
}

impl BenchOptions {
    pub fn repeat(mut self, repeat: usize) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn metrics(mut self, wall_time: bool, cpu_time: bool, peak_memory: bool) -> Self {
        self.wall_time = wall_time;
        self.cpu_time = cpu_time;
        self.peak_memory = peak_memory;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn memory_interval(mut self, interval: Duration) -> Self {
        self.memory_interval_ms = interval.as_millis() as u64;
        self
    }

    /// The requested metric set.
    pub fn requested(&self) -> MetricSet {
        MetricSet::from_flags(self.wall_time, self.cpu_time, self.peak_memory)
    }

    pub fn memory_interval_duration(&self) -> Duration {
        Duration::from_millis(self.memory_interval_ms)
    }

    /// Reject options no run could honor.
    pub fn validate(&self) -> Result<()> {
        if self.repeat < 1 {
            return Err(BenchError::InvalidConfig(
                "repeat must be at least 1".into(),
            ));
        }
        if self.requested().is_empty() {
            return Err(BenchError::InvalidConfig(
                "at least one of wall_time, cpu_time, peak_memory must be enabled".into(),
            ));
        }
        if self.peak_memory && self.memory_interval_ms == 0 {
            return Err(BenchError::InvalidConfig(
                "memory_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Read options from a JSON file and validate them.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let options: BenchOptions = serde_json::from_str(&text)?;
        options.validate()?;
        Ok(options)
    }
}
