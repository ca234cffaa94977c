//! Instruments for wall time, CPU time and peak memory.
//!
//! [`Instruments::probe`] checks once per run which of the requested metrics
//! the host can actually measure. Unavailable metrics are dropped from the
//! run instead of being filled with made-up values.

pub mod clock;
pub mod memory;

pub use clock::{process_cpu_time, thread_cpu_time};
pub use memory::{current_rss, MemoryReading, MemorySampler};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// A measurable quantity of one repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    WallTime,
    CpuTime,
    PeakMemory,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::WallTime, Metric::CpuTime, Metric::PeakMemory];

    /// Column name in result tables.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::WallTime => "wall_time",
            Metric::CpuTime => "cpu_time",
            Metric::PeakMemory => "peak_memory",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A set of metrics, always kept in canonical column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSet(Vec<Metric>);

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self(Metric::ALL.to_vec())
    }

    pub fn from_flags(wall_time: bool, cpu_time: bool, peak_memory: bool) -> Self {
        Metric::ALL
            .into_iter()
            .zip([wall_time, cpu_time, peak_memory])
            .filter_map(|(m, on)| on.then_some(m))
            .collect()
    }

    pub fn insert(&mut self, metric: Metric) {
        if let Err(pos) = self.0.binary_search(&metric) {
            self.0.insert(pos, metric);
        }
    }

    pub fn remove(&mut self, metric: Metric) {
        self.0.retain(|m| *m != metric);
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.0.contains(&metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = Metric> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Metric> for MetricSet {
    fn from_iter<I: IntoIterator<Item = Metric>>(iter: I) -> Self {
        let mut set = MetricSet::new();
        for m in iter {
            set.insert(m);
        }
        set
    }
}

/// Values captured for one repetition. Unmeasured metrics stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds.
    pub wall_time: Option<f64>,
    /// Seconds.
    pub cpu_time: Option<f64>,
    /// Bytes.
    pub peak_memory: Option<u64>,
}

impl Sample {
    /// Numeric value of `metric`, if captured.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::WallTime => self.wall_time,
            Metric::CpuTime => self.cpu_time,
            Metric::PeakMemory => self.peak_memory.map(|b| b as f64),
        }
    }
}

/// Which metrics the host can measure. Wall time is always available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub cpu_time: bool,
    pub peak_memory: bool,
}

impl Availability {
    pub fn detect() -> Self {
        Self {
            cpu_time: process_cpu_time().is_some(),
            peak_memory: current_rss().is_some(),
        }
    }
}

/// The instruments enabled for a run.
#[derive(Debug, Clone)]
pub struct Instruments {
    active: MetricSet,
    memory_interval: Duration,
}

impl Instruments {
    /// Enable every requested metric the host supports.
    ///
    /// Returns the instruments and the metrics that had to be omitted.
    pub fn probe(requested: &MetricSet, memory_interval: Duration) -> (Self, Vec<Metric>) {
        Self::probe_with(requested, memory_interval, Availability::detect())
    }

    /// Like [`probe`](Self::probe), with host support given by `available`.
    pub fn probe_with(
        requested: &MetricSet,
        memory_interval: Duration,
        available: Availability,
    ) -> (Self, Vec<Metric>) {
        let mut active = requested.clone();
        let mut omitted = Vec::new();

        if requested.contains(Metric::CpuTime) && !available.cpu_time {
            active.remove(Metric::CpuTime);
            omitted.push(Metric::CpuTime);
        }
        if requested.contains(Metric::PeakMemory) && !available.peak_memory {
            active.remove(Metric::PeakMemory);
            omitted.push(Metric::PeakMemory);
        }

        (
            Self {
                active,
                memory_interval,
            },
            omitted,
        )
    }

    pub fn active(&self) -> &MetricSet {
        &self.active
    }

    /// Start all active instruments.
    ///
    /// The memory sampler starts first and stops last so thread start-up
    /// does not land inside the timed window.
    pub fn start(&self) -> Session {
        let memory = self
            .active
            .contains(Metric::PeakMemory)
            .then(|| MemorySampler::start(self.memory_interval));
        let cpu = if self.active.contains(Metric::CpuTime) {
            process_cpu_time()
        } else {
            None
        };
        let wall = self.active.contains(Metric::WallTime).then(Instant::now);
        Session { wall, cpu, memory }
    }
}

/// Instruments running around one repetition.
pub struct Session {
    wall: Option<Instant>,
    cpu: Option<Duration>,
    memory: Option<MemorySampler>,
}

impl Session {
    /// Stop all instruments, in reverse start order.
    ///
    /// The memory sampler's own CPU time is deducted from the process CPU
    /// delta.
    pub fn stop(self) -> Sample {
        let wall_time = self.wall.map(|t| t.elapsed().as_secs_f64());
        let cpu_delta = self.cpu.and_then(|before| {
            process_cpu_time().map(|after| after.saturating_sub(before))
        });
        let memory = self.memory.map(MemorySampler::stop);
        let sampler_cpu = memory.map_or(Duration::ZERO, |m| m.sampler_cpu);
        Sample {
            wall_time,
            cpu_time: cpu_delta.map(|d| d.saturating_sub(sampler_cpu).as_secs_f64()),
            peak_memory: memory.map(|m| m.peak),
        }
    }
}
