//! Read-only view of the host's thread configuration, recorded as run
//! metadata. Nothing here changes thread pools.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the effective thread count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadSource {
    OmpNumThreads,
    RayonNumThreads,
    AvailableParallelism,
    Unknown,
}

impl fmt::Display for ThreadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ThreadSource::OmpNumThreads => "OMP_NUM_THREADS",
            ThreadSource::RayonNumThreads => "RAYON_NUM_THREADS",
            ThreadSource::AvailableParallelism => "available_parallelism",
            ThreadSource::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Effective worker thread count of numerical libraries in this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadEnv {
    pub n_threads: usize,
    pub source: ThreadSource,
}

impl ThreadEnv {
    pub fn detect() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve using `lookup` for environment variables.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n > 0)
        };

        if let Some(n) = parse("OMP_NUM_THREADS") {
            return Self {
                n_threads: n,
                source: ThreadSource::OmpNumThreads,
            };
        }
        if let Some(n) = parse("RAYON_NUM_THREADS") {
            return Self {
                n_threads: n,
                source: ThreadSource::RayonNumThreads,
            };
        }
        match std::thread::available_parallelism() {
            Ok(n) => Self {
                n_threads: n.get(),
                source: ThreadSource::AvailableParallelism,
            },
            Err(_) => Self {
                n_threads: 1,
                source: ThreadSource::Unknown,
            },
        }
    }

    /// Whether more than one worker thread is available.
    pub fn parallelism_enabled(&self) -> bool {
        self.n_threads > 1
    }
}
