//! Peak resident memory sampling.
//!
//! The process high-water mark (`ru_maxrss`) cannot be reset between
//! repetitions, so the peak of one repetition is taken by polling the current
//! resident set size from a background thread while the unit runs.

use super::clock::thread_cpu_time;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Current resident set size of this process in bytes.
///
/// On Linux this reads `VmRSS` from `/proc/self/status`. Other platforms
/// return `None`.
#[cfg(target_os = "linux")]
pub fn current_rss() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_vm_rss(&status)
}

#[cfg(not(target_os = "linux"))]
pub fn current_rss() -> Option<u64> {
    None
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_vm_rss(status: &str) -> Option<u64> {
    status.lines().find_map(|line| {
        let rest = line.strip_prefix("VmRSS:")?;
        let kb: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
        Some(kb * 1024)
    })
}

/// What a [`MemorySampler`] saw between start and stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryReading {
    /// Peak RSS in bytes.
    pub peak: u64,
    /// CPU time burnt by the polling thread itself. Process-wide CPU
    /// clocks count it, so it is deducted from the repetition's CPU time.
    pub sampler_cpu: Duration,
}

/// Polls RSS on a background thread and keeps the maximum.
pub struct MemorySampler {
    peak: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<Option<Duration>>>,
}

impl MemorySampler {
    /// Take a baseline reading and start polling every `interval`.
    ///
    /// If the sampling thread cannot be spawned the sampler still reports
    /// the maximum of the start and stop readings.
    pub fn start(interval: Duration) -> Self {
        let peak = Arc::new(AtomicU64::new(current_rss().unwrap_or(0)));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let peak = Arc::clone(&peak);
            let stop = Arc::clone(&stop);
            std::thread::Builder::new()
                .name("fitbench-rss".into())
                .spawn(move || {
                    while !stop.load(Ordering::Acquire) {
                        if let Some(rss) = current_rss() {
                            peak.fetch_max(rss, Ordering::Relaxed);
                        }
                        std::thread::park_timeout(interval);
                    }
                    thread_cpu_time()
                })
        };

        let handle = match handle {
            Ok(h) => Some(h),
            Err(err) => {
                tracing::warn!(error = %err, "could not spawn RSS sampler, using boundary readings only");
                None
            }
        };

        Self { peak, stop, handle }
    }

    /// Stop polling and return the peak RSS and the sampler's own CPU time.
    pub fn stop(mut self) -> MemoryReading {
        let sampler_cpu = self.shutdown().unwrap_or_default();
        if let Some(rss) = current_rss() {
            self.peak.fetch_max(rss, Ordering::Relaxed);
        }
        MemoryReading {
            peak: self.peak.load(Ordering::Relaxed),
            sampler_cpu,
        }
    }

    fn shutdown(&mut self) -> Option<Duration> {
        self.stop.store(true, Ordering::Release);
        let handle = self.handle.take()?;
        handle.thread().unpark();
        match handle.join() {
            Ok(cpu) => cpu,
            Err(_) => {
                tracing::warn!("RSS sampler thread panicked");
                None
            }
        }
    }
}

impl Drop for MemorySampler {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
