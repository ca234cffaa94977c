use anyhow::{Context, Result};
use fitbench::{BenchOptions, Metric, ResultTable, Summary, ThreadEnv};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, `info` by default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second call (tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Benchmark options from `path` if given, `defaults` otherwise.
pub fn load_options(path: Option<&Path>, defaults: BenchOptions) -> Result<BenchOptions> {
    match path {
        Some(path) => BenchOptions::from_json_file(path)
            .with_context(|| format!("failed to load options from {}", path.display())),
        None => Ok(defaults),
    }
}

/// Log the thread configuration and return it.
pub fn log_thread_env() -> ThreadEnv {
    let env = ThreadEnv::detect();
    tracing::info!(
        n_threads = env.n_threads,
        source = %env.source,
        parallel = env.parallelism_enabled(),
        "thread configuration"
    );
    env
}

fn format_metric(metric: Metric, value: f64) -> String {
    match metric {
        Metric::WallTime | Metric::CpuTime => format!("{:.4}s", value),
        Metric::PeakMemory => format!("{:.1}MiB", value / (1024.0 * 1024.0)),
    }
}

/// Render the per-grid-point summary as a text table.
pub fn render_summary(table: &ResultTable) -> String {
    let summary = Summary::from_table(table);
    let metrics: Vec<Metric> = table.metrics().iter().collect();

    let mut header = format!("{:<40} {:>5} {:>5}", "grid point", "reps", "fail");
    for metric in &metrics {
        header.push_str(&format!(" {:>24}", format!("{} mean±std", metric.column())));
    }

    let mut out = String::new();
    out.push_str(&header);
    out.push('\n');
    out.push_str(&"-".repeat(header.len()));
    out.push('\n');

    for row in &summary.rows {
        out.push_str(&format!(
            "{:<40} {:>5} {:>5}",
            row.tags.to_string(),
            row.repetitions,
            row.failures
        ));
        for &metric in &metrics {
            let cell = match row.get(metric) {
                Some(stats) => format!(
                    "{}±{}",
                    format_metric(metric, stats.mean),
                    format_metric(metric, stats.std)
                ),
                None => "-".to_string(),
            };
            out.push_str(&format!(" {:>24}", cell));
        }
        out.push('\n');
    }
    out
}
