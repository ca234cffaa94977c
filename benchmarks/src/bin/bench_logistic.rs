//! Fit time of logistic regression over sample size and L2 penalty, for a
//! binary and a 10-class problem.

use anyhow::{Context, Result};
use benchmarks::{
    init_logging, load_options, log_thread_env, logistic_cases, make_classification,
    render_summary, sample_sizes, ClassificationConfig, LogisticSweep,
};
use clap::Parser;
use fitbench::{BenchOptions, Benchmark, CsvSink, JsonSink, ResultSink, ResultTable};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(about = "Benchmark logistic regression fit time")]
struct Args {
    #[arg(long, default_value_t = 100_000)]
    n_samples: usize,

    #[arg(long, default_value_t = 50)]
    n_features: usize,

    /// Repetitions per grid point, unless set by --config.
    #[arg(long, default_value_t = 10)]
    repeat: usize,

    #[arg(long, default_value_t = 1000)]
    max_iter: u64,

    /// L2 penalties to sweep.
    #[arg(long, value_delimiter = ',', default_values_t = [1.0, 0.01])]
    alpha: Vec<f64>,

    #[arg(long, value_delimiter = ',', default_values_t = [2, 10])]
    n_classes: Vec<usize>,

    /// Informative features; 90% of --n-features when omitted.
    #[arg(long)]
    n_informative: Option<usize>,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Benchmark options as JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "bench_logistic.csv")]
    output: PathBuf,

    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let started = Instant::now();

    let env = log_thread_env();
    let options = load_options(
        args.config.as_deref(),
        BenchOptions::default().repeat(args.repeat),
    )?;
    let bench = Benchmark::new(options)?;
    let sweep = LogisticSweep {
        sizes: sample_sizes(args.n_samples),
        alphas: args.alpha.clone(),
        max_iterations: args.max_iter,
    };

    let mut tables = Vec::with_capacity(args.n_classes.len());
    for &n_classes in &args.n_classes {
        let mut config =
            ClassificationConfig::new(args.n_samples, args.n_features, n_classes).seed(args.seed);
        if let Some(n_informative) = args.n_informative {
            config = config.n_informative(n_informative);
        }
        let data = make_classification(config)
            .map(Arc::new)
            .with_context(|| format!("failed to generate {n_classes}-class data"))?;

        let estimator = if n_classes == 2 {
            "LogisticRegression"
        } else {
            "MultiLogisticRegression"
        };
        tracing::info!(estimator, n_classes, "running sweep");
        let sweep_started = Instant::now();
        let table = bench
            .run(logistic_cases(data, &sweep))
            .with_context(|| format!("{estimator} sweep with {n_classes} classes failed"))?;
        tracing::info!(secs = sweep_started.elapsed().as_secs_f64(), "sweep done");

        tables.push(
            table
                .with_constant("estimator", estimator)?
                .with_constant("n_classes", n_classes)?,
        );
    }

    let table = ResultTable::concat(tables)?.with_constant("n_threads", env.n_threads)?;
    println!("{}", render_summary(&table));

    CsvSink::new(&args.output)
        .write(&table)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    if let Some(path) = &args.json {
        JsonSink::new(path)
            .write(&table)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    tracing::info!(secs = started.elapsed().as_secs_f64(), "done");
    Ok(())
}
