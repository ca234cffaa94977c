//! Fit time of a decision tree over sample size and split criterion, for a
//! binary and a 10-class problem.

use anyhow::{Context, Result};
use benchmarks::{
    init_logging, load_options, log_thread_env, make_classification, render_summary,
    sample_sizes, tree_cases, ClassificationConfig, SplitCriterion, TreeSweep,
};
use clap::Parser;
use fitbench::{BenchOptions, Benchmark, CsvSink, JsonSink, ResultSink, ResultTable};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(about = "Benchmark decision tree fit time")]
struct Args {
    #[arg(long, default_value_t = 100_000)]
    n_samples: usize,

    #[arg(long, default_value_t = 20)]
    n_features: usize,

    /// Repetitions per grid point, unless set by --config.
    #[arg(long, default_value_t = 20)]
    repeat: usize,

    #[arg(long, value_enum, value_delimiter = ',', default_values_t = [SplitCriterion::Gini, SplitCriterion::Entropy])]
    criterion: Vec<SplitCriterion>,

    /// Unlimited when omitted.
    #[arg(long)]
    max_depth: Option<usize>,

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

    #[arg(long, default_value = "bench_tree.csv")]
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
    let sweep = TreeSweep {
        sizes: sample_sizes(args.n_samples),
        criteria: args.criterion.clone(),
        max_depth: args.max_depth,
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

        tracing::info!(n_classes, "running decision tree sweep");
        let sweep_started = Instant::now();
        let table = bench
            .run(tree_cases(data, &sweep))
            .with_context(|| format!("decision tree sweep with {n_classes} classes failed"))?;
        tracing::info!(secs = sweep_started.elapsed().as_secs_f64(), "sweep done");

        tables.push(
            table
                .with_constant("estimator", "DecisionTree")?
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
