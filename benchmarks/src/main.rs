// Usage printer for the benchmark programs.

fn main() {
    println!("fitbench benchmark programs");
    println!();
    println!("Usage:");
    println!("  cargo run --release -p benchmarks --bin <program> -- [OPTIONS]");
    println!("  cargo bench -p benchmarks --bench runner_overhead");
    println!();
    println!("Available programs:");
    println!("  - bench_logistic: logistic regression fit time, N x alpha, 2 and 10 classes");
    println!("  - bench_tree: decision tree fit time, N x split criterion, 2 and 10 classes");
    println!("  - rsquared_decomposition: R² as the sum of coefficient x correlation on iris");
    println!();
    println!("Common options:");
    println!("  --config <file.json>  benchmark options (metrics, repeat, failure_policy)");
    println!("  --output <file.csv>   CSV results, --json <file.json> for JSON");
    println!();
    println!("Set RUST_LOG=debug to log every unit.");
}
