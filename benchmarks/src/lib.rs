//! Benchmark programs for the fitbench sweep runner.
//!
//! This crate wires the runner to its collaborators:
//!
//! - Synthetic classification data (`data`)
//! - linfa estimators wrapped as timed units (`cases`)
//! - Regression statistics for the R² demo (`metrics`)
//! - Logging, option loading and summary printing (`utils`)

pub mod cases;
pub mod data;
pub mod metrics;
pub mod utils;

pub use cases::{logistic_cases, sample_sizes, tree_cases, LogisticSweep, SplitCriterion, TreeSweep};
pub use data::{make_classification, Classification, ClassificationConfig};
pub use metrics::Metrics;
pub use utils::{init_logging, load_options, log_thread_env, render_summary};
