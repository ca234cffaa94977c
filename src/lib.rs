//! # fitbench
//!
//! Sweep a grid of configurations, time a model fit at every grid point, and
//! collect the results into a table.
//!
//! The crate knows nothing about models. A benchmark is a lazy sequence of
//! [`TimedUnit`]s, each a tagged closure, and the [`Benchmark`] runner times
//! them with the instruments selected in [`BenchOptions`]: wall time, CPU
//! time and peak resident memory.
//!
//! ```no_run
//! use fitbench::{Benchmark, BenchOptions, CsvSink, ParamGrid, ResultSink, TimedUnit};
//!
//! let grid = ParamGrid::new()
//!     .axis("N", fitbench::logspace_int(100, 100_000, 4))
//!     .axis("solver", ["lbfgs", "newton-cg"]);
//!
//! let units = grid.points().map(|point| {
//!     TimedUnit::new(point, || {
//!         // fit a model here
//!         Ok(())
//!     })
//! });
//!
//! let bench = Benchmark::new(BenchOptions::default().repeat(10))?;
//! let table = bench.run(units)?.with_constant("estimator", "LogisticRegression")?;
//! CsvSink::new("bench.csv").write(&table)?;
//! # Ok::<(), fitbench::BenchError>(())
//! ```
//!
//! ## Module Structure
//!
//! - `grid`: grid points, parameter grids, log-spaced sample sizes
//! - `unit`: deferred, tagged units of work
//! - `measure`: wall clock, CPU time and RSS instruments
//! - `runner`: the sequential sweep driver and failure policy
//! - `table` / `summary`: result rows and per-grid-point statistics
//! - `sink`: CSV and JSON output
//! - `env`: thread configuration recorded as run metadata
//! - `config`: benchmark options, optionally loaded from JSON

pub mod config;
pub mod env;
pub mod error;
pub mod grid;
pub mod measure;
pub mod runner;
pub mod sink;
pub mod summary;
pub mod table;
pub mod unit;

pub use config::BenchOptions;
pub use env::{ThreadEnv, ThreadSource};
pub use error::{BenchError, Result};
pub use grid::{logspace_int, GridPoint, ParamGrid, TagValue};
pub use measure::{Metric, MetricSet, Sample};
pub use runner::{Benchmark, FailurePolicy, RunState};
pub use sink::{CsvSink, JsonSink, ResultSink};
pub use summary::{Stats, Summary, SummaryRow};
pub use table::{Cell, Measurement, ResultTable};
pub use unit::{delayed, TimedUnit};
