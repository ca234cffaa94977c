//! Sweep cases: lazy sequences of timed model fits over a parameter grid.
//!
//! Every unit fits on the first `N` rows of one shared dataset. Units hold
//! an `Arc` to it and slice views inside the timed closure, so the data is
//! never copied and no copy shows up in the measurements.

use crate::data::Classification;
use anyhow::{anyhow, ensure, Result};
use fitbench::{delayed, logspace_int, GridPoint, ParamGrid, TagValue, TimedUnit};
use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_logistic::{LogisticRegression, MultiLogisticRegression};
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::s;
use std::fmt;
use std::sync::Arc;

/// Four sample sizes from `n_samples / 1000` to `n_samples`, log-spaced.
pub fn sample_sizes(n_samples: usize) -> Vec<usize> {
    logspace_int((n_samples / 1000).max(1), n_samples, 4)
}

/// Split quality criterion of a decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SplitCriterion {
    Gini,
    Entropy,
}

impl SplitCriterion {
    pub fn name(&self) -> &'static str {
        match self {
            SplitCriterion::Gini => "gini",
            SplitCriterion::Entropy => "entropy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "gini" => Some(SplitCriterion::Gini),
            "entropy" => Some(SplitCriterion::Entropy),
            _ => None,
        }
    }

    fn quality(&self) -> SplitQuality {
        match self {
            SplitCriterion::Gini => SplitQuality::Gini,
            SplitCriterion::Entropy => SplitQuality::Entropy,
        }
    }
}

impl fmt::Display for SplitCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Logistic regression sweep settings.
#[derive(Debug, Clone)]
pub struct LogisticSweep {
    pub sizes: Vec<usize>,
    pub alphas: Vec<f64>,
    pub max_iterations: u64,
}

/// Decision tree sweep settings.
#[derive(Debug, Clone)]
pub struct TreeSweep {
    pub sizes: Vec<usize>,
    pub criteria: Vec<SplitCriterion>,
    pub max_depth: Option<usize>,
}

#[derive(Clone)]
struct Shared {
    data: Arc<Classification>,
    n_classes: usize,
}

impl Shared {
    fn new(data: Arc<Classification>) -> Self {
        let n_classes = data.y.iter().copied().max().map_or(0, |c| c + 1);
        Self { data, n_classes }
    }

    fn sample_size(&self, point: &GridPoint) -> Result<usize> {
        let n = point
            .get("N")
            .and_then(TagValue::as_i64)
            .ok_or_else(|| anyhow!("grid point {point} has no integer N"))?;
        ensure!(
            n > 0 && n as usize <= self.data.n_samples(),
            "N={n} outside 1..={}",
            self.data.n_samples()
        );
        Ok(n as usize)
    }
}

/// A unit that reports `err` when invoked, so a malformed grid point goes
/// through the failure policy like any other failure.
fn failing(point: GridPoint, err: anyhow::Error) -> TimedUnit {
    let message = format!("{err:#}");
    TimedUnit::new(point, move || Err(anyhow!("{message}")))
}

fn fit_error(e: impl fmt::Display) -> anyhow::Error {
    anyhow!("fit failed: {e}")
}

/// Units fitting logistic regression for every `N × alpha`.
///
/// Binary targets use [`LogisticRegression`], more classes use
/// [`MultiLogisticRegression`].
pub fn logistic_cases(
    data: Arc<Classification>,
    sweep: &LogisticSweep,
) -> impl Iterator<Item = TimedUnit> {
    let shared = Shared::new(data);
    let max_iterations = sweep.max_iterations;
    let grid = ParamGrid::new()
        .axis("N", sweep.sizes.iter().copied())
        .axis("alpha", sweep.alphas.iter().copied());
    let points: Vec<GridPoint> = grid.points().collect();

    points.into_iter().map(move |point| {
        let n = match shared.sample_size(&point) {
            Ok(n) => n,
            Err(e) => return failing(point, e),
        };
        let Some(alpha) = point.get("alpha").and_then(TagValue::as_f64) else {
            return failing(point, anyhow!("grid point has no alpha"));
        };
        let data = Arc::clone(&shared.data);

        if shared.n_classes == 2 {
            delayed(point, move || {
                let dataset = DatasetBase::new(data.x.slice(s![..n, ..]), data.y.slice(s![..n]));
                LogisticRegression::default()
                    .alpha(alpha)
                    .max_iterations(max_iterations)
                    .fit(&dataset)
                    .map_err(fit_error)
            })
        } else {
            delayed(point, move || {
                let dataset = DatasetBase::new(data.x.slice(s![..n, ..]), data.y.slice(s![..n]));
                MultiLogisticRegression::default()
                    .alpha(alpha)
                    .max_iterations(max_iterations)
                    .fit(&dataset)
                    .map_err(fit_error)
            })
        }
    })
}

/// Units fitting a decision tree for every `N × criterion`.
pub fn tree_cases(data: Arc<Classification>, sweep: &TreeSweep) -> impl Iterator<Item = TimedUnit> {
    let shared = Shared::new(data);
    let max_depth = sweep.max_depth;
    let grid = ParamGrid::new()
        .axis("N", sweep.sizes.iter().copied())
        .axis("criterion", sweep.criteria.iter().map(SplitCriterion::name));
    let points: Vec<GridPoint> = grid.points().collect();

    points.into_iter().map(move |point| {
        let n = match shared.sample_size(&point) {
            Ok(n) => n,
            Err(e) => return failing(point, e),
        };
        let Some(criterion) = point
            .get("criterion")
            .and_then(TagValue::as_str)
            .and_then(SplitCriterion::from_name)
        else {
            return failing(point, anyhow!("grid point has no known criterion"));
        };
        let data = Arc::clone(&shared.data);

        delayed(point, move || {
            let dataset = DatasetBase::new(data.x.slice(s![..n, ..]), data.y.slice(s![..n]));
            DecisionTree::params()
                .split_quality(criterion.quality())
                .max_depth(max_depth)
                .fit(&dataset)
                .map_err(fit_error)
        })
    })
}
