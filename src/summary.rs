//! Per-grid-point statistics over repetitions.

use crate::grid::GridPoint;
use crate::measure::Metric;
use crate::table::ResultTable;
use serde::{Deserialize, Serialize};

/// Descriptive statistics over one metric's repetitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    /// Returns `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            mean,
            std: variance.sqrt(),
            min,
            max,
            n,
        })
    }
}

/// Aggregated row for one grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub tags: GridPoint,
    pub repetitions: usize,
    pub failures: usize,
    /// One entry per measured metric, in column order. `None` when every
    /// repetition failed.
    pub stats: Vec<(Metric, Option<Stats>)>,
}

impl SummaryRow {
    pub fn get(&self, metric: Metric) -> Option<&Stats> {
        self.stats
            .iter()
            .find(|(m, _)| *m == metric)
            .and_then(|(_, s)| s.as_ref())
    }
}

/// Statistics for every grid point of a table, in table order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    /// Group consecutive rows of the same unit.
    pub fn from_table(table: &ResultTable) -> Self {
        let mut rows = Vec::new();
        let measurements = table.rows();
        let mut start = 0;

        while start < measurements.len() {
            let tags = &measurements[start].tags;
            // A group ends when the tags change or the repetition index restarts.
            let mut end = start + 1;
            while end < measurements.len()
                && measurements[end].tags == *tags
                && measurements[end].repetition > measurements[end - 1].repetition
            {
                end += 1;
            }
            let group = &measurements[start..end];
            let ok: Vec<_> = group.iter().filter(|m| !m.is_failure()).collect();

            let stats = table
                .metrics()
                .iter()
                .map(|metric| {
                    let values: Vec<f64> = ok.iter().filter_map(|m| m.sample.get(metric)).collect();
                    (metric, Stats::from_values(&values))
                })
                .collect();

            rows.push(SummaryRow {
                tags: tags.clone(),
                repetitions: group.len(),
                failures: group.len() - ok.len(),
                stats,
            });
            start = end;
        }

        Self { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::FailurePolicy;
    use crate::table::tests::table_with;

    #[test]
    fn test_stats_from_values() {
        let s = Stats::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((s.mean - 3.0).abs() < 1e-12);
        assert!((s.std - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 5.0);
        assert_eq!(s.n, 5);
        assert!(Stats::from_values(&[]).is_none());
    }

    #[test]
    fn test_summary_groups_by_grid_point() {
        let a = table_with(&[("N", 10)], 3, FailurePolicy::Abort);
        let b = table_with(&[("N", 20)], 3, FailurePolicy::Abort);
        let table = ResultTable::concat([a, b]).unwrap();

        let summary = table.summary();
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.rows[0].repetitions, 3);
        assert_eq!(summary.rows[1].tags.to_string(), "{N=20}");

        // wall times are 0.5, 1.5, 2.5
        let wall = summary.rows[0].get(Metric::WallTime).unwrap();
        assert!((wall.mean - 1.5).abs() < 1e-12);
        assert_eq!(wall.n, 3);
        assert!(summary.rows[0].get(Metric::CpuTime).is_none());
    }

    #[test]
    fn test_summary_splits_repeated_identical_points() {
        let a = table_with(&[("N", 10)], 2, FailurePolicy::Abort);
        let b = table_with(&[("N", 10)], 2, FailurePolicy::Abort);
        let table = ResultTable::concat([a, b]).unwrap();
        assert_eq!(table.summary().rows.len(), 2);
    }
}
