//! Result tables.

use crate::error::{BenchError, Result};
use crate::grid::{GridPoint, TagValue};
use crate::measure::{Metric, MetricSet, Sample};
use crate::runner::FailurePolicy;
use crate::summary::Summary;
use serde::{Deserialize, Serialize};

/// One execution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub tags: GridPoint,
    pub repetition: usize,
    pub sample: Sample,
    /// Failure marker: the error message of a failed repetition.
    pub error: Option<String>,
}

impl Measurement {
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// All measurements of one benchmark run, in unit-then-repetition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    tag_keys: Vec<String>,
    metrics: MetricSet,
    omitted: Vec<Metric>,
    constants: Vec<(String, TagValue)>,
    policy: FailurePolicy,
    rows: Vec<Measurement>,
}

/// Column names every table may emit besides tags and constants.
pub const RESULT_COLUMNS: [&str; 5] = ["repetition", "wall_time", "cpu_time", "peak_memory", "error"];

/// Reject a tag or constant name that would duplicate a result column.
pub(crate) fn check_not_reserved(name: &str) -> Result<()> {
    if RESULT_COLUMNS.contains(&name) {
        return Err(BenchError::SchemaMismatch(format!(
            "{name} is a result column and cannot be used as a tag or constant"
        )));
    }
    Ok(())
}

/// A single cell when the table is laid out as columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Tag(TagValue),
    Int(u64),
    Float(f64),
    Text(String),
    Empty,
}

impl ResultTable {
    pub(crate) fn new(metrics: MetricSet, omitted: Vec<Metric>, policy: FailurePolicy) -> Self {
        Self {
            tag_keys: Vec::new(),
            metrics,
            omitted,
            constants: Vec::new(),
            policy,
            rows: Vec::new(),
        }
    }

    pub(crate) fn set_tag_keys(&mut self, keys: Vec<String>) {
        self.tag_keys = keys;
    }

    pub(crate) fn push(&mut self, row: Measurement) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Measurement] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn tag_keys(&self) -> &[String] {
        &self.tag_keys
    }

    /// Metrics that were measured in this run.
    pub fn metrics(&self) -> &MetricSet {
        &self.metrics
    }

    /// Metrics that were requested but could not be measured on this host.
    pub fn omitted(&self) -> &[Metric] {
        &self.omitted
    }

    pub fn constants(&self) -> &[(String, TagValue)] {
        &self.constants
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn failures(&self) -> impl Iterator<Item = &Measurement> {
        self.rows.iter().filter(|r| r.is_failure())
    }

    /// Add a column holding the same value on every row.
    ///
    /// Setting an existing constant again replaces its value. A name taken by
    /// a tag or a result column is rejected.
    pub fn with_constant(
        mut self,
        name: impl Into<String>,
        value: impl Into<TagValue>,
    ) -> Result<Self> {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.constants.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
            return Ok(self);
        }
        if self.tag_keys.contains(&name) {
            return Err(BenchError::SchemaMismatch(format!(
                "constant {name} clashes with a tag column"
            )));
        }
        check_not_reserved(&name)?;
        self.constants.push((name, value));
        Ok(self)
    }

    /// Append tables that share one schema.
    ///
    /// Tables without rows are skipped. Constant columns may hold different
    /// values per table, so when more than one table remains they are folded
    /// into the rows' tags.
    pub fn concat<I>(tables: I) -> Result<ResultTable>
    where
        I: IntoIterator<Item = ResultTable>,
    {
        let mut tables: Vec<ResultTable> = tables.into_iter().collect();
        if tables.is_empty() {
            return Err(BenchError::SchemaMismatch("nothing to concatenate".into()));
        }
        if tables.iter().all(ResultTable::is_empty) {
            return Ok(tables.swap_remove(0));
        }
        tables.retain(|t| !t.is_empty());

        let first = &tables[0];
        for table in &tables[1..] {
            first.check_compatible(table)?;
        }

        if tables.len() == 1 {
            return Ok(tables.remove(0));
        }

        let mut iter = tables.into_iter();
        let mut out = iter
            .next()
            .ok_or_else(|| BenchError::SchemaMismatch("nothing to concatenate".into()))?;
        out.materialize_constants();
        for mut table in iter {
            table.materialize_constants();
            out.rows.extend(table.rows);
            for m in table.omitted {
                if !out.omitted.contains(&m) {
                    out.omitted.push(m);
                }
            }
        }
        Ok(out)
    }

    fn check_compatible(&self, other: &ResultTable) -> Result<()> {
        if self.tag_keys != other.tag_keys {
            return Err(BenchError::SchemaMismatch(format!(
                "tag columns [{}] vs [{}]",
                self.tag_keys.join(", "),
                other.tag_keys.join(", ")
            )));
        }
        if self.metrics != other.metrics {
            return Err(BenchError::SchemaMismatch(
                "tables measured different metrics".into(),
            ));
        }
        if self.policy != other.policy {
            return Err(BenchError::SchemaMismatch(
                "tables were collected under different failure policies".into(),
            ));
        }
        let ours: Vec<&str> = self.constants.iter().map(|(k, _)| k.as_str()).collect();
        let theirs: Vec<&str> = other.constants.iter().map(|(k, _)| k.as_str()).collect();
        if ours != theirs {
            return Err(BenchError::SchemaMismatch(format!(
                "constant columns [{}] vs [{}]",
                ours.join(", "),
                theirs.join(", ")
            )));
        }
        Ok(())
    }

    /// Move constant columns into each row's tags.
    fn materialize_constants(&mut self) {
        if self.constants.is_empty() {
            return;
        }
        for row in &mut self.rows {
            for (k, v) in &self.constants {
                row.tags = std::mem::take(&mut row.tags).with(k.clone(), v.clone());
            }
        }
        self.tag_keys
            .extend(self.constants.iter().map(|(k, _)| k.clone()));
        self.constants.clear();
    }

    /// Column names in output order.
    pub fn columns(&self) -> Vec<String> {
        let mut cols: Vec<String> = self.tag_keys.clone();
        cols.extend(self.constants.iter().map(|(k, _)| k.clone()));
        cols.push("repetition".to_string());
        cols.extend(self.metrics.iter().map(|m| m.column().to_string()));
        if self.policy == FailurePolicy::RecordAndContinue {
            cols.push("error".to_string());
        }
        cols
    }

    /// Cells of `row`, aligned with [`columns`](Self::columns).
    pub fn cells(&self, row: &Measurement) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self
            .tag_keys
            .iter()
            .map(|k| row.tags.get(k).cloned().map_or(Cell::Empty, Cell::Tag))
            .collect();
        cells.extend(self.constants.iter().map(|(_, v)| Cell::Tag(v.clone())));
        cells.push(Cell::Int(row.repetition as u64));
        for m in self.metrics.iter() {
            let cell = match m {
                Metric::WallTime => row.sample.wall_time.map_or(Cell::Empty, Cell::Float),
                Metric::CpuTime => row.sample.cpu_time.map_or(Cell::Empty, Cell::Float),
                Metric::PeakMemory => row.sample.peak_memory.map_or(Cell::Empty, Cell::Int),
            };
            cells.push(cell);
        }
        if self.policy == FailurePolicy::RecordAndContinue {
            cells.push(row.error.clone().map_or(Cell::Empty, Cell::Text));
        }
        cells
    }

    /// Per-grid-point statistics.
    pub fn summary(&self) -> Summary {
        Summary::from_table(self)
    }
}
