//! Output sinks for result tables.
//!
//! A sink is consumed by [`ResultSink::write`], so every sink writes its
//! table exactly once.

use crate::error::Result;
use crate::grid::TagValue;
use crate::measure::Metric;
use crate::table::{Cell, ResultTable};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub trait ResultSink {
    fn write(self, table: &ResultTable) -> Result<()>;
}

fn create_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

fn cell_to_string(cell: Cell) -> String {
    match cell {
        Cell::Tag(v) => v.to_string(),
        Cell::Int(i) => i.to_string(),
        Cell::Float(x) => x.to_string(),
        Cell::Text(s) => s,
        Cell::Empty => String::new(),
    }
}

fn cell_to_json(cell: Cell) -> Value {
    match cell {
        Cell::Tag(TagValue::Bool(b)) => Value::from(b),
        Cell::Tag(TagValue::Int(i)) => Value::from(i),
        Cell::Tag(TagValue::Float(x)) => Value::from(x),
        Cell::Tag(TagValue::Str(s)) => Value::from(s),
        Cell::Int(i) => Value::from(i),
        Cell::Float(x) => Value::from(x),
        Cell::Text(s) => Value::from(s),
        Cell::Empty => Value::Null,
    }
}

/// Comma-separated values: one header row, one row per measurement, empty
/// cells for absent values.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to any writer instead of a file.
    pub fn write_to<W: Write>(writer: W, table: &ResultTable) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(table.columns())?;
        for row in table.rows() {
            wtr.write_record(table.cells(row).into_iter().map(cell_to_string))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ResultSink for CsvSink {
    fn write(self, table: &ResultTable) -> Result<()> {
        let file = create_file(&self.path)?;
        Self::write_to(BufWriter::new(file), table)?;
        tracing::info!(path = %self.path.display(), rows = table.len(), "wrote CSV results");
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    columns: Vec<String>,
    omitted: &'a [Metric],
    rows: Vec<Map<String, Value>>,
}

/// A JSON document `{ "columns": [...], "omitted": [...], "rows": [...] }`
/// with one object per measurement keyed by column name.
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build the JSON value for `table`.
    pub fn to_value(table: &ResultTable) -> Result<Value> {
        let columns = table.columns();
        let rows: Vec<Map<String, Value>> = table
            .rows()
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .cloned()
                    .zip(table.cells(row).into_iter().map(cell_to_json))
                    .collect::<Map<String, Value>>()
            })
            .collect();
        let doc = JsonDocument {
            columns,
            omitted: table.omitted(),
            rows,
        };
        Ok(serde_json::to_value(doc)?)
    }
}

impl ResultSink for JsonSink {
    fn write(self, table: &ResultTable) -> Result<()> {
        let file = create_file(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &Self::to_value(table)?)?;
        writer.flush()?;
        tracing::info!(path = %self.path.display(), rows = table.len(), "wrote JSON results");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::FailurePolicy;
    use crate::table::tests::table_with;

    #[test]
    fn test_csv_header_and_rows() {
        let table = table_with(&[("N", 100)], 2, FailurePolicy::Abort)
            .with_constant("estimator", "LogisticRegression")
            .unwrap();
        let mut buf = Vec::new();
        CsvSink::write_to(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "N,estimator,repetition,wall_time,peak_memory");
        assert_eq!(lines[1], "100,LogisticRegression,0,0.5,1024");
        assert_eq!(lines[2], "100,LogisticRegression,1,1.5,1024");
    }

    #[test]
    fn test_csv_file_in_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("bench.csv");
        let table = table_with(&[("N", 10)], 1, FailurePolicy::RecordAndContinue);
        CsvSink::new(&path).write(&table).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "N,repetition,wall_time,peak_memory,error");
        // Absent error becomes an empty trailing cell.
        assert_eq!(lines[1], "10,0,0.5,1024,");
    }

    #[test]
    fn test_json_rows_keyed_by_column() {
        let table = table_with(&[("N", 100)], 1, FailurePolicy::Abort)
            .with_constant("n_classes", 2i64)
            .unwrap();
        let value = JsonSink::to_value(&table).unwrap();

        assert_eq!(value["columns"][0], "N");
        assert_eq!(value["rows"][0]["N"], 100);
        assert_eq!(value["rows"][0]["n_classes"], 2);
        assert_eq!(value["rows"][0]["wall_time"], 0.5);
        assert_eq!(value["rows"][0]["peak_memory"], 1024);
        assert!(value["rows"][0].get("cpu_time").is_none());
        assert_eq!(value["omitted"], serde_json::json!([]));
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.json");
        let table = table_with(&[("N", 100)], 3, FailurePolicy::Abort);
        JsonSink::new(&path).write(&table).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["rows"].as_array().unwrap().len(), 3);
    }
}
