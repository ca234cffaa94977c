//! Error types for benchmark runs.

use crate::grid::GridPoint;

/// Error type for the sweep runner, result tables and sinks.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// Rejected options, raised before any unit executes.
    #[error("Invalid benchmark configuration: {0}")]
    InvalidConfig(String),

    /// A unit's callable failed under the abort policy.
    #[error("Unit {point} failed at repetition {repetition}: {source:#}")]
    UnitFailed {
        point: GridPoint,
        repetition: usize,
        #[source]
        source: anyhow::Error,
    },

    /// A unit's tag keys differ from the ones fixed by the first unit.
    #[error("Tag schema mismatch: expected [{}], found [{}]", .expected.join(", "), .found.join(", "))]
    TagSchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Two result tables cannot be concatenated.
    #[error("Result table schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;
