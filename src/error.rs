//! Error types for workload analysis.
//!
//! Only structural problems end a run: a table without the columns the
//! pipeline needs, a file format we cannot read, or thresholds that make
//! classification meaningless. Dirty cells inside a valid table are
//! recovered where they are read and never show up here.

use std::path::PathBuf;

/// Main error type for loading and analysing a task table.
#[derive(Debug, thiserror::Error)]
pub enum WorkloadError {
    /// The input table lacks a column the pipeline depends on.
    #[error("missing required field: column '{column}' not found in input")]
    MissingColumn { column: String },

    /// The input file extension is neither `.csv` nor `.json`.
    #[error("unsupported input format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// An hour limit is zero, negative or not a number.
    #[error("invalid threshold: {name} must be a positive number of hours (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },

    /// The idleness fraction lies outside (0, 1].
    #[error("invalid idle fraction: {0} (expected a value in (0, 1])")]
    InvalidIdleFraction(f64),

    /// The input has a header but no rows at all.
    #[error("input table contains no task rows")]
    EmptyInput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used by the ingestion and analysis layers.
pub type Result<T> = std::result::Result<T, WorkloadError>;
