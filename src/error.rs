//! Error types for the reconciliation engine.

use crate::record::Source;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Errors that abort a reconciliation run.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Failed to open or read an input file
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the report
    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),

    /// CSV decoding or encoding error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row
    #[error("{side} file is missing required column '{column}' (found: {})", .present.join(", "))]
    Schema {
        side: Source,
        column: &'static str,
        present: Vec<String>,
    },

    /// A currency cell could not be parsed and the run rejects malformed values
    #[error("{side} file row {row}: malformed {column} value {value:?}")]
    MalformedValue {
        side: Source,
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// A currency cell whose text is not a decimal number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid currency value: {0:?}")]
pub struct MalformedValue(pub String);
