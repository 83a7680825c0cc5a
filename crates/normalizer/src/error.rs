//! Normalization Error Types

use serde::Serialize;
use thiserror::Error;

/// Errors that abort a normalization call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    /// Row width differs from the number of feature names
    #[error("Row {row} has {actual} values, expected {expected} (one per feature name)")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Caller cancelled the batch
    #[error("Normalization cancelled after {completed_rows} rows")]
    Cancelled { completed_rows: usize },
}

/// Column whose feature name has no table entry
///
/// Non-fatal: the column is passed through unchanged and the batch continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("No quantile boundaries for column {column} ({name}), values passed through unchanged")]
pub struct UnresolvedFeature {
    /// Zero-based column index
    pub column: usize,
    /// Feature name as supplied by the caller
    pub name: String,
}
