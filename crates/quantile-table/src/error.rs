//! Table Load Error Types

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading or accessing a quantile table
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reference artifact could not be read
    #[error("Failed to read quantile artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reference artifact is not a name -> boundary array mapping
    #[error("Malformed quantile artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// Artifact parsed but holds no features
    #[error("Quantile artifact contains no features")]
    Empty,

    /// Boundary sequence length outside [min, max]
    #[error("Feature {feature} has {count} boundaries, expected between {min} and {max}")]
    BoundaryCount {
        feature: String,
        count: usize,
        min: usize,
        max: usize,
    },

    /// Boundary is NaN or infinite
    #[error("Feature {feature} has a non-finite boundary at index {index}")]
    NonFinite { feature: String, index: usize },

    /// Boundary sequence descends
    #[error("Feature {feature} boundaries descend at index {index}: {previous} > {current}")]
    NotMonotonic {
        feature: String,
        index: usize,
        previous: f64,
        current: f64,
    },

    /// Process-wide table requested before initialization
    #[error("Quantile table has not been initialized")]
    NotInitialized,
}
