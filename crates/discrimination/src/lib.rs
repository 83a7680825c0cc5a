//! Tectonic Setting Discrimination
//!
//! Wires the quantile normalizer to a pretrained classifier and decodes its
//! output into tectonic settings. Model execution itself sits behind the
//! [`Classifier`] trait.

mod distribution;
mod engine;
mod schema;

pub use distribution::{Distribution, SettingCount};
pub use engine::{
    Classifier, DiscriminationReport, Discriminator, MockClassifier, Prediction,
};
pub use schema::{feature_index, TectonicSetting, FEATURE_COLUMNS, SETTING_COUNT};

use normalizer::NormalizeError;
use thiserror::Error;

/// Errors during discrimination
#[derive(Debug, Error)]
pub enum DiscriminationError {
    #[error("Normalization failed: {0}")]
    Normalize(#[from] NormalizeError),
    #[error("Feature column {index} is {actual:?}, model expects {expected:?}")]
    SchemaMismatch {
        index: usize,
        expected: &'static str,
        actual: String,
    },
    #[error("Expected {expected} feature columns, got {actual}")]
    ColumnCount { expected: usize, actual: usize },
    #[error("Classifier failed: {0}")]
    Classifier(String),
    #[error("Invalid classifier output: expected {expected}, got {actual}")]
    OutputShape { expected: String, actual: String },
}
