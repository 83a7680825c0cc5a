//! Route Handlers

pub mod discriminate;
pub mod normalize;
pub mod schema;

use serde::Deserialize;

/// Request body shared by the normalization and discrimination endpoints
///
/// `null` cells mark missing measurements.
#[derive(Debug, Deserialize)]
pub struct SampleBatch {
    /// Feature name per column
    pub columns: Vec<String>,
    /// Sample rows, positionally aligned with `columns`
    pub rows: Vec<Vec<Option<f64>>>,
}

impl SampleBatch {
    /// Split into feature names and a raw matrix with NaN for missing cells
    pub fn into_matrix(self) -> (Vec<String>, Vec<Vec<f64>>) {
        let rows = self
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .collect();
        (self.columns, rows)
    }
}
