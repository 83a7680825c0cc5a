//! Batch Normalization over a Sample Matrix

use crate::error::{NormalizeError, UnresolvedFeature};
use crate::mapping::map_value;
use quantile_table::QuantileTable;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// One normalized cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedValue {
    /// Bucket code in {0} and [1, 255]
    Code(u8),
    /// Raw value of a column without table entry
    PassThrough(f64),
}

impl NormalizedValue {
    /// Bucket code, if this cell was transformed
    pub fn code(&self) -> Option<u8> {
        match self {
            NormalizedValue::Code(code) => Some(*code),
            NormalizedValue::PassThrough(_) => None,
        }
    }

    /// Whether this cell kept its raw value
    pub fn is_pass_through(&self) -> bool {
        matches!(self, NormalizedValue::PassThrough(_))
    }

    /// Model input representation
    pub fn as_f32(&self) -> f32 {
        match self {
            NormalizedValue::Code(code) => *code as f32,
            NormalizedValue::PassThrough(raw) => *raw as f32,
        }
    }
}

/// Output of one normalization call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedBatch {
    /// Normalized rows, same shape as the input
    pub rows: Vec<Vec<NormalizedValue>>,
    /// Number of columns (feature names) in the request
    pub columns: usize,
    /// One entry per column that could not be resolved
    pub warnings: Vec<UnresolvedFeature>,
}

impl NormalizedBatch {
    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Whether any column was passed through
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Row-major float matrix for the classifier
    pub fn to_model_input(&self) -> Vec<Vec<f32>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(NormalizedValue::as_f32).collect())
            .collect()
    }
}

/// Stateless normalizer over a borrowed quantile table
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'t> {
    table: &'t QuantileTable,
}

impl<'t> Normalizer<'t> {
    /// Create a normalizer reading from `table`
    pub fn new(table: &'t QuantileTable) -> Self {
        Self { table }
    }

    /// The table in use
    pub fn table(&self) -> &'t QuantileTable {
        self.table
    }

    /// Resolve each column's boundaries, collecting a warning per miss
    pub fn resolve<S: AsRef<str>>(
        &self,
        feature_names: &[S],
    ) -> (Vec<Option<&'t [f64]>>, Vec<UnresolvedFeature>) {
        let mut warnings = Vec::new();
        let columns = feature_names
            .iter()
            .enumerate()
            .map(|(column, name)| {
                let name = name.as_ref();
                let boundaries = self.table.lookup(name);
                if boundaries.is_none() {
                    let unresolved = UnresolvedFeature {
                        column,
                        name: name.to_string(),
                    };
                    warn!("{}", unresolved);
                    warnings.push(unresolved);
                }
                boundaries
            })
            .collect();

        (columns, warnings)
    }

    /// Normalize a matrix whose columns are named by `feature_names`
    pub fn normalize<R, S>(
        &self,
        rows: &[R],
        feature_names: &[S],
    ) -> Result<NormalizedBatch, NormalizeError>
    where
        R: AsRef<[f64]>,
        S: AsRef<str>,
    {
        self.run(rows, feature_names, None)
    }

    /// Like [`normalize`](Self::normalize), checking `cancel` between rows
    ///
    /// On cancellation the partial output is dropped.
    pub fn normalize_cancellable<R, S>(
        &self,
        rows: &[R],
        feature_names: &[S],
        cancel: &AtomicBool,
    ) -> Result<NormalizedBatch, NormalizeError>
    where
        R: AsRef<[f64]>,
        S: AsRef<str>,
    {
        self.run(rows, feature_names, Some(cancel))
    }

    fn run<R, S>(
        &self,
        rows: &[R],
        feature_names: &[S],
        cancel: Option<&AtomicBool>,
    ) -> Result<NormalizedBatch, NormalizeError>
    where
        R: AsRef<[f64]>,
        S: AsRef<str>,
    {
        let (columns, warnings) = self.resolve(feature_names);

        let mut out = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                debug!("Normalization cancelled at row {}", index);
                return Err(NormalizeError::Cancelled {
                    completed_rows: index,
                });
            }

            let row = row.as_ref();
            if row.len() != columns.len() {
                return Err(NormalizeError::RowWidthMismatch {
                    row: index,
                    expected: columns.len(),
                    actual: row.len(),
                });
            }

            out.push(normalize_row(row, &columns));
        }

        debug!(
            "Normalized {} rows x {} columns ({} unresolved)",
            out.len(),
            columns.len(),
            warnings.len()
        );

        Ok(NormalizedBatch {
            rows: out,
            columns: columns.len(),
            warnings,
        })
    }
}

fn normalize_row(row: &[f64], columns: &[Option<&[f64]>]) -> Vec<NormalizedValue> {
    row.iter()
        .zip(columns)
        .map(|(&raw, boundaries)| match boundaries {
            Some(boundaries) => NormalizedValue::Code(map_value(raw, boundaries)),
            None => NormalizedValue::PassThrough(raw),
        })
        .collect()
}
