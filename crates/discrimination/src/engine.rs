//! Discrimination Engine

use crate::distribution::Distribution;
use crate::schema::{feature_index, TectonicSetting, FEATURE_COLUMNS, SETTING_COUNT};
use crate::DiscriminationError;
use normalizer::{Normalizer, UnresolvedFeature};
use quantile_table::QuantileTable;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Pretrained model boundary
///
/// Receives normalized rows in [`FEATURE_COLUMNS`] order and returns one
/// probability row of [`SETTING_COUNT`] entries per input row.
pub trait Classifier: Send + Sync {
    fn predict(&self, inputs: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, DiscriminationError>;
}

impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    fn predict(&self, inputs: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, DiscriminationError> {
        (**self).predict(inputs)
    }
}

/// Decoded prediction for one sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Most probable setting
    pub setting: TectonicSetting,
    /// Probability of `setting`
    pub confidence: f32,
    /// Probabilities in output-index order
    pub probabilities: Vec<f32>,
}

impl Prediction {
    /// Decode a probability row by argmax (first maximum wins)
    pub fn from_probabilities(probabilities: Vec<f32>) -> Result<Self, DiscriminationError> {
        if probabilities.len() != SETTING_COUNT {
            return Err(DiscriminationError::OutputShape {
                expected: format!("{} probabilities", SETTING_COUNT),
                actual: format!("{} probabilities", probabilities.len()),
            });
        }

        let mut best = 0;
        for (index, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = index;
            }
        }

        // Length checked above, so `best` indexes a class
        Ok(Self {
            setting: TectonicSetting::ALL[best],
            confidence: probabilities[best],
            probabilities,
        })
    }
}

/// Result of one discrimination batch
#[derive(Debug, Clone, Serialize)]
pub struct DiscriminationReport {
    /// One prediction per input row
    pub predictions: Vec<Prediction>,
    /// Columns passed through without normalization
    pub warnings: Vec<UnresolvedFeature>,
    /// Per-setting counts
    pub distribution: Distribution,
    /// Wall time for normalization and inference
    pub latency_ms: u64,
}

/// Normalizes samples and runs them through a classifier
pub struct Discriminator<'t, C> {
    normalizer: Normalizer<'t>,
    classifier: C,
}

impl<'t, C: Classifier> Discriminator<'t, C> {
    /// Create a discriminator over a loaded table
    pub fn new(table: &'t QuantileTable, classifier: C) -> Self {
        let missing = table.missing_features(&FEATURE_COLUMNS);
        if !missing.is_empty() {
            warn!(
                "Quantile table lacks {} model features: {:?}",
                missing.len(),
                missing
            );
        }
        Self {
            normalizer: Normalizer::new(table),
            classifier,
        }
    }

    /// Classify rows whose columns are named by `feature_names`
    ///
    /// `feature_names` must list the model columns in model order.
    pub fn discriminate<R, S>(
        &self,
        rows: &[R],
        feature_names: &[S],
    ) -> Result<DiscriminationReport, DiscriminationError>
    where
        R: AsRef<[f64]>,
        S: AsRef<str>,
    {
        let start = Instant::now();
        check_schema(feature_names)?;

        let batch = self.normalizer.normalize(rows, feature_names)?;
        let inputs = batch.to_model_input();

        let outputs = if inputs.is_empty() {
            Vec::new()
        } else {
            self.classifier.predict(&inputs)?
        };

        if outputs.len() != inputs.len() {
            return Err(DiscriminationError::OutputShape {
                expected: format!("{} rows", inputs.len()),
                actual: format!("{} rows", outputs.len()),
            });
        }

        let predictions = outputs
            .into_iter()
            .map(Prediction::from_probabilities)
            .collect::<Result<Vec<_>, _>>()?;
        let distribution = Distribution::from_predictions(&predictions);
        let latency_ms = start.elapsed().as_millis() as u64;

        info!(
            "Discriminated {} samples in {}ms ({} unresolved columns)",
            predictions.len(),
            latency_ms,
            batch.warnings.len()
        );

        Ok(DiscriminationReport {
            predictions,
            warnings: batch.warnings,
            distribution,
            latency_ms,
        })
    }

    /// The classifier in use
    pub fn classifier(&self) -> &C {
        &self.classifier
    }
}

fn check_schema<S: AsRef<str>>(feature_names: &[S]) -> Result<(), DiscriminationError> {
    if feature_names.len() != FEATURE_COLUMNS.len() {
        return Err(DiscriminationError::ColumnCount {
            expected: FEATURE_COLUMNS.len(),
            actual: feature_names.len(),
        });
    }

    for (index, (expected, actual)) in FEATURE_COLUMNS.iter().zip(feature_names).enumerate() {
        if *expected != actual.as_ref() {
            return Err(DiscriminationError::SchemaMismatch {
                index,
                expected,
                actual: actual.as_ref().to_string(),
            });
        }
    }

    Ok(())
}

/// Rule-based stand-in for the pretrained model
///
/// Picks Ocean Island when the TiO2 code sits in the upper quarter of the
/// code range and Mid-Oceanic Ridge otherwise.
#[derive(Debug, Clone, Default)]
pub struct MockClassifier;

impl MockClassifier {
    pub fn new() -> Self {
        info!("Creating mock classifier");
        Self
    }
}

impl Classifier for MockClassifier {
    fn predict(&self, inputs: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, DiscriminationError> {
        let tio2 = feature_index("TIO2(WT%)").unwrap_or(7);

        inputs
            .iter()
            .map(|row| {
                let code = row.get(tio2).copied().ok_or_else(|| {
                    DiscriminationError::Classifier(format!(
                        "input row has {} columns, expected {}",
                        row.len(),
                        FEATURE_COLUMNS.len()
                    ))
                })?;

                let winner = if code >= 192.0 {
                    TectonicSetting::OceanIsland
                } else {
                    TectonicSetting::MidOceanicRidge
                };
                debug!("Mock prediction: TiO2 code {} -> {}", code, winner);

                let mut probabilities = vec![0.02; SETTING_COUNT];
                probabilities[winner.index()] = 0.84;
                Ok(probabilities)
            })
            .collect()
    }
}
