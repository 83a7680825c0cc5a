//! Normalization Route

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use normalizer::{NormalizedValue, Normalizer, UnresolvedFeature};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::SampleBatch;
use crate::{ApiError, AppState};

/// Response for the normalize endpoint
#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub data: Vec<Vec<NormalizedValue>>,
    pub warnings: Vec<UnresolvedFeature>,
    pub rows: usize,
    pub columns: usize,
}

/// Normalize a batch of samples
pub async fn post_normalize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SampleBatch>, JsonRejection>,
) -> Result<Json<NormalizeResponse>, ApiError> {
    let Json(request) = payload?;
    let (columns, rows) = request.into_matrix();
    debug!("Normalize request: {} rows x {} columns", rows.len(), columns.len());

    let table = state.table;
    let batch = tokio::task::spawn_blocking(move || {
        Normalizer::new(table).normalize(&rows, &columns)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    metrics::counter!("basalt_rows_normalized_total").increment(batch.n_rows() as u64);
    metrics::counter!("basalt_unresolved_columns_total").increment(batch.warnings.len() as u64);

    Ok(Json(NormalizeResponse {
        rows: batch.n_rows(),
        columns: batch.columns,
        data: batch.rows,
        warnings: batch.warnings,
    }))
}
