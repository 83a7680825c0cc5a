//! Discrimination Route

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use discrimination::DiscriminationReport;
use std::sync::Arc;

use super::SampleBatch;
use crate::{ApiError, AppState};

/// Normalize and classify a batch of samples
pub async fn post_discriminate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SampleBatch>, JsonRejection>,
) -> Result<Json<DiscriminationReport>, ApiError> {
    if state.discriminator.is_none() {
        return Err(ApiError::ModelNotLoaded);
    }
    let Json(request) = payload?;

    let (columns, rows) = request.into_matrix();
    let worker = Arc::clone(&state);
    let report = tokio::task::spawn_blocking(move || {
        let discriminator = worker.discriminator.as_ref().ok_or(ApiError::ModelNotLoaded)?;
        discriminator
            .discriminate(&rows, &columns)
            .map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    metrics::counter!("basalt_predictions_total").increment(report.predictions.len() as u64);

    Ok(Json(report))
}
