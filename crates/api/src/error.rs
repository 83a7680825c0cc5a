//! API Error Types

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use discrimination::DiscriminationError;
use normalizer::NormalizeError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Discrimination(#[from] DiscriminationError),
    #[error("Invalid request body: {}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),
    #[error("Model not loaded, please try again later")]
    ModelNotLoaded,
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(rejection) => rejection.status(),
            ApiError::Normalize(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Discrimination(DiscriminationError::Classifier(_))
            | ApiError::Discrimination(DiscriminationError::OutputShape { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Discrimination(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
