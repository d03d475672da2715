//! API error responses

use axum::{http::StatusCode, response::IntoResponse, Json};
use feature_engine::FeatureError;
use inference_engine::{EstimateError, InferenceError};
use serde::Serialize;
use tracing::warn;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Failure of a single request
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, kind: &'static str, message: impl ToString) -> Self {
        Self {
            status,
            kind,
            message: message.to_string(),
        }
    }
}

impl From<FeatureError> for ApiError {
    fn from(err: FeatureError) -> Self {
        match err {
            FeatureError::InvalidRange(_) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_range", err)
            }
            FeatureError::UnresolvedFeature { .. } => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "unresolved_feature", err)
            }
            FeatureError::DuplicateFeature(_) => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "duplicate_feature", err)
            }
            FeatureError::AliasConflict { .. } => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "alias_conflict", err)
            }
        }
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        ApiError::new(StatusCode::BAD_GATEWAY, "inference_failed", err)
    }
}

impl From<EstimateError> for ApiError {
    fn from(err: EstimateError) -> Self {
        match err {
            EstimateError::Feature(err) => err.into(),
            EstimateError::Inference(err) => err.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        warn!("Request failed ({}): {}", self.kind, self.message);
        let body = ErrorBody {
            error: self.kind,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
