//! Feature and Schema Routes

use axum::{extract::State, Json};
use feature_engine::{FeatureVector, PropertyRecord};
use serde::Serialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

/// Response for the schema endpoint
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub model: String,
    /// Whether the model declared its own feature names
    pub declared: bool,
    pub features: Vec<String>,
}

/// Response for the feature preview endpoint
#[derive(Debug, Serialize)]
pub struct FeaturePreviewResponse {
    pub model: String,
    pub features: FeatureVector,
}

/// Feature names the loaded model receives, in order
pub async fn get_schema(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    let model = state.engine.model();
    Json(SchemaResponse {
        model: model.name().to_string(),
        declared: model.declared_feature_schema().is_some(),
        features: state.engine.feature_schema(),
    })
}

/// Build the feature vector for a record without running the model
pub async fn preview_features(
    State(state): State<Arc<AppState>>,
    Json(record): Json<PropertyRecord>,
) -> Result<Json<FeaturePreviewResponse>, ApiError> {
    let features = state.engine.preview(&record)?;
    Ok(Json(FeaturePreviewResponse {
        model: state.engine.model().name().to_string(),
        features,
    }))
}
