//! Prediction Routes

use axum::{extract::State, Json};
use feature_engine::PropertyRecord;
use inference_engine::Valuation;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// Response for predictions endpoint
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    #[serde(flatten)]
    pub valuation: Valuation,
}

/// Value a property
pub async fn create_prediction(
    State(state): State<Arc<AppState>>,
    Json(record): Json<PropertyRecord>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    let valuation = match state.engine.estimate(&record) {
        Ok(valuation) => valuation,
        Err(err) => {
            metrics::counter!("valuator_predictions_total", "outcome" => "error").increment(1);
            return Err(err.into());
        }
    };

    metrics::counter!("valuator_predictions_total", "outcome" => "ok").increment(1);
    metrics::histogram!("valuator_prediction_latency_seconds")
        .record(valuation.latency_us as f64 / 1_000_000.0);

    info!(
        %request_id,
        model = %valuation.model,
        "Estimated {}",
        valuation.formatted_price
    );

    Ok(Json(PredictionResponse {
        request_id,
        valuation,
    }))
}
