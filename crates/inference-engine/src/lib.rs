//! Pricing Inference Engine
//!
//! Loads a pre-trained pricing model once at start-up and runs it on feature
//! vectors built from property records.

mod engine;
mod model;
mod onnx;

pub use engine::{format_price, price_per_square_foot, InferenceEngine, Valuation};
pub use model::{load_model, LinearModel, ModelConfig, ModelFormat, PriceModel, SharedModel};
pub use onnx::OnnxModel;

use feature_engine::FeatureError;
use thiserror::Error;

/// Errors during model loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed in model '{model}': {reason}")]
    InferenceFailed { model: String, reason: String },
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
}

/// Errors while producing a valuation
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}
