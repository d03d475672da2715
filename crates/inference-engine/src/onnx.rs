//! ONNX Pricing Model using tract

use crate::model::PriceModel;
use crate::InferenceError;
use feature_engine::{FeatureVector, CANONICAL_ORDER};
use std::path::Path;
use tracing::debug;
use tract_onnx::prelude::*;

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX regression model taking a `[1, n]` f32 input and producing the price
/// as the first element of its first output
pub struct OnnxModel {
    name: String,
    feature_names: Option<Vec<String>>,
    input_width: usize,
    plan: OnnxPlan,
}

impl OnnxModel {
    /// Load and optimize an ONNX graph.
    ///
    /// ONNX graphs do not record column names, so `feature_names` supplies
    /// the training order. Without it the canonical order is assumed.
    pub fn load(
        path: &Path,
        name: impl Into<String>,
        feature_names: Option<Vec<String>>,
    ) -> Result<Self, InferenceError> {
        let input_width = feature_names
            .as_ref()
            .map(Vec::len)
            .unwrap_or(CANONICAL_ORDER.len());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, input_width]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {e}", path.display())))?;

        Ok(Self {
            name: name.into(),
            feature_names,
            input_width,
            plan,
        })
    }

    fn failed(&self, reason: impl std::fmt::Display) -> InferenceError {
        InferenceError::InferenceFailed {
            model: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

impl PriceModel for OnnxModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        if features.len() != self.input_width {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("[1, {}]", self.input_width),
                actual: format!("[1, {}]", features.len()),
            });
        }

        let values: Vec<f32> = features.iter().map(|f| f.value as f32).collect();
        let input = Tensor::from_shape(&[1, values.len()], &values).map_err(|e| self.failed(e))?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| self.failed(e))?;

        let output = outputs.first().ok_or_else(|| self.failed("model produced no outputs"))?;
        let output = output.cast_to::<f32>().map_err(|e| self.failed(e))?;
        let price = output
            .as_slice::<f32>()
            .map_err(|e| self.failed(e))?
            .first()
            .copied()
            .ok_or_else(|| self.failed("model produced an empty output"))?;

        debug!("ONNX model '{}' predicted {}", self.name, price);
        Ok(f64::from(price))
    }

    fn declared_feature_schema(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }
}
