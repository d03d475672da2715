//! Pricing Model Abstraction and Loading

use crate::onnx::OnnxModel;
use crate::InferenceError;
use feature_engine::{FeatureVector, CANONICAL_ORDER};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// A pre-trained price regressor.
///
/// Implementations are read-only after loading and are shared between
/// requests without locking.
pub trait PriceModel: Send + Sync {
    /// Human readable model name
    fn name(&self) -> &str;

    /// Predict a price for an already aligned feature vector
    fn predict(&self, features: &FeatureVector) -> Result<f64, InferenceError>;

    /// Ordered feature names the model was trained on, if it declares them
    fn declared_feature_schema(&self) -> Option<&[String]>;
}

/// Process-wide handle to the loaded model
pub type SharedModel = Arc<dyn PriceModel>;

/// Model artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// JSON linear regression artifact
    Linear,
    /// ONNX graph
    Onnx,
}

impl ModelFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(ModelFormat::Linear),
            "onnx" => Some(ModelFormat::Onnx),
            _ => None,
        }
    }
}

/// Model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the model artifact
    pub path: String,
    /// Artifact format; inferred from the extension when absent
    pub format: Option<ModelFormat>,
    /// Feature names for artifacts that do not carry them (ONNX)
    pub feature_names: Option<Vec<String>>,
    /// Override for the model name
    pub name: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "models/price_model.json".to_string(),
            format: None,
            feature_names: None,
            name: None,
        }
    }
}

/// Load the configured model artifact
pub fn load_model(config: &ModelConfig) -> Result<SharedModel, InferenceError> {
    let path = Path::new(&config.path);
    let format = config
        .format
        .or_else(|| ModelFormat::from_path(path))
        .ok_or_else(|| {
            InferenceError::ModelLoadError(format!(
                "cannot determine model format for {}",
                path.display()
            ))
        })?;

    info!("Loading {:?} model from {}", format, path.display());

    let model: SharedModel = match format {
        ModelFormat::Linear => {
            let mut model = LinearModel::load(path)?;
            if let Some(name) = &config.name {
                model.name = name.clone();
            }
            if let Some(names) = &config.feature_names {
                model = model.with_feature_names(names.clone())?;
            }
            Arc::new(model)
        }
        ModelFormat::Onnx => {
            let name = config
                .name
                .clone()
                .unwrap_or_else(|| file_stem(path));
            Arc::new(OnnxModel::load(path, name, config.feature_names.clone())?)
        }
    };

    info!(
        "Model '{}' loaded ({} declared features)",
        model.name(),
        model
            .declared_feature_schema()
            .map(|s| s.len().to_string())
            .unwrap_or_else(|| "no".to_string())
    );
    Ok(model)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model")
        .to_string()
}

fn default_model_name() -> String {
    "linear".to_string()
}

/// Linear regression artifact: `intercept + Σ coefficient·feature`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Training column order; the canonical order is assumed when absent
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    /// Create a model, checking coefficient count against declared names
    pub fn new(
        name: impl Into<String>,
        feature_names: Option<Vec<String>>,
        intercept: f64,
        coefficients: Vec<f64>,
    ) -> Result<Self, InferenceError> {
        let model = Self {
            name: name.into(),
            feature_names,
            intercept,
            coefficients,
        };
        model.check()?;
        Ok(model)
    }

    /// Parse a JSON artifact
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| InferenceError::ModelLoadError(format!("invalid linear model: {e}")))?;
        model.check()?;
        Ok(model)
    }

    /// Read a JSON artifact from disk
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Replace the declared feature names
    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self, InferenceError> {
        self.feature_names = Some(names);
        self.check()?;
        Ok(self)
    }

    fn expected_width(&self) -> usize {
        self.feature_names
            .as_ref()
            .map(Vec::len)
            .unwrap_or(CANONICAL_ORDER.len())
    }

    fn check(&self) -> Result<(), InferenceError> {
        if self.coefficients.len() != self.expected_width() {
            return Err(InferenceError::ModelLoadError(format!(
                "model '{}' has {} coefficients for {} features",
                self.name,
                self.coefficients.len(),
                self.expected_width()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(InferenceError::ModelLoadError(format!(
                "model '{}' has non-finite parameters",
                self.name
            )));
        }
        Ok(())
    }
}

impl PriceModel for LinearModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        if features.len() != self.coefficients.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} features", self.coefficients.len()),
                actual: format!("{} features", features.len()),
            });
        }

        if let Some(expected) = &self.feature_names {
            if !features.names().eq(expected.iter().map(String::as_str)) {
                return Err(InferenceError::InvalidInputShape {
                    expected: expected.join(","),
                    actual: features.names().collect::<Vec<_>>().join(","),
                });
            }
        }

        let price = features
            .iter()
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, (f, c)| acc + f.value * c);
        Ok(price)
    }

    fn declared_feature_schema(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }
}
