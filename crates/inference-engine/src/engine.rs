//! Inference Engine Implementation

use crate::model::{PriceModel, SharedModel};
use crate::{EstimateError, InferenceError};
use feature_engine::{FeatureBuilder, FeatureError, FeatureVector, PropertyRecord, CANONICAL_ORDER};
use serde::Serialize;
use tracing::{debug, info};

/// Result of one valuation
#[derive(Debug, Clone, Serialize)]
pub struct Valuation {
    /// Predicted price ($)
    pub price: f64,
    /// Price rendered as `$1,234.56`
    pub formatted_price: String,
    /// Price divided by square footage; absent for zero footage
    pub price_per_sqft: Option<f64>,
    /// Vector that was submitted to the model
    pub features: FeatureVector,
    /// Name of the model that produced the price
    pub model: String,
    /// Inference latency in microseconds
    pub latency_us: u64,
    /// Timestamp when the valuation was made
    pub timestamp_ms: u64,
}

/// Couples the shared model with the feature builder
pub struct InferenceEngine {
    model: SharedModel,
    builder: FeatureBuilder,
}

impl InferenceEngine {
    /// Create a new inference engine.
    ///
    /// A declared model schema is resolved immediately, so a model that needs
    /// a feature the builder cannot produce is rejected here rather than on
    /// the first request.
    pub fn new(model: SharedModel, builder: FeatureBuilder) -> Result<Self, FeatureError> {
        if let Some(schema) = model.declared_feature_schema() {
            builder.resolve_schema(schema)?;
        }
        info!(
            "Inference engine ready: model='{}', features={}",
            model.name(),
            model
                .declared_feature_schema()
                .map(<[String]>::len)
                .unwrap_or(CANONICAL_ORDER.len())
        );
        Ok(Self { model, builder })
    }

    /// The loaded model
    pub fn model(&self) -> &dyn PriceModel {
        self.model.as_ref()
    }

    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }

    /// Feature names in the order the model receives them
    pub fn feature_schema(&self) -> Vec<String> {
        match self.model.declared_feature_schema() {
            Some(schema) => schema.to_vec(),
            None => CANONICAL_ORDER.iter().map(|f| f.name().to_string()).collect(),
        }
    }

    /// Build the vector the model would receive, without predicting
    pub fn preview(&self, record: &PropertyRecord) -> Result<FeatureVector, FeatureError> {
        self.builder
            .build(record, self.model.declared_feature_schema())
    }

    /// Build features, run the model and assemble a valuation
    pub fn estimate(&self, record: &PropertyRecord) -> Result<Valuation, EstimateError> {
        let features = self.preview(record)?;

        let start = std::time::Instant::now();
        let price = self.model.predict(&features)?;
        let latency_us = start.elapsed().as_micros() as u64;

        if !price.is_finite() {
            return Err(InferenceError::InferenceFailed {
                model: self.model.name().to_string(),
                reason: format!("non-finite prediction {price}"),
            }
            .into());
        }

        debug!("Valuation {:.2} in {}us", price, latency_us);

        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Ok(Valuation {
            price,
            formatted_price: format_price(price),
            price_per_sqft: price_per_square_foot(price, record.square_footage),
            features,
            model: self.model.name().to_string(),
            latency_us,
            timestamp_ms,
        })
    }
}

/// Price per square foot, `None` when the footage is not positive
pub fn price_per_square_foot(price: f64, square_footage: i64) -> Option<f64> {
    (square_footage > 0).then(|| price / square_footage as f64)
}

/// Render a price as dollars with thousands separators and cents
pub fn format_price(price: f64) -> String {
    let cents = (price.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if price < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{fraction:02}")
}
