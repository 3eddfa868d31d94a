//! Inference adapter: fixed-shape feature vectors and price derivation.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::{ModelArtifacts, PriceModel};
use crate::error::{FlatcastError, FlatcastResult};
use crate::normalize::{FeatureRecord, FeatureValue};

/// Prediction returned to the caller, both values rounded to 2 decimals
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PredictionResult {
    pub price_per_meter: f64,
    pub total_price: f64,
}

/// Assembles complete feature vectors and invokes the regressor.
///
/// Constructed once at startup and passed in explicitly wherever inference
/// is needed; the model and schema are read-only shared state.
#[derive(Clone)]
pub struct InferenceAdapter {
    artifacts: Arc<ModelArtifacts>,
    model: Arc<dyn PriceModel>,
}

impl InferenceAdapter {
    pub fn new(artifacts: Arc<ModelArtifacts>, model: Arc<dyn PriceModel>) -> Self {
        Self { artifacts, model }
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    /// Build the complete ordered feature vector for the record.
    ///
    /// Missing columns get a neutral default (numeric 0, categorical "0")
    /// so the model always receives a fixed-shape input. Categorical
    /// columns are coerced to text, all others to numeric; non-numeric
    /// values become the default rather than failing.
    pub fn fill_defaults(&self, record: &FeatureRecord) -> Vec<FeatureValue> {
        self.artifacts
            .columns
            .iter()
            .map(|column| {
                let value = record.get(column);
                if self.artifacts.is_categorical(column) {
                    FeatureValue::Text(
                        value
                            .map(FeatureValue::to_display_string)
                            .unwrap_or_else(|| "0".to_string()),
                    )
                } else {
                    FeatureValue::Float(value.and_then(FeatureValue::as_f64).unwrap_or(0.0))
                }
            })
            .collect()
    }

    /// Predict price per meter and total price for a feature record.
    ///
    /// The model output is log-scale price per meter; total price is its
    /// exponential times the record's declared total area (0 if absent).
    pub fn predict(&self, record: &FeatureRecord) -> FlatcastResult<PredictionResult> {
        let row = self.fill_defaults(record);
        debug!("Assembled feature vector of {} columns", row.len());

        let log_price = self
            .model
            .predict(&row)
            .map_err(|e| FlatcastError::Inference { message: e.to_string() })?;

        let price_per_meter = log_price.exp();
        let total_area = record
            .get("TotalArea")
            .and_then(FeatureValue::as_f64)
            .unwrap_or(0.0);
        let total_price = price_per_meter * total_area;

        Ok(PredictionResult {
            price_per_meter: round2(price_per_meter),
            total_price: round2(total_price),
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
