//! The prediction operation shared by every caller.
//!
//! `PredictionService` owns the loaded model (injected, read-only) and the
//! deployment's currency policy. It performs no locking; concurrent callers share
//! it through an `Arc`.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{FeatureVector, Price, PricingConfig, FEATURE_COUNT};
use crate::error::{AppraiseError, Result};
use crate::ml::Regressor;
use crate::services::Metrics;

/// Outcome of one prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub features: FeatureVector,
    /// Model output in units of 100,000 currency-of-training.
    pub raw: f64,
    pub price: Price,
}

pub struct PredictionService {
    model: Arc<dyn Regressor>,
    pricing: PricingConfig,
    metrics: Arc<Metrics>,
}

impl PredictionService {
    /// Wrap a loaded model. The model must accept exactly [`FEATURE_COUNT`] features.
    pub fn new(model: Arc<dyn Regressor>, pricing: PricingConfig) -> Result<Self> {
        if model.input_dim() != FEATURE_COUNT {
            return Err(AppraiseError::model_unavailable(
                model.describe(),
                format!(
                    "model expects {} features, service provides {FEATURE_COUNT}",
                    model.input_dim()
                ),
            ));
        }
        pricing.validate().map_err(AppraiseError::Validation)?;

        Ok(Self {
            model,
            pricing,
            metrics: Arc::new(Metrics::new()),
        })
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    pub fn model_description(&self) -> String {
        self.model.describe()
    }

    /// Predict from a typed feature vector.
    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        let batch = [features.to_vec()];
        let outputs = self.model.predict_batch(&batch).inspect_err(|e| {
            self.metrics.inc_inference_failures();
            warn!(error = %e, "Model inference failed");
        })?;

        let raw = match outputs.as_slice() {
            [raw] if raw.is_finite() => *raw,
            [raw] => {
                self.metrics.inc_inference_failures();
                return Err(AppraiseError::Inference(format!(
                    "model returned non-finite value {raw}"
                )));
            }
            other => {
                self.metrics.inc_inference_failures();
                return Err(AppraiseError::Inference(format!(
                    "expected 1 output for a single-sample batch, got {}",
                    other.len()
                )));
            }
        };

        let price = self.pricing.apply(raw).inspect_err(|e| {
            self.metrics.inc_inference_failures();
            warn!(error = %e, raw, "Currency conversion failed");
        })?;
        self.metrics.inc_served();
        debug!(raw, price = price.as_f64(), policy = %self.pricing.policy, "Prediction served");

        Ok(Prediction {
            features: *features,
            raw,
            price,
        })
    }

    /// Predict from an untyped list, falling back to the reference sample when absent.
    ///
    /// Malformed input is rejected before the model is invoked.
    pub fn predict_values(&self, values: Option<&[Value]>) -> Result<Prediction> {
        let features = match values {
            Some(values) => FeatureVector::from_json_values(values).inspect_err(|e| {
                self.metrics.inc_rejected();
                debug!(error = %e, "Rejected prediction input");
            })?,
            None => {
                self.metrics.inc_default_inputs();
                FeatureVector::REFERENCE
            }
        };
        self.predict(&features)
    }

    /// Text shown by the form caller. Always renders the raw model output.
    pub fn render_form_output(prediction: &Prediction) -> String {
        format!("Predicted Price: {:.2}", prediction.raw)
    }
}
