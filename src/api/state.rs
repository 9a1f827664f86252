use std::sync::Arc;

use crate::services::{HealthState, PredictionService};

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Prediction service (owns the read-only model)
    pub predictor: Arc<PredictionService>,

    /// Readiness and counters for the health endpoints
    pub health: Arc<HealthState>,
}

impl AppState {
    /// Build state around a ready service. Health shares the service's metrics.
    pub fn new(predictor: PredictionService) -> Self {
        let health = HealthState::new(
            predictor.model_description(),
            predictor.pricing().policy,
            predictor.metrics(),
        );
        health.set_model_ready(true);

        Self {
            predictor: Arc::new(predictor),
            health: Arc::new(health),
        }
    }
}
