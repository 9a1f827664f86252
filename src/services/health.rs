//! Health and metrics endpoints for process supervision.
//!
//! Liveness, readiness and a Prometheus text endpoint, mounted next to the
//! prediction API.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::CurrencyPolicy;
use crate::services::{Metrics, MetricsSnapshot};

/// Health status for a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Component health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Overall service health response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub currency_policy: CurrencyPolicy,
    pub counters: MetricsSnapshot,
}

/// Shared state for health endpoints
pub struct HealthState {
    /// Set once the model has been loaded and the service constructed
    pub model_ready: AtomicBool,
    /// Description of the loaded model
    pub model_description: String,
    pub currency_policy: CurrencyPolicy,
    pub metrics: Arc<Metrics>,
}

impl HealthState {
    pub fn new(
        model_description: String,
        currency_policy: CurrencyPolicy,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            model_ready: AtomicBool::new(false),
            model_description,
            currency_policy,
            metrics,
        }
    }

    pub fn set_model_ready(&self, ready: bool) {
        self.model_ready.store(ready, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.model_ready.load(Ordering::SeqCst)
    }

    /// Get overall health status
    pub fn get_health(&self) -> HealthResponse {
        let ready = self.is_ready();
        let counters = self.metrics.snapshot();

        let model = ComponentHealth {
            name: "model".to_string(),
            status: if ready {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            },
            message: Some(self.model_description.clone()),
        };

        let inference_status = if counters.inference_failures == 0 {
            HealthStatus::Healthy
        } else if counters.predictions_served > 0 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        };
        let inference = ComponentHealth {
            name: "inference".to_string(),
            status: inference_status,
            message: (counters.inference_failures > 0)
                .then(|| format!("{} failed inference calls", counters.inference_failures)),
        };

        let status = if !ready {
            HealthStatus::Unhealthy
        } else if inference_status.is_healthy() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        HealthResponse {
            status,
            timestamp: Utc::now(),
            uptime_seconds: self.metrics.uptime_seconds(),
            components: vec![model, inference],
            currency_policy: self.currency_policy,
            counters,
        }
    }
}

pub fn health_routes(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Full health check endpoint
async fn health_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let health = state.get_health();
    let status_code = match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(health))
}

/// Liveness probe - is the process alive?
async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe - is the model loaded?
async fn readiness_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Prometheus metrics endpoint
async fn metrics_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        render_prometheus(&state),
    )
}

fn render_prometheus(state: &HealthState) -> String {
    let health = state.get_health();
    let c = health.counters;
    let health_status = match health.status {
        HealthStatus::Healthy => 1,
        HealthStatus::Degraded => 0,
        HealthStatus::Unhealthy => -1,
    };

    format!(
        r#"# HELP appraise_up Health status (1=healthy, 0=degraded, -1=unhealthy)
# TYPE appraise_up gauge
appraise_up {}

# HELP appraise_uptime_seconds Uptime in seconds
# TYPE appraise_uptime_seconds counter
appraise_uptime_seconds {}

# HELP appraise_model_ready Model loaded and serving
# TYPE appraise_model_ready gauge
appraise_model_ready {}

# HELP appraise_predictions_total Predictions served
# TYPE appraise_predictions_total counter
appraise_predictions_total {}

# HELP appraise_rejected_total Requests rejected as invalid input
# TYPE appraise_rejected_total counter
appraise_rejected_total {}

# HELP appraise_inference_failures_total Failed model calls
# TYPE appraise_inference_failures_total counter
appraise_inference_failures_total {}

# HELP appraise_default_inputs_total Requests served with the reference sample
# TYPE appraise_default_inputs_total counter
appraise_default_inputs_total {}
"#,
        health_status,
        health.uptime_seconds,
        u8::from(state.is_ready()),
        c.predictions_served,
        c.predictions_rejected,
        c.inference_failures,
        c.default_inputs,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> HealthState {
        HealthState::new(
            "dense(input_dim=8)".to_string(),
            CurrencyPolicy::Usd,
            Arc::new(Metrics::new()),
        )
    }

    #[test]
    fn unhealthy_until_model_ready() {
        let state = state();
        assert_eq!(state.get_health().status, HealthStatus::Unhealthy);

        state.set_model_ready(true);
        let health = state.get_health();
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.currency_policy, CurrencyPolicy::Usd);
    }

    #[test]
    fn degraded_after_inference_failures() {
        let state = state();
        state.set_model_ready(true);
        state.metrics.inc_served();
        state.metrics.inc_inference_failures();

        let health = state.get_health();
        assert_eq!(health.status, HealthStatus::Degraded);
        assert!(health.components[1].message.is_some());
    }

    #[test]
    fn prometheus_output_carries_counters() {
        let state = state();
        state.set_model_ready(true);
        state.metrics.inc_served();
        state.metrics.inc_rejected();

        let text = render_prometheus(&state);
        assert!(text.contains("appraise_up 1"));
        assert!(text.contains("appraise_model_ready 1"));
        assert!(text.contains("appraise_predictions_total 1"));
        assert!(text.contains("appraise_rejected_total 1"));
    }
}
