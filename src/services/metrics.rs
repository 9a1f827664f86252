use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Request counters for observability
pub struct Metrics {
    /// Predictions answered successfully
    pub predictions_served: AtomicU64,
    /// Requests rejected as invalid input
    pub predictions_rejected: AtomicU64,
    /// Model errors or non-finite outputs
    pub inference_failures: AtomicU64,
    /// Requests that fell back to the reference sample
    pub default_inputs: AtomicU64,
    /// When counting started
    started_at: DateTime<Utc>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            predictions_rejected: AtomicU64::new(0),
            inference_failures: AtomicU64::new(0),
            default_inputs: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    pub fn inc_served(&self) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected(&self) {
        self.predictions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_inference_failures(&self) {
        self.inference_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_default_inputs(&self) {
        self.default_inputs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            predictions_served: self.predictions_served.load(Ordering::Relaxed),
            predictions_rejected: self.predictions_rejected.load(Ordering::Relaxed),
            inference_failures: self.inference_failures.load(Ordering::Relaxed),
            default_inputs: self.default_inputs.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub predictions_served: u64,
    pub predictions_rejected: u64,
    pub inference_failures: u64,
    pub default_inputs: u64,
}
