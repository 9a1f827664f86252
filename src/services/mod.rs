pub mod health;
pub mod metrics;
pub mod predictor;

pub use health::{health_routes, ComponentHealth, HealthResponse, HealthState, HealthStatus};
pub use metrics::{Metrics, MetricsSnapshot};
pub use predictor::{Prediction, PredictionService};
