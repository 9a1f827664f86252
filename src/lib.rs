pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod ml;
pub mod services;

pub use config::AppConfig;
pub use domain::{CurrencyPolicy, FeatureVector, Price, PricingConfig};
pub use error::{AppraiseError, Result};
pub use ml::{load_model, DenseNetwork, Regressor};
pub use services::{Prediction, PredictionService};
