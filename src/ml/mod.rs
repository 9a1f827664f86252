//! Model loading and CPU inference.
//!
//! The service only needs "8 numbers in, 1 number out", so every backend sits behind
//! [`Regressor`] and is chosen once at startup from [`ModelConfig`].

pub mod dense;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod regressor;

pub use dense::{Activation, DenseLayer, DenseNetwork};
#[cfg(feature = "onnx")]
pub use onnx::OnnxModel;
pub use regressor::Regressor;

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::ModelConfig;
use crate::error::{AppraiseError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// Pick by file extension (`.onnx`, otherwise JSON).
    #[default]
    Auto,
    Json,
    Onnx,
}

impl ModelFormat {
    pub fn resolve(self, path: &Path) -> Self {
        match self {
            ModelFormat::Auto => match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("onnx") => ModelFormat::Onnx,
                _ => ModelFormat::Json,
            },
            other => other,
        }
    }
}

/// Load the configured model artifact.
///
/// Any failure is reported as `ModelUnavailable`; the caller must not start serving.
pub fn load_model(cfg: &ModelConfig) -> Result<Arc<dyn Regressor>> {
    let path = Path::new(&cfg.path);
    let format = cfg.format.resolve(path);

    let model: Arc<dyn Regressor> = match format {
        ModelFormat::Json | ModelFormat::Auto => Arc::new(
            DenseNetwork::from_file(path)
                .map_err(|e| AppraiseError::model_unavailable(&cfg.path, e))?,
        ),
        ModelFormat::Onnx => load_onnx(cfg)?,
    };

    if model.input_dim() != cfg.input_dim {
        return Err(AppraiseError::model_unavailable(
            &cfg.path,
            format!(
                "model expects {} features, configured for {}",
                model.input_dim(),
                cfg.input_dim
            ),
        ));
    }

    info!(path = %cfg.path, model = %model.describe(), "Model loaded");
    Ok(model)
}

#[cfg(feature = "onnx")]
fn load_onnx(cfg: &ModelConfig) -> Result<Arc<dyn Regressor>> {
    let model = OnnxModel::load(&cfg.path, cfg.input_dim)
        .map_err(|e| AppraiseError::model_unavailable(&cfg.path, e))?;
    Ok(Arc::new(model))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(cfg: &ModelConfig) -> Result<Arc<dyn Regressor>> {
    Err(AppraiseError::model_unavailable(
        &cfg.path,
        "ONNX support not compiled in (rebuild with `--features onnx`)",
    ))
}
