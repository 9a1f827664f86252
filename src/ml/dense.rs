//! Dense regression network inference (CPU-only).
//!
//! Models are stored as JSON. A plain linear regressor is a single `linear` layer
//! with one output row; small MLP regressors chain more layers.
//!
//! Shapes are validated on load so a bad artifact fails at startup, not per request.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AppraiseError, Result};
use crate::ml::Regressor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Tanh,
    Sigmoid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Weights shape: [out_dim][in_dim]
    pub weights: Vec<Vec<f64>>,
    /// Bias shape: [out_dim]
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    fn in_dim(&self) -> usize {
        self.weights.first().map(|r| r.len()).unwrap_or(0)
    }

    fn out_dim(&self) -> usize {
        self.weights.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseNetwork {
    pub input_dim: usize,

    /// Optional z-score normalization applied before the first layer.
    #[serde(default)]
    pub input_mean: Option<Vec<f64>>,
    #[serde(default)]
    pub input_std: Option<Vec<f64>>,

    pub layers: Vec<DenseLayer>,

    /// Free-form training metadata (dataset, version, r2, ...).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl DenseNetwork {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(content)?;
        model.validate().map_err(AppraiseError::Validation)?;
        Ok(model)
    }

    /// Single linear layer `y = w . x + b`.
    pub fn linear(weights: Vec<f64>, bias: f64) -> Self {
        Self {
            input_dim: weights.len(),
            input_mean: None,
            input_std: None,
            layers: vec![DenseLayer {
                weights: vec![weights],
                bias: vec![bias],
                activation: Activation::Linear,
            }],
            metadata: serde_json::Value::Null,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.input_dim == 0 {
            return Err("input_dim must be > 0".to_string());
        }
        if self.layers.is_empty() {
            return Err("layers must not be empty".to_string());
        }
        match (&self.input_mean, &self.input_std) {
            (Some(mean), Some(std)) => {
                if mean.len() != self.input_dim {
                    return Err(format!(
                        "input_mean length {} != input_dim {}",
                        mean.len(),
                        self.input_dim
                    ));
                }
                if std.len() != self.input_dim {
                    return Err(format!(
                        "input_std length {} != input_dim {}",
                        std.len(),
                        self.input_dim
                    ));
                }
                if std.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                    return Err("input_std must be finite and > 0".to_string());
                }
            }
            (None, None) => {}
            _ => return Err("input_mean and input_std must be provided together".to_string()),
        }

        let mut expected_in = self.input_dim;
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.out_dim() == 0 {
                return Err(format!("layer[{idx}] out_dim must be > 0"));
            }
            if layer.bias.len() != layer.out_dim() {
                return Err(format!(
                    "layer[{idx}] bias len {} != out_dim {}",
                    layer.bias.len(),
                    layer.out_dim()
                ));
            }
            for (r, row) in layer.weights.iter().enumerate() {
                if row.len() != expected_in {
                    return Err(format!(
                        "layer[{idx}] weights row {r} len {} != expected in_dim {expected_in}",
                        row.len()
                    ));
                }
                if row.iter().any(|v| !v.is_finite()) {
                    return Err(format!("layer[{idx}] weights contain non-finite values"));
                }
            }
            if layer.bias.iter().any(|v| !v.is_finite()) {
                return Err(format!("layer[{idx}] bias contain non-finite values"));
            }
            expected_in = layer.out_dim();
        }

        if expected_in != 1 {
            return Err(format!(
                "regression output must have out_dim 1, got {expected_in}"
            ));
        }
        Ok(())
    }

    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.input_dim {
            return Err(AppraiseError::InvalidInput(format!(
                "DenseNetwork input dim mismatch: got {}, expected {}",
                input.len(),
                self.input_dim
            )));
        }

        let mut x: Vec<f64> = input.to_vec();

        if let (Some(mean), Some(std)) = (&self.input_mean, &self.input_std) {
            for (i, v) in x.iter_mut().enumerate() {
                *v = (*v - mean[i]) / std[i].max(1e-12);
            }
        }

        for layer in &self.layers {
            let y: Vec<f64> = layer
                .weights
                .iter()
                .zip(&layer.bias)
                .map(|(row, b)| {
                    debug_assert_eq!(row.len(), layer.in_dim());
                    let sum = row.iter().zip(&x).fold(*b, |acc, (w, xi)| acc + w * xi);
                    apply_activation(sum, layer.activation)
                })
                .collect();
            x = y;
        }

        Ok(x)
    }

    pub fn forward_scalar(&self, input: &[f64]) -> Result<f64> {
        let out = self.forward(input)?;
        match out.as_slice() {
            [y] => Ok(*y),
            _ => Err(AppraiseError::Inference(format!(
                "DenseNetwork forward_scalar expects output_dim=1, got {}",
                out.len()
            ))),
        }
    }
}

impl Regressor for DenseNetwork {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.forward_scalar(row)).collect()
    }

    fn describe(&self) -> String {
        let version = self
            .metadata
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or("unversioned");
        format!(
            "dense(input_dim={}, layers={}, version={version})",
            self.input_dim,
            self.layers.len()
        )
    }
}

fn apply_activation(x: f64, act: Activation) -> f64 {
    match act {
        Activation::Linear => x,
        Activation::Relu => x.max(0.0),
        Activation::Tanh => x.tanh(),
        Activation::Sigmoid => sigmoid(x),
    }
}

fn sigmoid(x: f64) -> f64 {
    // Numerically-stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_regressor_computes_dot_product() {
        let net = DenseNetwork::linear(vec![0.5, -1.0, 2.0], 0.25);
        net.validate().unwrap();

        let y = net.forward_scalar(&[2.0, 1.0, 0.5]).unwrap();
        assert!((y - 1.25).abs() < 1e-12);
    }

    #[test]
    fn normalizes_before_first_layer() {
        let mut net = DenseNetwork::linear(vec![1.0, 1.0], 0.0);
        net.input_mean = Some(vec![1.0, 2.0]);
        net.input_std = Some(vec![2.0, 4.0]);
        net.validate().unwrap();

        // (3 - 1) / 2 + (6 - 2) / 4 = 2
        let y = net.forward_scalar(&[3.0, 6.0]).unwrap();
        assert!((y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn hidden_relu_layer() {
        let net = DenseNetwork {
            input_dim: 2,
            input_mean: None,
            input_std: None,
            layers: vec![
                DenseLayer {
                    weights: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                    bias: vec![0.0, 0.0],
                    activation: Activation::Relu,
                },
                DenseLayer {
                    weights: vec![vec![1.0, 1.0]],
                    bias: vec![0.5],
                    activation: Activation::Linear,
                },
            ],
            metadata: serde_json::json!({}),
        };
        net.validate().unwrap();

        let y = net.forward_scalar(&[-3.0, 2.0]).unwrap();
        assert!((y - 2.5).abs() < 1e-12);
    }

    #[test]
    fn validates_shapes() {
        let bad = DenseNetwork {
            input_dim: 3,
            input_mean: None,
            input_std: None,
            layers: vec![DenseLayer {
                weights: vec![vec![1.0, 2.0]], // in_dim mismatch
                bias: vec![0.0],
                activation: Activation::Linear,
            }],
            metadata: serde_json::json!({}),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn rejects_multi_output_head() {
        let bad = DenseNetwork {
            input_dim: 1,
            input_mean: None,
            input_std: None,
            layers: vec![DenseLayer {
                weights: vec![vec![1.0], vec![2.0]],
                bias: vec![0.0, 0.0],
                activation: Activation::Linear,
            }],
            metadata: serde_json::json!({}),
        };
        let err = bad.validate().unwrap_err();
        assert!(err.contains("out_dim 1"));
    }

    #[test]
    fn parses_json_artifact() {
        let json = r#"{
            "input_dim": 2,
            "layers": [{ "weights": [[1.5, -0.5]], "bias": [0.1] }],
            "metadata": { "version": "2024-01" }
        }"#;
        let net = DenseNetwork::from_json(json).unwrap();
        assert_eq!(net.layers[0].activation, Activation::Linear);
        assert_eq!(
            net.describe(),
            "dense(input_dim=2, layers=1, version=2024-01)"
        );

        let out = net.predict_batch(&[vec![1.0, 1.0], vec![0.0, 0.0]]).unwrap();
        assert_eq!(out.len(), 2);
        assert!((out[0] - 1.1).abs() < 1e-12);
        assert!((out[1] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn forward_rejects_wrong_width() {
        let net = DenseNetwork::linear(vec![1.0; 8], 0.0);
        assert!(matches!(
            net.forward(&[1.0; 7]),
            Err(AppraiseError::InvalidInput(_))
        ));
    }
}
