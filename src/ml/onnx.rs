//! ONNX regression inference (pure Rust via `tract-onnx`).
//!
//! Lets models exported from other training stacks (e.g. `skl2onnx`) be served
//! without a Python runtime.

use crate::error::{AppraiseError, Result};
use crate::ml::Regressor;

use tract_onnx::prelude::*;

#[derive(Clone)]
pub struct OnnxModel {
    plan: TypedRunnableModel<TypedModel>,
    input_dim: usize,
    path: String,
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("path", &self.path)
            .field("input_dim", &self.input_dim)
            .finish()
    }
}

impl OnnxModel {
    /// Load an ONNX model and specialize it to a fixed `[1, input_dim]` f32 input.
    ///
    /// A zero-vector probe run checks the graph yields exactly one value.
    pub fn load(path: &str, input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(AppraiseError::Validation("input_dim must be > 0".to_string()));
        }

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| AppraiseError::Internal(format!("onnx load failed: {e}")))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, input_dim)),
            )
            .map_err(|e| AppraiseError::Internal(format!("onnx input fact failed: {e}")))?
            .into_optimized()
            .map_err(|e| AppraiseError::Internal(format!("onnx optimize failed: {e}")))?
            .into_runnable()
            .map_err(|e| AppraiseError::Internal(format!("onnx runnable failed: {e}")))?;

        let model = Self {
            plan,
            input_dim,
            path: path.to_string(),
        };
        model.run_row(&vec![0.0; input_dim])?;
        Ok(model)
    }

    fn run_row(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.input_dim {
            return Err(AppraiseError::InvalidInput(format!(
                "onnx input dim mismatch: got {}, expected {}",
                row.len(),
                self.input_dim
            )));
        }

        let input: Vec<f32> = row.iter().map(|v| *v as f32).collect();
        let tensor = tract_ndarray::Array2::<f32>::from_shape_vec((1, self.input_dim), input)
            .map_err(|e| AppraiseError::Internal(format!("onnx input reshape failed: {e}")))?
            .into_tvalue();

        let outputs = self
            .plan
            .run(tvec!(tensor))
            .map_err(|e| AppraiseError::Inference(format!("onnx run failed: {e}")))?;
        let Some(out0) = outputs.first() else {
            return Err(AppraiseError::Inference("onnx produced no outputs".to_string()));
        };

        let arr = out0
            .to_array_view::<f32>()
            .map_err(|e| AppraiseError::Inference(format!("onnx output decode failed: {e}")))?;
        if arr.len() != 1 {
            return Err(AppraiseError::Inference(format!(
                "onnx regression output must hold 1 value, got {}",
                arr.len()
            )));
        }
        Ok(arr.iter().next().copied().unwrap_or_default() as f64)
    }
}

impl Regressor for OnnxModel {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.run_row(row)).collect()
    }

    fn describe(&self) -> String {
        format!("onnx(path={}, input_dim={})", self.path, self.input_dim)
    }
}
