use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppraiseError, Result};

/// Number of fields the model consumes, in positional order.
pub const FEATURE_COUNT: usize = 8;

/// Field names in the order the model expects them.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "med_inc",
    "house_age",
    "ave_rooms",
    "ave_bedrms",
    "population",
    "ave_occup",
    "latitude",
    "longitude",
];

/// Fixed-arity numeric input to the regression model.
///
/// Order is significant: median income (tens of thousands), house age, average
/// rooms, average bedrooms, population, average occupancy, latitude, longitude.
/// No range checks are applied to individual fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Reference sample used when a request omits `data`.
    pub const REFERENCE: Self = Self([8.3252, 41.0, 6.98, 1.02, 322.0, 2.55, 37.88, -122.23]);

    pub const fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    /// Build from an untyped JSON list, rejecting wrong arity and non-numbers.
    pub fn from_json_values(values: &[Value]) -> Result<Self> {
        if values.len() != FEATURE_COUNT {
            return Err(AppraiseError::InvalidInput(format!(
                "expected {FEATURE_COUNT} values in `data`, got {}",
                values.len()
            )));
        }

        let mut out = [0.0_f64; FEATURE_COUNT];
        for (idx, value) in values.iter().enumerate() {
            out[idx] = value.as_f64().ok_or_else(|| {
                AppraiseError::InvalidInput(format!(
                    "data[{idx}] ({}) must be a number, got {}",
                    FEATURE_NAMES[idx],
                    json_type_name(value)
                ))
            })?;
        }
        Ok(Self(out))
    }

    /// Build from a numeric slice. Non-finite values are rejected.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let arr: [f64; FEATURE_COUNT] = values.try_into().map_err(|_| {
            AppraiseError::InvalidInput(format!(
                "expected {FEATURE_COUNT} values, got {}",
                values.len()
            ))
        })?;
        if let Some(idx) = arr.iter().position(|v| !v.is_finite()) {
            return Err(AppraiseError::InvalidInput(format!(
                "{} must be a finite number",
                FEATURE_NAMES[idx]
            )));
        }
        Ok(Self(arr))
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    /// Look up a field by its name in [`FEATURE_NAMES`].
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.0[idx])
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::REFERENCE
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
