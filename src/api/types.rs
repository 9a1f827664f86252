use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Price;
use crate::error::AppraiseError;

// ============================================================================
// Prediction Types
// ============================================================================

/// `POST /predict` body. `data` absent or `null` selects the reference sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
}

impl PredictRequest {
    /// Parse a raw body; an empty body is the same as `{}`.
    pub fn from_body(body: &[u8]) -> Result<Self, AppraiseError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| AppraiseError::InvalidInput(format!("malformed JSON body: {e}")))
    }
}

/// Exactly one shape per deployment, chosen by the currency policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Raw { prediction: f64 },
    Usd { prediction_usd: f64 },
    Inr { prediction_in_inr: i64 },
}

impl From<Price> for PredictResponse {
    fn from(price: Price) -> Self {
        match price {
            Price::Raw(prediction) => Self::Raw { prediction },
            Price::Usd(prediction_usd) => Self::Usd { prediction_usd },
            Price::Inr(prediction_in_inr) => Self::Inr { prediction_in_inr },
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Request-boundary error: maps service errors to a status and JSON body.
#[derive(Debug)]
pub struct ApiError(pub AppraiseError);

impl From<AppraiseError> for ApiError {
    fn from(err: AppraiseError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            e if e.is_client_error() => (StatusCode::BAD_REQUEST, "invalid_input"),
            AppraiseError::Inference(_) => (StatusCode::INTERNAL_SERVER_ERROR, "inference_failed"),
            AppraiseError::ModelUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "model_unavailable")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let message = match &self.0 {
            AppraiseError::InvalidInput(msg) | AppraiseError::Inference(msg) => msg.clone(),
            other => other.to_string(),
        };
        (
            status,
            Json(ErrorBody {
                error: kind.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_shape_follows_price_variant() {
        assert_eq!(
            serde_json::to_value(PredictResponse::from(Price::Raw(4.5))).unwrap(),
            json!({ "prediction": 4.5 })
        );
        assert_eq!(
            serde_json::to_value(PredictResponse::from(Price::Usd(450000.0))).unwrap(),
            json!({ "prediction_usd": 450000.0 })
        );
        assert_eq!(
            serde_json::to_value(PredictResponse::from(Price::Inr(38250000))).unwrap(),
            json!({ "prediction_in_inr": 38250000 })
        );
    }

    #[test]
    fn empty_body_and_null_data_mean_default() {
        assert!(PredictRequest::from_body(b"").unwrap().data.is_none());
        assert!(PredictRequest::from_body(b"  \n").unwrap().data.is_none());
        assert!(PredictRequest::from_body(b"{}").unwrap().data.is_none());
        assert!(PredictRequest::from_body(br#"{"data": null}"#)
            .unwrap()
            .data
            .is_none());
    }

    #[test]
    fn malformed_body_is_invalid_input() {
        let err = PredictRequest::from_body(br#"{"data": 5}"#).unwrap_err();
        assert!(matches!(err, AppraiseError::InvalidInput(_)));
        let err = PredictRequest::from_body(b"{oops").unwrap_err();
        assert!(err.to_string().contains("malformed JSON body"));
    }

    #[test]
    fn maps_errors_to_statuses() {
        let invalid = ApiError(AppraiseError::InvalidInput("x".to_string()));
        assert_eq!(
            invalid.status_and_kind(),
            (StatusCode::BAD_REQUEST, "invalid_input")
        );
        let failed = ApiError(AppraiseError::Inference("x".to_string()));
        assert_eq!(failed.status_and_kind().0, StatusCode::INTERNAL_SERVER_ERROR);
        let broken = ApiError(AppraiseError::Validation("x".to_string()));
        assert_eq!(
            broken.status_and_kind(),
            (StatusCode::INTERNAL_SERVER_ERROR, "internal")
        );
    }
}
