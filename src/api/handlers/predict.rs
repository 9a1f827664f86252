use axum::{body::Bytes, extract::State, Json};
use tracing::info;

use crate::api::{
    state::AppState,
    types::{ApiError, PredictRequest, PredictResponse},
};

/// POST /predict
///
/// Body `{ "data": [8 numbers] }`; `data` may be omitted to score the reference sample.
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<PredictResponse>, ApiError> {
    let request = PredictRequest::from_body(&body).inspect_err(|e| {
        state.predictor.metrics().inc_rejected();
        info!(error = %e, "Rejected malformed predict body");
    })?;

    let prediction = state
        .predictor
        .predict_values(request.data.as_deref())
        .inspect_err(|e| info!(error = %e, "Predict request failed"))?;

    Ok(Json(prediction.price.into()))
}
