use axum::{http::Request, routing::post, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info_span;

use crate::api::{handlers, state::AppState};
use crate::services::health_routes;

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // One span per request, tagged with a fresh id
    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
        info_span!(
            "request",
            id = %uuid::Uuid::new_v4(),
            method = %req.method(),
            path = %req.uri().path(),
        )
    });

    let health = health_routes(state.health.clone());

    Router::new()
        // Prediction endpoint
        .route("/predict", post(handlers::predict))
        .with_state(state)
        // Health and metrics endpoints
        .merge(health)
        .layer(trace)
        .layer(cors)
}
