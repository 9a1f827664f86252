use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::AppConfig;
use crate::error::Result;
use crate::ml::load_model;
use crate::services::PredictionService;

/// Load the model and assemble handler state.
///
/// Fails with `ModelUnavailable` before anything is bound when the artifact is bad.
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let model = load_model(&config.model)?;
    let predictor = PredictionService::new(model, config.pricing)?;
    Ok(AppState::new(predictor))
}

/// Start the API server and run until `shutdown` resolves
pub async fn start_api_server<F>(config: &AppConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app_state = build_state(config)?;
    let app = create_router(app_state);

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        policy = %config.pricing.policy,
        "API server listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("API server stopped");
    Ok(())
}
