use appraise::api::start_api_server;
use appraise::cli::{Cli, Commands};
use appraise::config::AppConfig;
use appraise::error::Result;
use appraise::logging::{init_logging, init_logging_simple};
use appraise::ml::load_model;
use appraise::services::PredictionService;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match AppConfig::load_validated(&cli.config, &cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            init_logging_simple();
            error!(config_dir = %cli.config, "Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    match &cli.command {
        Some(Commands::Predict(fields)) => {
            init_logging_simple();
            let features = fields.to_features()?;
            let model = load_model(&config.model)?;
            let service = PredictionService::new(model, config.pricing)?;
            let prediction = service.predict(&features)?;
            println!("{}", PredictionService::render_form_output(&prediction));
        }
        Some(Commands::Check) => {
            init_logging_simple();
            let model = load_model(&config.model)?;
            let service = PredictionService::new(model, config.pricing)?;
            println!(
                "ok: {} (policy={}, listen={})",
                service.model_description(),
                config.pricing.policy,
                config.server.bind_addr()
            );
        }
        Some(Commands::Serve { .. }) | None => {
            let _log_guard = init_logging(&config.logging);
            info!(
                model = %config.model.path,
                policy = %config.pricing.policy,
                "Starting appraise {}",
                env!("CARGO_PKG_VERSION")
            );
            if let Err(e) = start_api_server(&config, shutdown_signal()).await {
                error!("Server exited with error: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
