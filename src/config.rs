use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::domain::{CurrencyPolicy, PricingConfig, FEATURE_COUNT};
use crate::error::AppraiseError;
use crate::ml::ModelFormat;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port (default: 10000)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the trained model artifact
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Artifact format (auto, json, onnx)
    #[serde(default)]
    pub format: ModelFormat,
    /// Feature count the artifact must accept
    #[serde(default = "default_input_dim")]
    pub input_dim: usize,
}

fn default_model_path() -> String {
    "models/house_model.json".to_string()
}

fn default_input_dim() -> usize {
    FEATURE_COUNT
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            format: ModelFormat::Auto,
            input_dim: FEATURE_COUNT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log filter used when RUST_LOG is unset (e.g. "info,appraise=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for a daily rolling log file (console only when unset)
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info,appraise=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

/// Command-line overrides, applied after files and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model_path: Option<String>,
    pub policy: Option<CurrencyPolicy>,
}

impl AppConfig {
    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("model.path", default_model_path())?
            .set_default("model.format", "auto")?
            .set_default("model.input_dim", FEATURE_COUNT as i64)?
            .set_default("pricing.policy", "raw")?
            .set_default("pricing.scale", crate::domain::DEFAULT_SCALE)?
            .set_default("pricing.inr_rate", crate::domain::DEFAULT_INR_RATE)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("APPRAISE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (APPRAISE_PRICING__POLICY, etc.)
            .add_source(
                Environment::with_prefix("APPRAISE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Defaults only, no files or environment
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            pricing: PricingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load from `config_dir`, apply CLI overrides, then validate.
    pub fn load_validated<P: AsRef<Path>>(
        config_dir: P,
        overrides: &ConfigOverrides,
    ) -> crate::error::Result<Self> {
        let mut config = Self::load_from(config_dir)?;
        config.apply_overrides(overrides);
        config
            .validate()
            .map_err(|errors| AppraiseError::Validation(errors.join("; ")))?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(host) = &overrides.host {
            self.server.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(path) = &overrides.model_path {
            self.model.path = path.clone();
        }
        if let Some(policy) = overrides.policy {
            self.pricing.policy = policy;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.host.trim().is_empty() {
            errors.push("server.host must not be empty".to_string());
        }

        if self.model.path.trim().is_empty() {
            errors.push("model.path must not be empty".to_string());
        }

        if self.model.input_dim != FEATURE_COUNT {
            errors.push(format!(
                "model.input_dim must be {FEATURE_COUNT}, got {}",
                self.model.input_dim
            ));
        }

        if let Err(e) = self.pricing.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
