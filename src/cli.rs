use clap::{Args, Parser, Subcommand};

use crate::config::ConfigOverrides;
use crate::domain::{CurrencyPolicy, FeatureVector};
use crate::error::Result;

#[derive(Parser)]
#[command(name = "appraise")]
#[command(version)]
#[command(about = "House price prediction service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory (reads default.toml and $APPRAISE_ENV.toml)
    #[arg(short, long, global = true, default_value = "config")]
    pub config: String,

    /// Model artifact path (overrides model.path)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Currency policy: raw, usd or inr (overrides pricing.policy)
    #[arg(long, global = true)]
    pub policy: Option<CurrencyPolicy>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the prediction API (default)
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,
        /// Listen port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Predict one house price from individual fields
    Predict(FeatureArgs),
    /// Load config and model, then exit
    Check,
}

/// The eight model inputs as named flags. Omitted fields use the reference sample.
#[derive(Args, Debug, Clone, Default)]
pub struct FeatureArgs {
    /// Median income (tens of thousands)
    #[arg(long, allow_hyphen_values = true)]
    pub med_inc: Option<f64>,
    /// House age (years)
    #[arg(long, allow_hyphen_values = true)]
    pub house_age: Option<f64>,
    /// Average rooms
    #[arg(long, allow_hyphen_values = true)]
    pub ave_rooms: Option<f64>,
    /// Average bedrooms
    #[arg(long, allow_hyphen_values = true)]
    pub ave_bedrms: Option<f64>,
    /// Population
    #[arg(long, allow_hyphen_values = true)]
    pub population: Option<f64>,
    /// Average occupancy
    #[arg(long, allow_hyphen_values = true)]
    pub ave_occup: Option<f64>,
    /// Latitude
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<f64>,
    /// Longitude
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<f64>,
}

impl FeatureArgs {
    pub fn to_features(&self) -> Result<FeatureVector> {
        let given = [
            self.med_inc,
            self.house_age,
            self.ave_rooms,
            self.ave_bedrms,
            self.population,
            self.ave_occup,
            self.latitude,
            self.longitude,
        ];
        let values: Vec<f64> = given
            .iter()
            .zip(FeatureVector::REFERENCE.as_array())
            .map(|(v, fallback)| v.unwrap_or(*fallback))
            .collect();
        FeatureVector::from_slice(&values)
    }
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        let (host, port) = match &self.command {
            Some(Commands::Serve { host, port }) => (host.clone(), *port),
            _ => (None, None),
        };
        ConfigOverrides {
            host,
            port,
            model_path: self.model.clone(),
            policy: self.policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_fields_fall_back_to_reference() {
        let args = FeatureArgs {
            med_inc: Some(3.0),
            longitude: Some(-118.0),
            ..FeatureArgs::default()
        };
        let fv = args.to_features().unwrap();
        assert_eq!(fv.get("med_inc"), Some(3.0));
        assert_eq!(fv.get("house_age"), Some(41.0));
        assert_eq!(fv.get("longitude"), Some(-118.0));
    }

    #[test]
    fn parses_predict_with_negative_longitude() {
        let cli = Cli::try_parse_from([
            "appraise",
            "--policy",
            "usd",
            "predict",
            "--med-inc",
            "8.3252",
            "--longitude",
            "-122.23",
        ])
        .unwrap();

        assert_eq!(cli.policy, Some(CurrencyPolicy::Usd));
        let Some(Commands::Predict(args)) = cli.command else {
            panic!("expected predict command");
        };
        assert_eq!(args.longitude, Some(-122.23));
    }

    #[test]
    fn serve_flags_become_overrides() {
        let cli = Cli::try_parse_from(["appraise", "serve", "--port", "8080"]).unwrap();
        let o = cli.overrides();
        assert_eq!(o.port, Some(8080));
        assert!(o.host.is_none());
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["appraise", "--policy", "eur", "check"]).is_err());
    }
}
