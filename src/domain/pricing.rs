//! Currency policies applied to the model's raw output.
//!
//! The model predicts in units of 100,000 currency-of-training. A deployment picks
//! exactly one policy; the exchange rate is configuration, never fetched live.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{AppraiseError, Result};

/// Raw output is denominated in hundreds of thousands.
pub const DEFAULT_SCALE: f64 = 100_000.0;

/// Fixed USD to INR rate.
pub const DEFAULT_INR_RATE: f64 = 85.0;

/// 2^63. Truncated INR values must lie in `-I64_BOUND..I64_BOUND` to fit an `i64`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyPolicy {
    #[default]
    Raw,
    Usd,
    Inr,
}

impl CurrencyPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyPolicy::Raw => "raw",
            CurrencyPolicy::Usd => "usd",
            CurrencyPolicy::Inr => "inr",
        }
    }
}

impl std::fmt::Display for CurrencyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CurrencyPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(CurrencyPolicy::Raw),
            "usd" => Ok(CurrencyPolicy::Usd),
            "inr" => Ok(CurrencyPolicy::Inr),
            other => Err(format!(
                "unknown currency policy `{other}` (expected raw, usd or inr)"
            )),
        }
    }
}

/// Price in the unit chosen by the deployment's policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Price {
    Raw(f64),
    Usd(f64),
    /// Truncated toward zero.
    Inr(i64),
}

impl Price {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Price::Raw(v) | Price::Usd(v) => v,
            Price::Inr(v) => v as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub policy: CurrencyPolicy,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_inr_rate")]
    pub inr_rate: f64,
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

fn default_inr_rate() -> f64 {
    DEFAULT_INR_RATE
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            policy: CurrencyPolicy::Raw,
            scale: DEFAULT_SCALE,
            inr_rate: DEFAULT_INR_RATE,
        }
    }
}

impl PricingConfig {
    pub fn with_policy(policy: CurrencyPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Convert a raw model output to the configured currency.
    ///
    /// INR multiplies left to right (`raw * scale * rate`) and truncates, so the
    /// result matches the deployed INR variants bit for bit.
    ///
    /// A USD value that overflows to infinity, or an INR value outside the `i64`
    /// range, is an [`AppraiseError::Inference`].
    pub fn apply(&self, raw: f64) -> Result<Price> {
        match self.policy {
            CurrencyPolicy::Raw => Ok(Price::Raw(raw)),
            CurrencyPolicy::Usd => {
                let usd = raw * self.scale;
                if !usd.is_finite() {
                    return Err(AppraiseError::Inference(format!(
                        "USD conversion of {raw} is not finite"
                    )));
                }
                Ok(Price::Usd(usd))
            }
            CurrencyPolicy::Inr => {
                let inr = (raw * self.scale * self.inr_rate).trunc();
                if !(-I64_BOUND..I64_BOUND).contains(&inr) {
                    return Err(AppraiseError::Inference(format!(
                        "INR conversion of {raw} does not fit a 64-bit integer"
                    )));
                }
                Ok(Price::Inr(inr as i64))
            }
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err("pricing.scale must be finite and > 0".to_string());
        }
        if !self.inr_rate.is_finite() || self.inr_rate <= 0.0 {
            return Err("pricing.inr_rate must be finite and > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_policy_is_identity() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.apply(4.526).unwrap(), Price::Raw(4.526));
    }

    #[test]
    fn usd_policy_scales_by_one_hundred_thousand() {
        let pricing = PricingConfig::with_policy(CurrencyPolicy::Usd);
        for r in [4.526_f64, 0.0, -0.3, 1.0 / 3.0] {
            assert_eq!(pricing.apply(r).unwrap(), Price::Usd(r * 100000.0));
        }
    }

    #[test]
    fn inr_policy_truncates_after_both_multipliers() {
        let pricing = PricingConfig::with_policy(CurrencyPolicy::Inr);
        let r = 4.526_f64;
        let expected = (r * 100000.0 * 85.0).trunc() as i64;
        assert_eq!(pricing.apply(r).unwrap(), Price::Inr(expected));
        assert_eq!(pricing.apply(1.23456789).unwrap(), Price::Inr(10493827));
    }

    #[test]
    fn inr_truncates_toward_zero_for_negative_output() {
        let pricing = PricingConfig::with_policy(CurrencyPolicy::Inr);
        // -0.0000001 * 100000 * 85 = -0.85
        assert_eq!(pricing.apply(-0.0000001).unwrap(), Price::Inr(0));
    }

    #[test]
    fn inr_rate_is_configurable() {
        let pricing = PricingConfig {
            policy: CurrencyPolicy::Inr,
            scale: DEFAULT_SCALE,
            inr_rate: 83.5,
        };
        assert_eq!(pricing.apply(2.0).unwrap(), Price::Inr(16_700_000));
    }

    #[test]
    fn usd_overflow_is_an_inference_error() {
        let pricing = PricingConfig::with_policy(CurrencyPolicy::Usd);
        assert!(matches!(pricing.apply(1e304), Err(AppraiseError::Inference(_))));
        assert!(matches!(pricing.apply(-1e304), Err(AppraiseError::Inference(_))));
        assert_eq!(pricing.apply(1e300).unwrap(), Price::Usd(1e300 * 100000.0));
    }

    #[test]
    fn inr_outside_i64_range_is_an_inference_error() {
        let pricing = PricingConfig::with_policy(CurrencyPolicy::Inr);
        // 1e13 * 100000 * 85 = 8.5e19 > i64::MAX
        assert!(matches!(pricing.apply(1e13), Err(AppraiseError::Inference(_))));
        assert!(matches!(pricing.apply(-1e13), Err(AppraiseError::Inference(_))));
        assert!(matches!(pricing.apply(1e306), Err(AppraiseError::Inference(_))));
        assert_eq!(pricing.apply(1e9).unwrap(), Price::Inr(8_500_000_000_000_000));
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("USD".parse::<CurrencyPolicy>().unwrap(), CurrencyPolicy::Usd);
        assert_eq!(" inr ".parse::<CurrencyPolicy>().unwrap(), CurrencyPolicy::Inr);
        assert!("eur".parse::<CurrencyPolicy>().is_err());
    }

    #[test]
    fn rejects_non_positive_rate() {
        let pricing = PricingConfig {
            inr_rate: 0.0,
            ..PricingConfig::default()
        };
        assert!(pricing.validate().is_err());
        assert!(PricingConfig::default().validate().is_ok());
    }
}
