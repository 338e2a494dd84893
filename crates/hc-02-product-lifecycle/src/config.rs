//! Configuration for the Product Lifecycle engine

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Which price field a transfer stamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PricingPolicy {
    /// Distributor-bound stages write `distributor_price`, retailer-bound
    /// stages write `retailer_price`.
    #[default]
    TieredByStage,
    /// Every transfer writes `distributor_price`, used as a single
    /// "current tier" price.
    SingleCurrentTier,
}

impl FromStr for PricingPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiered" | "tiered_by_stage" => Ok(Self::TieredByStage),
            "single" | "single_current_tier" => Ok(Self::SingleCurrentTier),
            other => Err(ConfigError::InvalidValue {
                key: "HC_PRICING_POLICY",
                value: other.to_string(),
            }),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{field} must be at most 100, got {value}")]
    ThresholdOutOfRange { field: &'static str, value: u8 },

    #[error("{field} must be greater than zero")]
    ZeroBatchBound { field: &'static str },
}

/// Lifecycle engine configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Reputation both transfer parties need
    pub min_reputation_for_transaction: u8,
    /// Reputation an inspector needs to record quality
    pub min_reputation_for_verification: u8,
    /// Lowest accepted quality score
    pub min_quality_score: u8,
    /// Upper bound for `batch_update_stage`
    pub max_batch_stage_updates: usize,
    /// Upper bound for `batch_record_quality`
    pub max_batch_quality_records: usize,
    pub pricing_policy: PricingPolicy,
    /// Currency used when creation data leaves it empty
    pub default_currency: String,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            min_reputation_for_transaction: 50,
            min_reputation_for_verification: 70,
            min_quality_score: 30,
            max_batch_stage_updates: 20,
            max_batch_quality_records: 10,
            pricing_policy: PricingPolicy::TieredByStage,
            default_currency: "USD".to_string(),
        }
    }
}

impl LifecycleConfig {
    /// Defaults overridden by `HC_*` environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `HC_MIN_REPUTATION_TRANSACTION` | `min_reputation_for_transaction` |
    /// | `HC_MIN_REPUTATION_VERIFICATION` | `min_reputation_for_verification` |
    /// | `HC_MIN_QUALITY_SCORE` | `min_quality_score` |
    /// | `HC_MAX_BATCH_STAGE_UPDATES` | `max_batch_stage_updates` |
    /// | `HC_MAX_BATCH_QUALITY_RECORDS` | `max_batch_quality_records` |
    /// | `HC_PRICING_POLICY` | `pricing_policy` (`tiered` / `single`) |
    /// | `HC_DEFAULT_CURRENCY` | `default_currency` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = read_env::<u8>("HC_MIN_REPUTATION_TRANSACTION")? {
            config.min_reputation_for_transaction = v;
        }
        if let Some(v) = read_env::<u8>("HC_MIN_REPUTATION_VERIFICATION")? {
            config.min_reputation_for_verification = v;
        }
        if let Some(v) = read_env::<u8>("HC_MIN_QUALITY_SCORE")? {
            config.min_quality_score = v;
        }
        if let Some(v) = read_env::<usize>("HC_MAX_BATCH_STAGE_UPDATES")? {
            config.max_batch_stage_updates = v;
        }
        if let Some(v) = read_env::<usize>("HC_MAX_BATCH_QUALITY_RECORDS")? {
            config.max_batch_quality_records = v;
        }
        if let Some(v) = read_env::<PricingPolicy>("HC_PRICING_POLICY")? {
            config.pricing_policy = v;
        }
        if let Ok(currency) = env::var("HC_DEFAULT_CURRENCY") {
            if !currency.trim().is_empty() {
                config.default_currency = currency.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds above 100 and empty batch bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            (
                "min_reputation_for_transaction",
                self.min_reputation_for_transaction,
            ),
            (
                "min_reputation_for_verification",
                self.min_reputation_for_verification,
            ),
            ("min_quality_score", self.min_quality_score),
        ] {
            if value > 100 {
                return Err(ConfigError::ThresholdOutOfRange { field, value });
            }
        }

        if self.max_batch_stage_updates == 0 {
            return Err(ConfigError::ZeroBatchBound {
                field: "max_batch_stage_updates",
            });
        }
        if self.max_batch_quality_records == 0 {
            return Err(ConfigError::ZeroBatchBound {
                field: "max_batch_quality_records",
            });
        }
        Ok(())
    }
}

fn read_env<V: FromStr>(key: &'static str) -> Result<Option<V>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        Err(_) => Ok(None),
    }
}
