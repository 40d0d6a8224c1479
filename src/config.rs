//! Scoring configuration.
//!
//! Defaults reproduce the published index. A JSON file may override any
//! subset of fields:
//! ```json
//! {
//!   "ema_alpha": 0.5,
//!   "weights": { "bids": 0.3, "views": 0.2, "sale_amount": 0.2 },
//!   "percent_change": { "min_support": 3 }
//! }
//! ```
//! A `weights` object replaces the whole table; metrics it omits carry no weight.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analyzers::types::Metric;
use crate::errors::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiiConfig {
    /// Lower winsor percentile, as a fraction.
    pub winsor_lo: f64,
    /// Upper winsor percentile, as a fraction.
    pub winsor_hi: f64,
    /// Symmetric bound applied to every z-score.
    pub z_cap: f64,
    /// EMA smoothing factor; weight of the newest observation.
    pub ema_alpha: f64,
    pub weights: BTreeMap<Metric, f64>,
    /// Scale applied to keyword base values in the social estimate.
    pub social_discount: f64,
    /// Low-trust source records with fewer views are dropped.
    pub low_trust_view_floor: u64,
    pub percent_change: PercentChangeRules,
}

/// Rules that keep quarter-over-quarter percentages meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentChangeRules {
    /// Entities with a baseline index below this are left out.
    pub base_floor: f64,
    /// Entities with a baseline index below this have their change capped.
    pub small_base_threshold: f64,
    pub small_base_cap: f64,
    /// Minimum auctions in both quarters; 0 disables the check.
    pub min_support: u64,
}

impl Default for PercentChangeRules {
    fn default() -> Self {
        Self {
            base_floor: 8.0,
            small_base_threshold: 12.0,
            small_base_cap: 200.0,
            min_support: 0,
        }
    }
}

impl Default for MiiConfig {
    fn default() -> Self {
        Self {
            winsor_lo: 0.025,
            winsor_hi: 0.975,
            z_cap: 4.0,
            ema_alpha: 0.7,
            weights: default_weights(),
            social_discount: 0.3,
            low_trust_view_floor: 50,
            percent_change: PercentChangeRules::default(),
        }
    }
}

/// Published weight table. Sums to 0.982; scores divide by the weights in use.
pub fn default_weights() -> BTreeMap<Metric, f64> {
    BTreeMap::from([
        (Metric::Bids, 0.235),
        (Metric::SaleAmount, 0.206),
        (Metric::Views, 0.176),
        (Metric::TotalAuctions, 0.118),
        (Metric::SocialEstimate, 0.100),
        (Metric::Comments, 0.088),
        (Metric::CarAge, 0.059),
    ])
}

impl MiiConfig {
    /// Loads and validates the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{path}'"))?;
        let config: MiiConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config '{path}'"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.weights.is_empty() {
            return Err(ConfigError::EmptyWeights);
        }
        for (metric, &value) in &self.weights {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigError::WeightOutOfRange {
                    metric: metric.name(),
                    value,
                });
            }
        }
        if !(0.0 <= self.winsor_lo && self.winsor_lo < self.winsor_hi && self.winsor_hi <= 1.0) {
            return Err(ConfigError::WinsorBounds {
                lo: self.winsor_lo,
                hi: self.winsor_hi,
            });
        }
        if !(self.z_cap > 0.0) {
            return Err(ConfigError::ZCap(self.z_cap));
        }
        if !(self.ema_alpha > 0.0 && self.ema_alpha <= 1.0) {
            return Err(ConfigError::EmaAlpha(self.ema_alpha));
        }
        if !(self.social_discount > 0.0) {
            return Err(ConfigError::SocialDiscount(self.social_discount));
        }
        let rules = &self.percent_change;
        if !(rules.base_floor > 0.0) {
            return Err(ConfigError::BaseFloor(rules.base_floor));
        }
        if rules.base_floor > rules.small_base_threshold {
            return Err(ConfigError::PctThresholds {
                floor: rules.base_floor,
                threshold: rules.small_base_threshold,
            });
        }
        Ok(())
    }
}
