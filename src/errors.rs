//! Typed failures for record normalization and configuration.

use thiserror::Error;

/// Why a raw record did not make it into the canonical table.
///
/// Rejections are expected on real snapshots and are counted, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("record has no model or title text")]
    MissingModel,
    #[error("model text '{0}' is ambiguous after normalization")]
    AmbiguousModel(String),
    #[error("no date field yields a valid, non-future quarter")]
    NoValidQuarter,
    #[error("low-trust source record with {views} views is below the noise floor")]
    LowTrustNoise { views: u64 },
}

impl Rejection {
    /// Short stable label used in rejection summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::MissingModel => "missing_model",
            Rejection::AmbiguousModel(_) => "ambiguous_model",
            Rejection::NoValidQuarter => "no_valid_quarter",
            Rejection::LowTrustNoise { .. } => "low_trust_noise",
        }
    }
}

/// Invalid scoring configuration. A config is checked once when loaded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("weight table is empty")]
    EmptyWeights,
    #[error("weight for '{metric}' must lie in (0, 1), got {value}")]
    WeightOutOfRange { metric: &'static str, value: f64 },
    #[error("winsor bounds must satisfy 0 <= lo < hi <= 1, got [{lo}, {hi}]")]
    WinsorBounds { lo: f64, hi: f64 },
    #[error("z cap must be positive, got {0}")]
    ZCap(f64),
    #[error("EMA alpha must lie in (0, 1], got {0}")]
    EmaAlpha(f64),
    #[error("social discount must be positive, got {0}")]
    SocialDiscount(f64),
    #[error("percent-change base floor must be positive, got {0}")]
    BaseFloor(f64),
    #[error("percent-change base floor {floor} exceeds small-base threshold {threshold}")]
    PctThresholds { floor: f64, threshold: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_kinds_are_distinct() {
        let kinds = [
            Rejection::MissingModel.kind(),
            Rejection::AmbiguousModel("AMG".into()).kind(),
            Rejection::NoValidQuarter.kind(),
            Rejection::LowTrustNoise { views: 3 }.kind(),
        ];
        let mut deduped = kinds.to_vec();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), kinds.len());
    }

    #[test]
    fn test_rejection_message_mentions_text() {
        let msg = Rejection::AmbiguousModel("AMG".into()).to_string();
        assert!(msg.contains("AMG"));
    }
}
