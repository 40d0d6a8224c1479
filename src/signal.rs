//! Baseline social-interest proxy per entity key.
//!
//! There is no live social feed, so each entity gets a conservative estimate
//! from a fixed keyword table. The value is scored like any other metric.

/// Keyword → follower-scale base value. Matching is by the longest keyword
/// contained in the lower-cased entity key; equal-length keywords keep table order.
static KEYWORDS: &[(&str, f64)] = &[
    ("bmw", 650_000.0),
    ("m3", 280_000.0),
    ("e30", 18_000.0),
    ("e36", 15_000.0),
    ("e46", 42_000.0),
    ("2002", 12_000.0),
    ("z8", 4_500.0),
    ("m5", 140_000.0),
    ("m4", 35_000.0),
    ("z4", 22_000.0),
    ("mercedes", 480_000.0),
    ("190e", 18_000.0),
    ("c63", 85_000.0),
    ("c63 amg", 85_000.0),
    ("e63", 65_000.0),
    ("e63 amg", 65_000.0),
    ("s63", 55_000.0),
    ("s63 amg", 55_000.0),
    ("amg gt", 75_000.0),
    ("g63", 95_000.0),
    ("g63 amg", 95_000.0),
    ("sl63", 42_000.0),
    ("g-class", 55_000.0),
    ("sl", 18_000.0),
    ("cls63", 35_000.0),
    ("e55", 28_000.0),
    ("c55", 22_000.0),
    ("sl65", 18_000.0),
    ("sl55", 15_000.0),
    ("clk63", 22_000.0),
    ("porsche", 450_000.0),
    ("911", 150_000.0),
    ("turbo", 45_000.0),
    ("gt3", 65_000.0),
    ("boxster", 28_000.0),
    ("cayman", 32_000.0),
    ("gt2", 42_000.0),
    ("carrera", 85_000.0),
    ("ferrari", 320_000.0),
    ("lamborghini", 280_000.0),
    ("mclaren", 85_000.0),
    ("aventador", 75_000.0),
    ("huracan", 85_000.0),
    ("toyota", 180_000.0),
    ("supra", 55_000.0),
    ("nissan", 120_000.0),
    ("gtr", 38_000.0),
    ("gt-r", 38_000.0),
    ("honda", 160_000.0),
    ("s2000", 35_000.0),
    ("nsx", 22_000.0),
    ("ford", 180_000.0),
    ("mustang", 85_000.0),
    ("chevrolet", 150_000.0),
    ("corvette", 95_000.0),
];

const LUXURY_BRANDS: &[&str] = &["bmw", "mercedes", "porsche", "ferrari", "lamborghini", "mclaren"];
const MASS_MARKET_BRANDS: &[&str] = &["toyota", "honda", "nissan"];

pub const LUXURY_DEFAULT: f64 = 20_000.0;
pub const MASS_MARKET_DEFAULT: f64 = 12_000.0;
pub const BASELINE_DEFAULT: f64 = 8_000.0;

/// Deterministic keyword estimator.
#[derive(Debug, Clone)]
pub struct SignalEstimator {
    discount: f64,
    /// Keywords sorted longest first; the sort is stable so ties keep table order.
    ordered: Vec<(&'static str, f64)>,
}

impl SignalEstimator {
    pub fn new(discount: f64) -> Self {
        let mut ordered = KEYWORDS.to_vec();
        ordered.sort_by_key(|(k, _)| std::cmp::Reverse(k.len()));
        Self { discount, ordered }
    }

    /// Estimate for `key`.
    ///
    /// The longest matching keyword's base value is discounted and floored at
    /// [`BASELINE_DEFAULT`]. When nothing matches, or the discounted value does
    /// not clear the floor, the brand tier default applies instead.
    pub fn estimate(&self, key: &str) -> f64 {
        let key = key.to_lowercase();

        let matched = self
            .ordered
            .iter()
            .find(|(keyword, _)| key.contains(keyword))
            .map(|(_, base)| (base * self.discount).round().max(BASELINE_DEFAULT));

        match matched {
            Some(value) if value > BASELINE_DEFAULT => value,
            _ => brand_tier_default(&key),
        }
    }
}

fn brand_tier_default(key: &str) -> f64 {
    if LUXURY_BRANDS.iter().any(|b| key.contains(b)) {
        LUXURY_DEFAULT
    } else if MASS_MARKET_BRANDS.iter().any(|b| key.contains(b)) {
        MASS_MARKET_DEFAULT
    } else {
        BASELINE_DEFAULT
    }
}
