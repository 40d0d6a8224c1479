//! Data types used by the scoring pipeline.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::quarter::Quarter;

/// The signals combined into the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Bids,
    SaleAmount,
    Views,
    TotalAuctions,
    SocialEstimate,
    Comments,
    CarAge,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Bids,
        Metric::SaleAmount,
        Metric::Views,
        Metric::TotalAuctions,
        Metric::SocialEstimate,
        Metric::Comments,
        Metric::CarAge,
    ];

    /// Metrics clipped to their percentile band before scoring. Auction counts
    /// and car age are scored unclipped.
    pub const WINSORIZED: [Metric; 5] = [
        Metric::Views,
        Metric::Bids,
        Metric::Comments,
        Metric::SaleAmount,
        Metric::SocialEstimate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Bids => "bids",
            Metric::SaleAmount => "sale_amount",
            Metric::Views => "views",
            Metric::TotalAuctions => "total_auctions",
            Metric::SocialEstimate => "social_estimate",
            Metric::Comments => "comments",
            Metric::CarAge => "car_age",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// One value per [`Metric`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricSet<T>([T; 7]);

impl<T> MetricSet<T> {
    pub fn from_fn(mut f: impl FnMut(Metric) -> T) -> Self {
        Self(Metric::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &T)> {
        Metric::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Metric> for MetricSet<T> {
    type Output = T;

    fn index(&self, metric: Metric) -> &T {
        &self.0[metric.slot()]
    }
}

impl<T> IndexMut<Metric> for MetricSet<T> {
    fn index_mut(&mut self, metric: Metric) -> &mut T {
        &mut self.0[metric.slot()]
    }
}

/// Per-(make, variant, quarter, cohort) aggregate of canonical records.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregate {
    pub make: String,
    pub variant_key: String,
    pub quarter: Quarter,
    pub cohort: String,
    pub model_family: String,
    pub generation: String,
    /// Model year of the first record seen for the group.
    pub year: Option<i32>,
    /// Raw group means; `TotalAuctions` is the record count, `CarAge` and
    /// `SocialEstimate` are taken from the first record.
    pub metrics: MetricSet<f64>,
}

/// A group after winsorizing and robust z-scoring within its (quarter, cohort).
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledGroup {
    pub group: GroupAggregate,
    pub winsorized: MetricSet<f64>,
    /// `None` when the metric could not be scored for this group.
    pub z: MetricSet<Option<f64>>,
}

/// A scaled group with its composite score, quarter index and rank.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredGroup {
    pub scaled: ScaledGroup,
    pub score: f64,
    pub index: f64,
    pub rank: u32,
}

/// One row of the published MII table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAggregate {
    pub variant_id: String,
    pub make: String,
    pub quarter: Quarter,
    pub cohort: String,
    pub model_family: String,
    pub generation: String,
    pub year: Option<i32>,
    pub total_auctions: u64,

    // raw group means
    pub views: f64,
    pub bids: f64,
    pub comments: f64,
    pub sale_amount: f64,
    pub social_estimate: f64,
    pub car_age: f64,

    // winsorized values
    pub views_w: f64,
    pub bids_w: f64,
    pub comments_w: f64,
    pub sale_amount_w: f64,
    pub social_estimate_w: f64,

    // robust z-scores
    pub z_bids: Option<f64>,
    pub z_sale_amount: Option<f64>,
    pub z_views: Option<f64>,
    pub z_total_auctions: Option<f64>,
    pub z_social_estimate: Option<f64>,
    pub z_comments: Option<f64>,
    pub z_car_age: Option<f64>,

    #[serde(rename = "MII_Score")]
    pub mii_score: f64,
    #[serde(rename = "MII_Index")]
    pub mii_index: f64,
    #[serde(rename = "Quarter_Rank")]
    pub quarter_rank: u32,
    #[serde(rename = "MII_Momentum")]
    pub mii_momentum: Option<f64>,
    #[serde(rename = "MII_Smoothed")]
    pub mii_smoothed: f64,
    pub calculation_date: String,
}

impl ScoredAggregate {
    pub fn from_scored(
        scored: ScoredGroup,
        momentum: Option<f64>,
        smoothed: f64,
        calculation_date: &str,
    ) -> Self {
        let ScoredGroup {
            scaled,
            score,
            index,
            rank,
        } = scored;
        let ScaledGroup {
            group,
            winsorized,
            z,
        } = scaled;
        let m = group.metrics;

        Self {
            variant_id: group.variant_key,
            make: group.make,
            quarter: group.quarter,
            cohort: group.cohort,
            model_family: group.model_family,
            generation: group.generation,
            year: group.year,
            total_auctions: m[Metric::TotalAuctions] as u64,
            views: m[Metric::Views],
            bids: m[Metric::Bids],
            comments: m[Metric::Comments],
            sale_amount: m[Metric::SaleAmount],
            social_estimate: m[Metric::SocialEstimate],
            car_age: m[Metric::CarAge],
            views_w: winsorized[Metric::Views],
            bids_w: winsorized[Metric::Bids],
            comments_w: winsorized[Metric::Comments],
            sale_amount_w: winsorized[Metric::SaleAmount],
            social_estimate_w: winsorized[Metric::SocialEstimate],
            z_bids: z[Metric::Bids],
            z_sale_amount: z[Metric::SaleAmount],
            z_views: z[Metric::Views],
            z_total_auctions: z[Metric::TotalAuctions],
            z_social_estimate: z[Metric::SocialEstimate],
            z_comments: z[Metric::Comments],
            z_car_age: z[Metric::CarAge],
            mii_score: score,
            mii_index: index,
            quarter_rank: rank,
            mii_momentum: momentum,
            mii_smoothed: smoothed,
            calculation_date: calculation_date.to_string(),
        }
    }

    /// All z-scores in weight-table order.
    pub fn z_scores(&self) -> [Option<f64>; 7] {
        [
            self.z_bids,
            self.z_sale_amount,
            self.z_views,
            self.z_total_auctions,
            self.z_social_estimate,
            self.z_comments,
            self.z_car_age,
        ]
    }
}

/// Stability-adjusted index change for one entity between two quarters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentChangeRow {
    pub variant_id: String,
    pub make: String,
    pub cohort: String,
    #[serde(rename = "MII_Baseline")]
    pub mii_baseline: f64,
    #[serde(rename = "MII_Comparison")]
    pub mii_comparison: f64,
    #[serde(rename = "Pct_Change")]
    pub pct_change: f64,
}
