//! Record types flowing into the scoring pipeline.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::quarter::Quarter;

/// Sentinel used for absent categorical values.
pub const UNKNOWN: &str = "Unknown";

/// Auction site a record was scraped from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataSource {
    BringATrailer,
    CarsAndBids,
    Other(String),
}

impl DataSource {
    /// Sources whose low-engagement listings are treated as noise.
    pub fn is_low_trust(&self) -> bool {
        matches!(self, DataSource::CarsAndBids)
    }

    pub fn tag(&self) -> &str {
        match self {
            DataSource::BringATrailer => "BAT",
            DataSource::CarsAndBids => "CNB",
            DataSource::Other(tag) => tag,
        }
    }
}

impl From<&str> for DataSource {
    fn from(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "BAT" => DataSource::BringATrailer,
            "CNB" => DataSource::CarsAndBids,
            _ => DataSource::Other(tag.trim().to_string()),
        }
    }
}

impl From<String> for DataSource {
    fn from(tag: String) -> Self {
        DataSource::from(tag.as_str())
    }
}

impl From<DataSource> for String {
    fn from(source: DataSource) -> Self {
        source.tag().to_string()
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One auction listing as scraped. Every field except the source is optional
/// and kept in its raw textual form until normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub source: DataSource,
    pub model: Option<String>,
    /// Full listing title; consulted when the model text is bare or missing.
    pub title: Option<String>,
    pub make: Option<String>,
    pub views: Option<String>,
    pub bids: Option<String>,
    pub comments: Option<String>,
    pub sale_amount: Option<String>,
    pub scraped_date: Option<String>,
    pub sale_date: Option<String>,
    pub end_date: Option<String>,
    pub year: Option<String>,
}

impl RawRecord {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            model: None,
            title: None,
            make: None,
            views: None,
            bids: None,
            comments: None,
            sale_amount: None,
            scraped_date: None,
            sale_date: None,
            end_date: None,
            year: None,
        }
    }

    /// Date candidates in priority order: capture, sale, end.
    pub fn date_candidates(&self) -> [Option<&str>; 3] {
        [
            self.scraped_date.as_deref(),
            self.sale_date.as_deref(),
            self.end_date.as_deref(),
        ]
    }
}

/// A record after field cleaning and entity classification.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub source: DataSource,
    pub model: String,
    pub make: String,
    pub year: Option<i32>,
    pub car_age: i32,
    pub cohort: &'static str,
    pub model_family: String,
    pub generation: String,
    pub variant_key: String,
    pub quarter: Quarter,
    pub views: u64,
    pub bids: u64,
    pub comments: u64,
    pub sale_amount: Option<u64>,
}

/// Everything time-dependent in a run. Passing it explicitly keeps the
/// pipeline a pure function of (snapshot, context).
#[derive(Debug, Clone, Copy)]
pub struct ProcessingContext {
    pub now: DateTime<Utc>,
}

impl ProcessingContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn current_year(&self) -> i32 {
        self.now.year()
    }

    /// Timestamp stamped on every scored row.
    pub fn calculation_date(&self) -> String {
        self.now.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
