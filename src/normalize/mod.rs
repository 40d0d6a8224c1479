//! Field normalization: raw scraped records into canonical records.
//!
//! Each raw record either becomes a [`CanonicalRecord`] or is rejected with a
//! [`Rejection`]. Rejections are tallied in a [`NormalizeReport`].

pub mod amount;
pub mod dates;
pub mod model;
pub mod year;

use std::collections::BTreeMap;

use crate::classify::classify;
use crate::config::MiiConfig;
use crate::errors::Rejection;
use crate::records::{CanonicalRecord, ProcessingContext, RawRecord, UNKNOWN};
use tracing::{debug, info};

/// Normalizes and classifies one raw record.
pub fn normalize_record(
    raw: &RawRecord,
    config: &MiiConfig,
    ctx: &ProcessingContext,
) -> Result<CanonicalRecord, Rejection> {
    let title = raw.title.as_deref().filter(|t| !t.trim().is_empty());
    let text = raw
        .model
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .or(title)
        .ok_or(Rejection::MissingModel)?;
    let model_text = model::canonical_model(text, title)?;

    let views = amount::extract_count(raw.views.as_deref());
    if raw.source.is_low_trust() && views < config.low_trust_view_floor {
        return Err(Rejection::LowTrustNoise { views });
    }

    let quarter = dates::assign_quarter(raw, ctx).ok_or(Rejection::NoValidQuarter)?;

    let make = raw
        .make
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .or(model_text.stripped_make)
        .unwrap_or(UNKNOWN)
        .to_string();

    let current_year = ctx.current_year();
    let texts: Vec<&str> = [Some(text), title].into_iter().flatten().collect();
    let year = year::resolve_year(raw.year.as_deref(), &texts, current_year);
    let classification = classify(&make, &model_text.model, year);

    Ok(CanonicalRecord {
        source: raw.source.clone(),
        model: model_text.model,
        make,
        year,
        car_age: year::car_age(year, current_year),
        cohort: year::era_cohort(year),
        model_family: classification.model_family,
        generation: classification.generation.to_string(),
        variant_key: classification.variant_key,
        quarter,
        views,
        bids: amount::extract_count(raw.bids.as_deref()),
        comments: amount::extract_count(raw.comments.as_deref()),
        sale_amount: raw.sale_amount.as_deref().and_then(amount::clean_sale_amount),
    })
}

/// Counts of accepted and rejected records for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub accepted: usize,
    pub rejected: BTreeMap<&'static str, usize>,
}

impl NormalizeReport {
    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Normalizes a whole snapshot, keeping input order among accepted records.
#[tracing::instrument(skip_all, fields(records = raws.len()))]
pub fn normalize_all(
    raws: &[RawRecord],
    config: &MiiConfig,
    ctx: &ProcessingContext,
) -> (Vec<CanonicalRecord>, NormalizeReport) {
    let mut report = NormalizeReport::default();
    let mut records = Vec::with_capacity(raws.len());

    for raw in raws {
        match normalize_record(raw, config, ctx) {
            Ok(record) => {
                report.accepted += 1;
                records.push(record);
            }
            Err(reason) => {
                debug!(source = %raw.source, model = ?raw.model, %reason, "Record rejected");
                *report.rejected.entry(reason.kind()).or_default() += 1;
            }
        }
    }

    info!(
        accepted = report.accepted,
        rejected = report.total_rejected(),
        reasons = ?report.rejected,
        "Normalization complete"
    );
    (records, report)
}
