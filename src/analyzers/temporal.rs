//! Quarter-over-quarter analytics: momentum, smoothing and percent change.

use std::collections::BTreeMap;

use crate::analyzers::types::{PercentChangeRow, ScoredAggregate, ScoredGroup};
use crate::analyzers::utility::partition;
use crate::config::PercentChangeRules;
use crate::quarter::Quarter;
use tracing::debug;

/// First differences of a chronological series; the first entry has none.
pub fn momentum(series: &[f64]) -> Vec<Option<f64>> {
    std::iter::once(None)
        .chain(series.windows(2).map(|w| Some(w[1] - w[0])))
        .take(series.len())
        .collect()
}

/// Exponential moving average seeded with the first observation:
/// `s[0] = x[0]`, `s[t] = alpha * x[t] + (1 - alpha) * s[t-1]`.
pub fn ema(series: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(series.len());
    let mut prev: Option<f64> = None;
    for &x in series {
        let s = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        out.push(s);
        prev = Some(s);
    }
    out
}

/// Adds momentum and smoothed index to every scored group and emits the final
/// rows. Each (variant, cohort) series is ordered by quarter and recomputed
/// from scratch.
#[tracing::instrument(skip_all, fields(groups = scored.len()))]
pub fn apply_temporal(
    scored: Vec<ScoredGroup>,
    alpha: f64,
    calculation_date: &str,
) -> Vec<ScoredAggregate> {
    let series = partition(scored, |s| {
        (
            s.scaled.group.variant_key.clone(),
            s.scaled.group.cohort.clone(),
        )
    });
    debug!(series = series.len(), "Computing momentum and smoothing");

    series
        .into_values()
        .flat_map(|mut members| {
            members.sort_by_key(|s| s.scaled.group.quarter);
            let index: Vec<f64> = members.iter().map(|s| s.index).collect();
            let deltas = momentum(&index);
            let smoothed = ema(&index, alpha);

            members
                .into_iter()
                .zip(deltas)
                .zip(smoothed)
                .map(|((scored, delta), smooth)| {
                    ScoredAggregate::from_scored(scored, delta, smooth, calculation_date)
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Orders the published table: newest quarter first, then highest index.
/// Remaining ties fall back to variant and cohort so output is stable.
pub fn sort_for_publication(rows: &mut [ScoredAggregate]) {
    rows.sort_by(|a, b| {
        b.quarter
            .cmp(&a.quarter)
            .then(b.mii_index.total_cmp(&a.mii_index))
            .then_with(|| a.variant_id.cmp(&b.variant_id))
            .then_with(|| a.cohort.cmp(&b.cohort))
    });
}

/// Compares each entity's index between two quarters.
///
/// Only entities present in both quarters appear. Entities whose baseline is
/// below the base floor are dropped; below the small-base threshold the change
/// is capped. `make_filter` keeps rows whose make contains it, ignoring case.
/// Rows come back sorted by change, largest first.
pub fn percent_change(
    rows: &[ScoredAggregate],
    baseline: Quarter,
    comparison: Quarter,
    rules: &PercentChangeRules,
    make_filter: Option<&str>,
) -> Vec<PercentChangeRow> {
    let in_quarter = |q: Quarter| {
        rows.iter()
            .filter(|r| r.quarter == q)
            .filter(|r| r.total_auctions >= rules.min_support)
            .map(|r| ((r.variant_id.as_str(), r.cohort.as_str()), r))
            .collect::<BTreeMap<_, _>>()
    };
    let base = in_quarter(baseline);
    let comp = in_quarter(comparison);
    let make_filter = make_filter.map(str::to_lowercase);

    let mut out: Vec<PercentChangeRow> = base
        .iter()
        .filter_map(|(key, b)| comp.get(key).map(|c| (*b, *c)))
        .filter(|(b, _)| b.mii_index >= rules.base_floor)
        .filter(|(b, _)| match &make_filter {
            Some(needle) => b.make.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .map(|(b, c)| {
            let mut pct = 100.0 * (c.mii_index - b.mii_index) / b.mii_index;
            if b.mii_index < rules.small_base_threshold {
                pct = pct.min(rules.small_base_cap);
            }
            PercentChangeRow {
                variant_id: b.variant_id.clone(),
                make: b.make.clone(),
                cohort: b.cohort.clone(),
                mii_baseline: b.mii_index,
                mii_comparison: c.mii_index,
                pct_change: pct,
            }
        })
        .collect();

    out.sort_by(|a, b| {
        b.pct_change
            .total_cmp(&a.pct_change)
            .then_with(|| a.variant_id.cmp(&b.variant_id))
    });
    out
}
