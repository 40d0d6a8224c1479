//! End-to-end scoring run over one snapshot of raw records.

use crate::analyzers::aggregate::group_records;
use crate::analyzers::robust::scale_groups;
use crate::analyzers::score::score_groups;
use crate::analyzers::temporal::{apply_temporal, sort_for_publication};
use crate::analyzers::types::ScoredAggregate;
use crate::config::MiiConfig;
use crate::normalize::{NormalizeReport, normalize_all};
use crate::records::{ProcessingContext, RawRecord};
use crate::signal::SignalEstimator;
use tracing::info;

/// Scored table plus the normalization tally that produced it.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub rows: Vec<ScoredAggregate>,
    pub report: NormalizeReport,
}

/// Normalizes, groups, scales, scores and smooths a snapshot.
///
/// The result depends only on `raws`, `config` and `ctx`; the same inputs
/// always yield the same rows in the same order.
#[tracing::instrument(skip_all, fields(records = raws.len()))]
pub fn run_pipeline(
    raws: &[RawRecord],
    config: &MiiConfig,
    ctx: &ProcessingContext,
) -> PipelineOutput {
    let (records, report) = normalize_all(raws, config, ctx);

    let estimator = SignalEstimator::new(config.social_discount);
    let groups = group_records(&records, &estimator);
    let scaled = scale_groups(groups, config);
    let scored = score_groups(scaled, &config.weights);
    let mut rows = apply_temporal(scored, config.ema_alpha, &ctx.calculation_date());
    sort_for_publication(&mut rows);

    info!(
        rows = rows.len(),
        accepted = report.accepted,
        rejected = report.total_rejected(),
        "Scoring run complete"
    );
    PipelineOutput { rows, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::DataSource;
    use chrono::{TimeZone, Utc};

    fn ctx() -> ProcessingContext {
        ProcessingContext::new(Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap())
    }

    fn raw(model: &str, date: &str, views: &str, bids: &str) -> RawRecord {
        let mut r = RawRecord::new(DataSource::BringATrailer);
        r.model = Some(model.into());
        r.scraped_date = Some(date.into());
        r.views = Some(views.into());
        r.bids = Some(bids.into());
        r
    }

    #[test]
    fn test_empty_snapshot_yields_empty_table() {
        let out = run_pipeline(&[], &MiiConfig::default(), &ctx());
        assert!(out.rows.is_empty());
        assert_eq!(out.report.accepted, 0);
    }

    #[test]
    fn test_single_entity_quarter_is_degenerate() {
        let raws = vec![raw("2015 BMW M3", "2025-04-10", "3000", "40")];
        let out = run_pipeline(&raws, &MiiConfig::default(), &ctx());
        assert_eq!(out.rows.len(), 1);
        let row = &out.rows[0];
        assert_eq!(row.mii_index, 50.0);
        assert_eq!(row.quarter_rank, 1);
        assert_eq!(row.mii_momentum, None);
        assert_eq!(row.mii_smoothed, 50.0);
        assert_eq!(row.calculation_date, "2025-09-01 12:00:00");
    }

    #[test]
    fn test_series_momentum_across_quarters() {
        let raws = vec![
            raw("2015 BMW M3", "2025-04-10", "3000", "40"),
            raw("2016 BMW M4", "2025-04-12", "900", "10"),
            raw("2015 BMW M3", "2025-07-10", "500", "5"),
            raw("2016 BMW M4", "2025-07-12", "5000", "60"),
        ];
        let out = run_pipeline(&raws, &MiiConfig::default(), &ctx());
        assert_eq!(out.rows.len(), 4);

        // Newest quarter first.
        assert_eq!(out.rows[0].quarter.to_string(), "2025Q3");
        assert_eq!(out.rows[3].quarter.to_string(), "2025Q2");

        let m3_q3 = out
            .rows
            .iter()
            .find(|r| r.variant_id == "BMW M3 GEN_OTHER" && r.quarter.to_string() == "2025Q3")
            .unwrap();
        let m3_q2 = out
            .rows
            .iter()
            .find(|r| r.variant_id == "BMW M3 GEN_OTHER" && r.quarter.to_string() == "2025Q2")
            .unwrap();
        assert_eq!(m3_q2.mii_momentum, None);
        assert_eq!(m3_q3.mii_momentum, Some(m3_q3.mii_index - m3_q2.mii_index));
        let expected = 0.7 * m3_q3.mii_index + 0.3 * m3_q2.mii_index;
        assert!((m3_q3.mii_smoothed - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rerun_is_identical() {
        let raws = vec![
            raw("2015 BMW M3", "2025-04-10", "3000", "40"),
            raw("1973 Porsche 911", "2025-04-11", "8000", "70"),
            raw("2014 Mercedes-Benz SL63 AMG", "2025-05-02", "1200", "22"),
        ];
        let a = run_pipeline(&raws, &MiiConfig::default(), &ctx());
        let b = run_pipeline(&raws, &MiiConfig::default(), &ctx());
        assert_eq!(a.rows, b.rows);
    }
}
