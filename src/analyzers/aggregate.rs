use crate::analyzers::types::{GroupAggregate, Metric, MetricSet};
use crate::analyzers::utility::{mean, partition};
use crate::records::CanonicalRecord;
use crate::signal::SignalEstimator;
use tracing::debug;

/// Groups canonical records by (quarter, cohort, make, variant) and averages
/// their metrics.
///
/// Sale amount averages only the positive amounts present (0 when none).
/// Year and car age come from the group's first record; the social estimate
/// is looked up by variant key.
#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn group_records(
    records: &[CanonicalRecord],
    estimator: &SignalEstimator,
) -> Vec<GroupAggregate> {
    let groups = partition(records.iter().collect(), |r: &&CanonicalRecord| {
        (
            r.quarter,
            r.cohort,
            r.make.clone(),
            r.variant_key.clone(),
        )
    });

    let aggregates: Vec<GroupAggregate> = groups
        .into_iter()
        .map(|((quarter, cohort, make, variant_key), members)| {
            let first = members[0];
            let series = |f: fn(&CanonicalRecord) -> f64| -> Vec<f64> {
                members.iter().map(|r| f(r)).collect()
            };

            let amounts: Vec<f64> = members
                .iter()
                .filter_map(|r| r.sale_amount)
                .filter(|a| *a > 0)
                .map(|a| a as f64)
                .collect();

            let mut metrics = MetricSet::<f64>::default();
            metrics[Metric::Views] = mean(&series(|r| r.views as f64));
            metrics[Metric::Bids] = mean(&series(|r| r.bids as f64));
            metrics[Metric::Comments] = mean(&series(|r| r.comments as f64));
            metrics[Metric::SaleAmount] = mean(&amounts);
            metrics[Metric::TotalAuctions] = members.len() as f64;
            metrics[Metric::CarAge] = first.car_age as f64;
            metrics[Metric::SocialEstimate] = estimator.estimate(&variant_key);

            GroupAggregate {
                make,
                quarter,
                cohort: cohort.to_string(),
                model_family: first.model_family.clone(),
                generation: first.generation.clone(),
                year: first.year,
                metrics,
                variant_key,
            }
        })
        .collect();

    debug!(groups = aggregates.len(), "Records grouped");
    aggregates
}
