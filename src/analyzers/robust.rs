//! Outlier-resistant scaling: percentile winsorizing and median/MAD z-scores.

use crate::analyzers::types::{GroupAggregate, Metric, MetricSet, ScaledGroup};
use crate::analyzers::utility::{mean, median, partition, quantile, sample_stddev};
use crate::config::MiiConfig;
use tracing::debug;

/// The `[lo, hi]` quantile band of `values`, or `None` for empty input.
pub fn percentile_bounds(values: &[f64], lo: f64, hi: f64) -> Option<(f64, f64)> {
    Some((quantile(values, lo)?, quantile(values, hi)?))
}

/// Clips every value to the group's `[lo, hi]` quantile band.
pub fn winsorize(values: &[f64], lo: f64, hi: f64) -> Vec<f64> {
    match percentile_bounds(values, lo, hi) {
        Some((low, high)) => values.iter().map(|v| v.clamp(low, high)).collect(),
        None => Vec::new(),
    }
}

/// Median/MAD z-scores.
///
/// When the MAD is zero the standard z-score is used instead, and when the
/// standard deviation is also zero every score is zero.
pub fn robust_z(values: &[f64]) -> Vec<f64> {
    let Some(med) = median(values) else {
        return Vec::new();
    };
    let deviations: Vec<f64> = values.iter().map(|v| (v - med).abs()).collect();
    let mad = median(&deviations).unwrap_or(0.0);

    if mad != 0.0 {
        return values.iter().map(|v| (v - med) / mad).collect();
    }

    let avg = mean(values);
    let sd = sample_stddev(values, avg);
    if sd == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - avg) / sd).collect()
}

/// Bounds a z-score to `[-cap, cap]`. Non-finite scores become `None`.
pub fn cap_z(z: f64, cap: f64) -> Option<f64> {
    z.is_finite().then(|| z.clamp(-cap, cap))
}

/// Winsorizes and z-scores each metric within its (quarter, cohort) group.
///
/// Groups are processed independently; the output is in group-key order.
#[tracing::instrument(skip_all, fields(groups = groups.len()))]
pub fn scale_groups(groups: Vec<GroupAggregate>, config: &MiiConfig) -> Vec<ScaledGroup> {
    let partitions = partition(groups, |g| (g.quarter, g.cohort.clone()));
    debug!(partitions = partitions.len(), "Scaling within quarter/cohort");

    partitions
        .into_values()
        .flat_map(|members| scale_partition(members, config))
        .collect()
}

fn column(rows: &[MetricSet<f64>], metric: Metric) -> Vec<f64> {
    rows.iter().map(|m| m[metric]).collect()
}

fn scale_partition(members: Vec<GroupAggregate>, config: &MiiConfig) -> Vec<ScaledGroup> {
    let raw: Vec<MetricSet<f64>> = members.iter().map(|g| g.metrics).collect();
    let mut winsorized = raw.clone();
    for metric in Metric::WINSORIZED {
        let clipped = winsorize(&column(&raw, metric), config.winsor_lo, config.winsor_hi);
        for (row, value) in winsorized.iter_mut().zip(clipped) {
            row[metric] = value;
        }
    }

    let mut z = vec![MetricSet::<Option<f64>>::default(); members.len()];
    for metric in Metric::ALL {
        let scores = robust_z(&column(&winsorized, metric));
        for (row, score) in z.iter_mut().zip(scores) {
            row[metric] = cap_z(score, config.z_cap);
        }
    }

    members
        .into_iter()
        .zip(winsorized)
        .zip(z)
        .map(|((group, winsorized), z)| ScaledGroup {
            group,
            winsorized,
            z,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quarter::Quarter;

    fn group(variant: &str, cohort: &str, views: f64) -> GroupAggregate {
        let mut metrics = MetricSet::<f64>::default();
        metrics[Metric::Views] = views;
        metrics[Metric::Bids] = views / 10.0;
        metrics[Metric::TotalAuctions] = 1.0;
        GroupAggregate {
            make: "BMW".into(),
            variant_key: variant.into(),
            quarter: Quarter::new(2025, 1).unwrap(),
            cohort: cohort.into(),
            model_family: "M3".into(),
            generation: "GEN_OTHER".into(),
            year: None,
            metrics,
        }
    }

    #[test]
    fn test_winsorize_stays_within_bounds() {
        let values: Vec<f64> = (1..=40).map(f64::from).chain([10_000.0]).collect();
        let (lo, hi) = percentile_bounds(&values, 0.025, 0.975).unwrap();
        let clipped = winsorize(&values, 0.025, 0.975);
        assert_eq!(clipped.len(), values.len());
        assert!(clipped.iter().all(|v| *v >= lo && *v <= hi));
        assert!(*clipped.last().unwrap() < 10_000.0);
    }

    #[test]
    fn test_winsorize_empty() {
        assert!(winsorize(&[], 0.025, 0.975).is_empty());
    }

    #[test]
    fn test_robust_z_median_mad() {
        let z = robust_z(&[1.0, 2.0, 3.0, 4.0, 100.0]);
        // median 3, MAD 1
        assert_eq!(z, vec![-2.0, -1.0, 0.0, 1.0, 97.0]);
    }

    #[test]
    fn test_robust_z_zero_mad_uses_std() {
        let z = robust_z(&[5.0, 5.0, 5.0, 8.0]);
        let sd = sample_stddev(&[5.0, 5.0, 5.0, 8.0], 5.75);
        assert!((z[3] - 2.25 / sd).abs() < 1e-12);
        assert!((z[0] + 0.75 / sd).abs() < 1e-12);
    }

    #[test]
    fn test_robust_z_constant_is_zero() {
        assert_eq!(robust_z(&[3.0, 3.0, 3.0]), vec![0.0; 3]);
        assert_eq!(robust_z(&[3.0]), vec![0.0]);
        assert!(robust_z(&[]).is_empty());
    }

    #[test]
    fn test_cap_z() {
        assert_eq!(cap_z(97.0, 4.0), Some(4.0));
        assert_eq!(cap_z(-12.0, 4.0), Some(-4.0));
        assert_eq!(cap_z(1.5, 4.0), Some(1.5));
        assert_eq!(cap_z(f64::NAN, 4.0), None);
    }

    #[test]
    fn test_scale_groups_caps_and_separates_cohorts() {
        let groups = vec![
            group("a", "2015+", 10.0),
            group("b", "2015+", 20.0),
            group("c", "2015+", 30.0),
            group("d", "2015+", 40.0),
            group("e", "2015+", 100_000.0),
            group("f", "Pre-1970", 7.0),
        ];
        let scaled = scale_groups(groups, &MiiConfig::default());
        assert_eq!(scaled.len(), 6);

        for s in &scaled {
            for (_, z) in s.z.iter() {
                let z = z.unwrap();
                assert!((-4.0..=4.0).contains(&z));
            }
        }

        // A singleton cohort scores zero on every metric.
        let lone = scaled.iter().find(|s| s.group.variant_key == "f").unwrap();
        assert!(lone.z.iter().all(|(_, z)| *z == Some(0.0)));
    }

    #[test]
    fn test_unwinsorized_metrics_pass_through() {
        let mut groups: Vec<_> = (0..5).map(|i| group(&i.to_string(), "2015+", 10.0)).collect();
        groups[4].metrics[Metric::TotalAuctions] = 500.0;
        let scaled = scale_groups(groups, &MiiConfig::default());
        let big = scaled.iter().find(|s| s.group.variant_key == "4").unwrap();
        assert_eq!(big.winsorized[Metric::TotalAuctions], 500.0);
    }
}
