use std::collections::BTreeMap;

use crate::analyzers::types::{Metric, MetricSet, ScaledGroup, ScoredGroup};
use crate::analyzers::utility::partition;
use tracing::debug;

/// Index given to every member of a quarter whose scores are all equal.
pub const DEGENERATE_INDEX: f64 = 50.0;

/// Weighted mean of the z-scores that are present.
///
/// Metrics with no weight or no z-score contribute nothing to either the sum
/// or the divisor. Returns 0.0 when nothing contributes.
pub fn composite_score(z: &MetricSet<Option<f64>>, weights: &BTreeMap<Metric, f64>) -> f64 {
    let (weighted_total, weight_sum) = weights
        .iter()
        .filter_map(|(metric, w)| z[*metric].map(|score| (score * w, *w)))
        .fold((0.0, 0.0), |(total, sum), (ws, w)| (total + ws, sum + w));

    if weight_sum == 0.0 {
        0.0
    } else {
        weighted_total / weight_sum
    }
}

/// Min-max scales scores onto `[0, 100]`; equal scores all map to [`DEGENERATE_INDEX`].
pub fn index_scores(scores: &[f64]) -> Vec<f64> {
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if !(max > min) {
        return vec![DEGENERATE_INDEX; scores.len()];
    }
    scores
        .iter()
        .map(|s| (100.0 * (s - min) / (max - min)).clamp(0.0, 100.0))
        .collect()
}

/// Competition ranks, highest value first. Ties share the lowest rank of
/// their block, so `[9, 7, 7, 3]` ranks as `[1, 2, 2, 4]`.
pub fn rank_descending(values: &[f64]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let mut ranks = vec![0u32; values.len()];
    for (position, &i) in order.iter().enumerate() {
        ranks[i] = match position {
            0 => 1,
            _ if values[i] == values[order[position - 1]] => ranks[order[position - 1]],
            _ => position as u32 + 1,
        };
    }
    ranks
}

/// Scores every group, then indexes and ranks within each quarter.
#[tracing::instrument(skip_all, fields(groups = scaled.len()))]
pub fn score_groups(scaled: Vec<ScaledGroup>, weights: &BTreeMap<Metric, f64>) -> Vec<ScoredGroup> {
    let quarters = partition(scaled, |s| s.group.quarter);
    debug!(quarters = quarters.len(), "Indexing per quarter");

    quarters
        .into_values()
        .flat_map(|members| {
            let scores: Vec<f64> = members
                .iter()
                .map(|s| composite_score(&s.z, weights))
                .collect();
            let index = index_scores(&scores);
            let ranks = rank_descending(&index);

            members
                .into_iter()
                .zip(scores)
                .zip(index)
                .zip(ranks)
                .map(|(((scaled, score), index), rank)| ScoredGroup {
                    scaled,
                    score,
                    index,
                    rank,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
