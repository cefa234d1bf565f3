// Nearest-rank-by-truncation over an unordered set of readings.

use crate::models::{Percentile, PercentileOutcome, Sample};

/// Zero-based index `floor(p * n / 100)`, clamped to `n - 1`. `n` must be > 0.
pub fn rank_index(percentile: Percentile, count: usize) -> usize {
    debug_assert!(count > 0);
    let raw = percentile.get() as usize * count / 100;
    raw.min(count - 1)
}

/// Sorts values ascending (total order, stable so ties keep retrieval order) and picks
/// the value at `rank_index`. Empty input yields `NoData`.
pub fn percentile_of(samples: &[Sample], percentile: Percentile) -> PercentileOutcome {
    if samples.is_empty() {
        return PercentileOutcome::NoData;
    }
    let mut values: Vec<f64> = samples.iter().map(|s| s.value).collect();
    values.sort_by(f64::total_cmp);
    PercentileOutcome::Value(values[rank_index(percentile, values.len())])
}
