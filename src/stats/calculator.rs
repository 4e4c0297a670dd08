//! Statistics Calculator Module
//! Percentile ranks and summary statistics of an attribute's distribution.

use statrs::statistics::Statistics;

/// Percentile points drawn as reference lines on the percentile chart.
pub const QUARTILE_POINTS: [f64; 5] = [0.0, 25.0, 50.0, 75.0, 100.0];

/// Summary of a reference distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Values at 0/25/50/75/100 percent, see [`QUARTILE_POINTS`].
    pub quartiles: [f64; 5],
}

impl Default for DistributionSummary {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            quartiles: [f64::NAN; 5],
        }
    }
}

/// Handles statistical calculations over an attribute's values.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Percentile rank of `value` against an ascending reference distribution.
    ///
    /// Uses the count-below convention: the share of reference values strictly
    /// less than `value`, times 100. Ties are not counted, so the minimum ranks
    /// 0 and the maximum ranks at most `(n - 1) / n * 100`. Returns `None` for
    /// an empty distribution.
    pub fn percentile_rank(sorted_reference: &[f64], value: f64) -> Option<f64> {
        if sorted_reference.is_empty() {
            return None;
        }
        let below = sorted_reference.partition_point(|&v| v < value);
        Some(below as f64 / sorted_reference.len() as f64 * 100.0)
    }

    /// Compute summary statistics for an ascending set of values.
    pub fn summarize(sorted_values: &[f64]) -> DistributionSummary {
        let n = sorted_values.len();
        if n == 0 {
            return DistributionSummary::default();
        }

        let std = if n > 1 { sorted_values.std_dev() } else { 0.0 };

        DistributionSummary {
            count: n,
            mean: sorted_values.mean(),
            std,
            min: sorted_values[0],
            max: sorted_values[n - 1],
            quartiles: QUARTILE_POINTS.map(|p| Self::percentile(sorted_values, p)),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Sort values ascending (total order, NaN last).
    pub fn sorted(mut values: Vec<f64>) -> Vec<f64> {
        values.sort_by(f64::total_cmp);
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn rank_counts_strictly_lower_values() {
        let reference = [10.0, 20.0, 30.0];
        assert_close(StatsCalculator::percentile_rank(&reference, 10.0).unwrap(), 0.0);
        assert_close(
            StatsCalculator::percentile_rank(&reference, 20.0).unwrap(),
            100.0 / 3.0,
        );
        assert_close(
            StatsCalculator::percentile_rank(&reference, 30.0).unwrap(),
            200.0 / 3.0,
        );
    }

    #[test]
    fn ties_are_not_counted_below() {
        let reference = [5.0, 5.0, 5.0, 8.0];
        assert_close(StatsCalculator::percentile_rank(&reference, 5.0).unwrap(), 0.0);
        assert_close(StatsCalculator::percentile_rank(&reference, 8.0).unwrap(), 75.0);
    }

    #[test]
    fn empty_distribution_has_no_rank() {
        assert_eq!(StatsCalculator::percentile_rank(&[], 1.0), None);
    }

    #[test]
    fn sole_value_ranks_zero() {
        assert_close(StatsCalculator::percentile_rank(&[42.0], 42.0).unwrap(), 0.0);
    }

    #[test]
    fn rank_stays_in_bounds_and_is_monotone() {
        let reference = StatsCalculator::sorted(vec![3.5, -1.0, 7.25, 7.25, 0.0, 12.0, 4.0]);
        let n = reference.len() as f64;
        let mut previous = -1.0;
        for step in -20..=140 {
            let value = f64::from(step) / 10.0;
            let rank = StatsCalculator::percentile_rank(&reference, value).unwrap();
            assert!((0.0..=100.0).contains(&rank));
            assert!(rank >= previous);
            previous = rank;
        }
        let max_rank = StatsCalculator::percentile_rank(&reference, 12.0).unwrap();
        assert_close(max_rank, (n - 1.0) / n * 100.0);
    }

    #[test]
    fn interpolated_percentiles_match_numpy() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_close(StatsCalculator::percentile(&values, 0.0), 1.0);
        assert_close(StatsCalculator::percentile(&values, 25.0), 1.75);
        assert_close(StatsCalculator::percentile(&values, 50.0), 2.5);
        assert_close(StatsCalculator::percentile(&values, 100.0), 4.0);
    }

    #[test]
    fn summary_of_reference_distribution() {
        let summary = StatsCalculator::summarize(&[10.0, 20.0, 30.0]);
        assert_eq!(summary.count, 3);
        assert_close(summary.mean, 20.0);
        assert_close(summary.std, 10.0);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 30.0);
        assert_eq!(summary.quartiles, [10.0, 15.0, 20.0, 25.0, 30.0]);
    }

    #[test]
    fn summary_of_nothing_is_nan() {
        let summary = StatsCalculator::summarize(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.mean.is_nan());
    }
}
