// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Percentile and statistical aggregation for recorded operation timings.
//!
//! ## Performance
//! - `calculate_stats`/`percentile`: O(n log n) due to sorting.
//! - Accepts `&[f64]` for zero-copy operation over whatever sample buffer
//!   the collector hands it.

/// Statistical summary of a set of timing samples, in microseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricStats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub stddev: f64,
}

/// Calculates complete statistics for a set of values.
///
/// ## Returns
/// - `Some(MetricStats)`: Statistical summary.
/// - `None`: If `values` is empty.
///
/// ## Example
/// ```
/// use suffixdex::metrics::aggregator::calculate_stats;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let stats = calculate_stats(&values).unwrap();
/// assert_eq!(stats.mean, 3.0);
/// assert_eq!(stats.p50, 3.0);
/// ```
pub fn calculate_stats(values: &[f64]) -> Option<MetricStats> {
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let sum: f64 = values.iter().sum();
    let mean = sum / count as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let min = sorted[0];
    let max = sorted[count - 1];
    let p50 = percentile(&sorted, 50.0);
    let p95 = percentile(&sorted, 95.0);
    let p99 = percentile(&sorted, 99.0);

    let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
    let stddev = variance.sqrt();

    Some(MetricStats {
        count,
        sum,
        mean,
        min,
        max,
        p50,
        p95,
        p99,
        stddev,
    })
}

/// Interpolated percentile of a pre-sorted (ascending) slice.
pub fn percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }

    let index = (percentile / 100.0) * (sorted_values.len() - 1) as f64;
    let lower_index = index.floor() as usize;
    let upper_index = index.ceil() as usize;

    if lower_index == upper_index {
        sorted_values[lower_index]
    } else {
        let lower_value = sorted_values[lower_index];
        let upper_value = sorted_values[upper_index];
        let fraction = index - lower_index as f64;
        lower_value + (upper_value - lower_value) * fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_stats_basic() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = calculate_stats(&values).unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.p50, 3.0);
    }

    #[test]
    fn test_empty_values_yield_none() {
        assert!(calculate_stats(&[]).is_none());
    }

    #[test]
    fn test_percentile_single_value() {
        assert_eq!(percentile(&[7.0], 95.0), 7.0);
    }
}
