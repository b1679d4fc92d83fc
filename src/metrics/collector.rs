// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! In-process operation metrics: a global collector recording per-operation
//! timing samples, read back as aggregated [`super::aggregator::MetricStats`].
//!
//! There is no file persistence here (this crate has no project directory
//! to write a CSV into, unlike the teacher's storage engine) — the
//! collector lives only for the process's lifetime and is primarily a hook
//! for embedding applications and tests that want to assert on call counts
//! or latency distributions.

use super::aggregator::{calculate_stats, MetricStats};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;

static COLLECTOR: Lazy<MetricsCollector> = Lazy::new(MetricsCollector::new);

/// Per-operation timing samples and call counts, guarded by a pair of
/// mutexes rather than one combined lock so a reader of counts never
/// blocks a concurrent writer of samples (or vice versa).
pub struct MetricsCollector {
    samples: Mutex<HashMap<&'static str, Vec<f64>>>,
    counters: Mutex<HashMap<&'static str, u64>>,
}

impl MetricsCollector {
    fn new() -> Self {
        Self {
            samples: Mutex::new(HashMap::new()),
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide singleton.
    pub fn global() -> &'static MetricsCollector {
        &COLLECTOR
    }

    /// Records one timing sample (in microseconds) for `operation`.
    pub fn record_duration(&self, operation: &'static str, micros: f64) {
        self.samples.lock().unwrap().entry(operation).or_default().push(micros);
        *self.counters.lock().unwrap().entry(operation).or_insert(0) += 1;
    }

    /// Aggregated statistics for `operation`, or `None` if it was never
    /// recorded.
    pub fn stats_for(&self, operation: &str) -> Option<MetricStats> {
        let samples = self.samples.lock().unwrap();
        samples.get(operation).and_then(|v| calculate_stats(v))
    }

    /// Total number of recorded calls for `operation`.
    pub fn count_for(&self, operation: &str) -> u64 {
        self.counters.lock().unwrap().get(operation).copied().unwrap_or(0)
    }

    /// Clears every recorded sample and counter. Mainly useful in tests
    /// that assert on an exact count against the shared global instance.
    pub fn reset(&self) {
        self.samples.lock().unwrap().clear();
        self.counters.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_read_back() {
        let collector = MetricsCollector::new();
        collector.record_duration("op_a", 1.0);
        collector.record_duration("op_a", 3.0);
        assert_eq!(collector.count_for("op_a"), 2);
        let stats = collector.stats_for("op_a").unwrap();
        assert_eq!(stats.mean, 2.0);
    }

    #[test]
    fn test_unknown_operation_has_no_stats() {
        let collector = MetricsCollector::new();
        assert!(collector.stats_for("never_called").is_none());
        assert_eq!(collector.count_for("never_called"), 0);
    }

    #[test]
    fn test_reset_clears_state() {
        let collector = MetricsCollector::new();
        collector.record_duration("op_b", 5.0);
        collector.reset();
        assert_eq!(collector.count_for("op_b"), 0);
    }
}
