// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Opt-in, in-process observability.
//!
//! [`MetricsCollector`] is a process-wide singleton (via `once_cell`)
//! recording operation call counts and latency samples; [`aggregator`]
//! turns raw samples into percentile summaries. Nothing in the core calls
//! this module unless [`timed`] is used explicitly — a `Tree` built and
//! queried without ever touching `metrics` pays no cost beyond the
//! singleton's own lazy initialization, which never happens.

pub mod aggregator;
mod collector;

pub use aggregator::MetricStats;
pub use collector::MetricsCollector;

/// Runs `f`, recording its wall-clock duration under `operation` in the
/// global collector, and returns `f`'s result.
pub fn timed<R>(operation: &'static str, f: impl FnOnce() -> R) -> R {
    let start = std::time::Instant::now();
    let result = f();
    let micros = start.elapsed().as_secs_f64() * 1_000_000.0;
    MetricsCollector::global().record_duration(operation, micros);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_records_a_sample() {
        MetricsCollector::global().reset();
        let result = timed("test_op_mod", || 2 + 2);
        assert_eq!(result, 4);
        assert_eq!(MetricsCollector::global().count_for("test_op_mod"), 1);
    }
}
