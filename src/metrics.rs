//! # Throughput and Latency Aggregation
//!
//! Turns trimmed experiment data into the numbers that get reported:
//!
//! - **Throughput**: completed operations per second over the observation
//!   window, summed across workers.
//! - **Percentiles**: exact order statistics over a sorted latency pool, with
//!   `index = floor(n * p / 100)` clamped to the last sample.
//!
//! Raw timestamps stay `u64` nanoseconds end to end. Only the final rate is a
//! double, which is ample precision for reporting. Unit conversion for latency
//! pools is an explicit step ([`convert_nanos`]) that happens before
//! percentile computation, so [`percentiles`] itself is unit-agnostic.

use crate::defaults::NANOS_PER_SECOND;
use crate::error::{AnalysisError, Result};
use crate::series::ExperimentSample;
use crate::window::{find_window, trim, WarmupFraction, Window};
use clap::ValueEnum;
use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Throughput over one experiment's observation window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThroughputMetrics {
    pub workers: usize,
    pub window: Window,
    pub warmup: WarmupFraction,
    pub total_ops: usize,
    /// Window length after warmup, fractional when the warmup offset is.
    pub elapsed_ns: f64,
    pub ops_per_second: f64,
}

/// Detect the window, trim to it and compute the aggregate rate.
pub fn throughput_metrics(
    sample: &ExperimentSample,
    warmup: WarmupFraction,
) -> Result<ThroughputMetrics> {
    let window = find_window(sample, warmup)?;
    let trimmed = trim(sample, &window);
    let total_ops = trimmed.total_ops();

    // zero only when the overlap itself is a single instant
    let elapsed_ns = window.elapsed_ns();
    if elapsed_ns <= 0.0 {
        return Err(AnalysisError::ZeroDuration { at: window.end() });
    }

    let ops_per_second = total_ops as f64 * NANOS_PER_SECOND as f64 / elapsed_ns;
    debug!(total_ops, elapsed_ns, ops_per_second, "computed throughput");

    Ok(ThroughputMetrics {
        workers: sample.num_workers(),
        window,
        warmup,
        total_ops,
        elapsed_ns,
        ops_per_second,
    })
}

/// Aggregate operations per second across all workers.
pub fn throughput(sample: &ExperimentSample, warmup: WarmupFraction) -> Result<f64> {
    throughput_metrics(sample, warmup).map(|m| m.ops_per_second)
}

/// Unit a latency pool is reported in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum TimeUnit {
    #[clap(name = "ns")]
    Nanoseconds,

    #[clap(name = "us")]
    Microseconds,

    #[default]
    #[clap(name = "ms")]
    Milliseconds,
}

impl TimeUnit {
    pub fn nanos_per_unit(self) -> u64 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
        }
    }

    /// Whole units in `ns`, rounded down.
    pub fn from_nanos(self, ns: u64) -> u64 {
        ns / self.nanos_per_unit()
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "ns",
            TimeUnit::Microseconds => "μs",
            TimeUnit::Milliseconds => "ms",
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Convert a nanosecond pool to `unit`.
pub fn convert_nanos(values: &[u64], unit: TimeUnit) -> Vec<u64> {
    values.iter().map(|&ns| unit.from_nanos(ns)).collect()
}

/// Percentile value pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileValue<T = u64> {
    pub percentile: f64,
    pub value: T,
}

/// Requested ranks and their values, in the order they were requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileReport<T = u64> {
    pub values: Vec<PercentileValue<T>>,
}

impl<T> Default for PercentileReport<T> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<T: Copy> PercentileReport<T> {
    /// Value for `rank`, if it was requested.
    pub fn get(&self, rank: f64) -> Option<T> {
        self.values
            .iter()
            .find(|p| p.percentile == rank)
            .map(|p| p.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PercentileValue<T>> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Exact percentiles of `values` at each rank in `ranks`.
///
/// The pool is fully sorted first. For rank `p` over `n` samples the value is
/// the element at `floor(n * p / 100)`, clamped to `n - 1`. Ranks must lie in
/// the open interval `(0, 100)`.
pub fn percentiles<T: Ord + Copy>(values: &[T], ranks: &[f64]) -> Result<PercentileReport<T>> {
    if values.is_empty() {
        return Err(AnalysisError::InsufficientSamples);
    }
    if let Some(&rank) = ranks.iter().find(|&&r| !(r > 0.0 && r < 100.0)) {
        return Err(AnalysisError::InvalidPercentile { rank });
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let values = ranks
        .iter()
        .map(|&p| PercentileValue {
            percentile: p,
            value: sorted[rank_index(sorted.len(), p)],
        })
        .collect();

    Ok(PercentileReport { values })
}

fn rank_index(len: usize, rank: f64) -> usize {
    let index = (len as f64 * rank / 100.0).floor() as usize;
    index.min(len - 1)
}

/// Sub-range of a flat latency pool used when per-worker series are not
/// available: skip the first quarter of samples, then keep 80% of what
/// remains, all in arrival order.
///
/// This is a weaker stand-in for [`find_window`]. It assumes startup and
/// teardown noise sit at the front and back of the recording, which the
/// overlap window establishes from the data instead. Use it only for pools
/// whose worker structure was lost.
pub fn heuristic_window(values: &[u64]) -> &[u64] {
    let skip = values.len() / 4;
    let remaining = values.len() - skip;
    let keep = remaining * 4 / 5;
    &values[skip..skip + keep]
}

/// Summary of one latency pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyMetrics {
    pub unit: TimeUnit,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub std_dev: f64,
    pub percentiles: PercentileReport,
    pub total_samples: usize,
}

/// Percentiles plus spread statistics for a pool already in `unit`.
///
/// Min and max are exact. Mean and standard deviation come from an HDR
/// histogram with 3 significant figures.
pub fn latency_metrics(values: &[u64], ranks: &[f64], unit: TimeUnit) -> Result<LatencyMetrics> {
    let percentiles = percentiles(values, ranks)?;

    let mut histogram =
        Histogram::<u64>::new(3).map_err(|e| AnalysisError::Histogram(e.to_string()))?;
    for &value in values {
        histogram
            .record(value)
            .map_err(|e| AnalysisError::Histogram(e.to_string()))?;
    }

    Ok(LatencyMetrics {
        unit,
        min: values.iter().copied().min().unwrap_or_default(),
        max: values.iter().copied().max().unwrap_or_default(),
        mean: histogram.mean(),
        std_dev: histogram.stdev(),
        percentiles,
        total_samples: values.len(),
    })
}

/// Human-readable rendering of metric values
pub mod utils {
    use super::TimeUnit;

    /// Format a latency value already expressed in `unit`.
    pub fn format_latency(value: u64, unit: TimeUnit) -> String {
        format!("{}{}", value, unit.suffix())
    }

    /// Format an operation rate for human-readable output
    pub fn format_throughput(ops_per_second: f64) -> String {
        if ops_per_second < 1_000.0 {
            format!("{:.2} ops/s", ops_per_second)
        } else if ops_per_second < 1_000_000.0 {
            format!("{:.2}K ops/s", ops_per_second / 1_000.0)
        } else if ops_per_second < 1_000_000_000.0 {
            format!("{:.2}M ops/s", ops_per_second / 1_000_000.0)
        } else {
            format!("{:.2}G ops/s", ops_per_second / 1_000_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::PERCENTILES;
    use std::time::Duration;

    fn scenario() -> ExperimentSample {
        ExperimentSample::new(vec![
            vec![0, 10, 20, 30],
            vec![5, 15, 25, 35],
            vec![2, 12, 22],
        ])
        .unwrap()
    }

    #[test]
    fn test_throughput_scenario() {
        let metrics = throughput_metrics(&scenario(), WarmupFraction::NONE).unwrap();
        assert_eq!(metrics.total_ops, 6);
        assert_eq!(metrics.elapsed_ns, 17.0);
        assert_eq!(metrics.workers, 3);

        let expected = 6.0 * 1e9 / 17.0;
        assert!((metrics.ops_per_second - expected).abs() < 1e-3);
        assert_eq!(metrics.ops_per_second.floor(), 352_941_176.0);
    }

    #[test]
    fn test_throughput_with_fractional_warmup() {
        // start 13.5, samples 20, 15 and 22 remain over 8.5ns
        let metrics = throughput_metrics(&scenario(), WarmupFraction::new(0.5).unwrap()).unwrap();
        assert_eq!(metrics.total_ops, 3);
        assert_eq!(metrics.elapsed_ns, 8.5);
        assert!((metrics.ops_per_second - 3.0e9 / 8.5).abs() < 1e-3);
        assert_eq!(metrics.ops_per_second.floor(), 352_941_176.0);
    }

    #[test]
    fn test_throughput_with_warmup_near_one() {
        // start 21.15: one sample left over 0.85ns
        let rate = throughput(&scenario(), WarmupFraction::new(0.95).unwrap()).unwrap();
        let expected = 1.0e9 / 0.85;
        assert!(((rate - expected) / expected).abs() < 1e-9);
    }

    #[test]
    fn test_throughput_zero_duration() {
        let sample = ExperimentSample::new(vec![vec![0, 10], vec![10, 20]]).unwrap();
        assert!(matches!(
            throughput(&sample, WarmupFraction::NONE),
            Err(AnalysisError::ZeroDuration { at: 10 })
        ));
    }

    #[test]
    fn test_throughput_no_overlap() {
        let sample = ExperimentSample::new(vec![vec![0, 1], vec![5, 6]]).unwrap();
        assert!(matches!(
            throughput(&sample, WarmupFraction::NONE),
            Err(AnalysisError::NoOverlap { .. })
        ));
    }

    #[test]
    fn test_throughput_scales_inversely_with_dilation() {
        let sample = scenario();
        let base = throughput(&sample, WarmupFraction::NONE).unwrap();
        for k in [2, 3, 10, 1_000] {
            let dilated = throughput(&sample.dilated(k).unwrap(), WarmupFraction::NONE).unwrap();
            let expected = base / k as f64;
            assert!(
                ((dilated - expected) / expected).abs() < 1e-9,
                "k={k}: {dilated} vs {expected}"
            );
        }
    }

    #[test]
    fn test_percentiles_scenario() {
        let values: Vec<u64> = (1..=10).map(|i| i * 100).collect();
        let report = percentiles(&values, PERCENTILES).unwrap();

        assert_eq!(report.get(1.0), Some(100));
        assert_eq!(report.get(5.0), Some(100));
        assert_eq!(report.get(50.0), Some(600));
        assert_eq!(report.get(95.0), Some(1000));
        assert_eq!(report.get(99.0), Some(1000));
        assert_eq!(report.get(75.0), None);
    }

    #[test]
    fn test_percentiles_sort_before_indexing() {
        let report = percentiles(&[500, 100, 300, 200, 400], &[50.0, 99.0]).unwrap();
        assert_eq!(report.get(50.0), Some(300));
        assert_eq!(report.get(99.0), Some(500));
    }

    #[test]
    fn test_percentiles_over_any_ordered_type() {
        let pool = [
            Duration::from_micros(300),
            Duration::from_micros(100),
            Duration::from_micros(200),
        ];
        let report = percentiles(&pool, &[50.0]).unwrap();
        assert_eq!(report.get(50.0), Some(Duration::from_micros(200)));

        let signed = percentiles(&[-3i64, 7, -10, 0], &[1.0, 99.0]).unwrap();
        assert_eq!(signed.get(1.0), Some(-10));
        assert_eq!(signed.get(99.0), Some(7));
    }

    #[test]
    fn test_percentiles_single_sample() {
        let report = percentiles(&[42], &[1.0, 50.0, 99.9]).unwrap();
        assert!(report.iter().all(|p| p.value == 42));
    }

    #[test]
    fn test_percentiles_reject_empty_pool_and_bad_ranks() {
        assert!(matches!(
            percentiles::<u64>(&[], &[50.0]),
            Err(AnalysisError::InsufficientSamples)
        ));
        for rank in [0.0, 100.0, -5.0, 150.0, f64::NAN] {
            assert!(matches!(
                percentiles(&[1, 2, 3], &[50.0, rank]),
                Err(AnalysisError::InvalidPercentile { .. })
            ));
        }
    }

    #[test]
    fn test_percentiles_keep_request_order() {
        let report = percentiles(&[1, 2, 3, 4], &[99.0, 1.0]).unwrap();
        assert_eq!(report.values[0].percentile, 99.0);
        assert_eq!(report.values[1].percentile, 1.0);
    }

    #[test]
    fn test_unit_conversion_floors() {
        let pool = convert_nanos(&[999_999, 1_000_000, 2_500_000], TimeUnit::Milliseconds);
        assert_eq!(pool, vec![0, 1, 2]);
        assert_eq!(TimeUnit::Microseconds.from_nanos(1_999), 1);
        assert_eq!(TimeUnit::Nanoseconds.from_nanos(7), 7);
    }

    #[test]
    fn test_heuristic_window_bounds() {
        let values: Vec<u64> = (0..100).collect();
        let kept = heuristic_window(&values);
        // skip 25, keep 80% of 75 = 60
        assert_eq!(kept.len(), 60);
        assert_eq!(kept.first(), Some(&25));
        assert_eq!(kept.last(), Some(&84));

        assert!(heuristic_window(&[]).is_empty());
        assert!(heuristic_window(&[7]).is_empty());
        assert_eq!(heuristic_window(&[1, 2, 3, 4, 5, 6, 7, 8]), &[3, 4, 5, 6]);
    }

    #[test]
    fn test_latency_metrics_summary() {
        let values: Vec<u64> = (1..=10).map(|i| i * 100).collect();
        let metrics = latency_metrics(&values, PERCENTILES, TimeUnit::Milliseconds).unwrap();

        assert_eq!(metrics.min, 100);
        assert_eq!(metrics.max, 1000);
        assert_eq!(metrics.total_samples, 10);
        assert!((metrics.mean - 550.0).abs() < 1.0);
        assert!(metrics.std_dev > 0.0);
        assert_eq!(metrics.percentiles.get(50.0), Some(600));
    }

    #[test]
    fn test_format_throughput() {
        assert_eq!(utils::format_throughput(500.0), "500.00 ops/s");
        assert_eq!(utils::format_throughput(1_500.0), "1.50K ops/s");
        assert_eq!(utils::format_throughput(1_500_000.0), "1.50M ops/s");
        assert_eq!(utils::format_throughput(1_500_000_000.0), "1.50G ops/s");
    }

    #[test]
    fn test_format_latency() {
        assert_eq!(utils::format_latency(12, TimeUnit::Milliseconds), "12ms");
        assert_eq!(utils::format_latency(12, TimeUnit::Nanoseconds), "12ns");
    }
}
