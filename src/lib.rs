//! # Pronghorn Bench Analysis Library
//!
//! The data reduction layer for distributed controller experiments. Experiment
//! nodes record a timestamp for every completed operation, one series per
//! worker thread; this library turns those raw series into throughput and
//! percentile-latency figures.
//!
//! ## Pipeline
//!
//! **Ingest** → **Window Detection** → **Trim/Warmup Exclusion** → **Aggregate**
//!
//! - `ingest`: parse result files into per-worker series (always re-sorted)
//! - `window`: find the span during which every worker was active, drop a
//!   warmup fraction from its front, and trim series to it
//! - `metrics`: throughput over the trimmed window, exact percentiles over
//!   latency pools
//!
//! Every step is a pure, synchronous function of its inputs. Independent
//! result files can be analyzed in parallel (see `analysis::analyze_files`).
//!
//! ## Usage Example
//!
//! ```rust
//! use pronghorn_bench::{find_window, percentiles, throughput, ExperimentSample, WarmupFraction};
//!
//! # fn main() -> Result<(), pronghorn_bench::AnalysisError> {
//! let sample = ExperimentSample::new(vec![
//!     vec![0, 10, 20, 30],
//!     vec![5, 15, 25, 35],
//!     vec![2, 12, 22],
//! ])?;
//!
//! let window = find_window(&sample, WarmupFraction::NONE)?;
//! assert_eq!((window.start(), window.end()), (5, 22));
//!
//! let rate = throughput(&sample, WarmupFraction::NONE)?;
//! assert!((rate - 6.0e9 / 17.0).abs() < 1e-3);
//!
//! let report = percentiles(&[100, 200, 300, 400, 500, 600, 700, 800, 900, 1000], &[50.0])?;
//! assert_eq!(report.get(50.0), Some(600));
//! # Ok(())
//! # }
//! ```

/// Per-file analysis pipelines and parallel batch analysis
pub mod analysis;

/// Command-line interface and validated analysis configuration
///
/// Provides argument parsing using clap and converts the raw options into
/// an `AnalysisConfig` with typed, range-checked values.
pub mod cli;

/// Error taxonomy for the analysis pipeline
pub mod error;

/// Typed descriptions of experiment runs and the explicit run context
pub mod experiment;

/// Result file parsing
pub mod ingest;

pub mod logging;

/// Throughput and percentile aggregation
///
/// Exact order statistics for percentiles, HDR histograms for spread, and
/// double-precision rates for throughput.
pub mod metrics;

/// Result collection and JSON output
pub mod results;

/// Per-worker timestamp series and experiment samples
pub mod series;

pub mod utils;

/// Observation window detection and trimming
pub mod window;

pub use error::{AnalysisError, Result};
pub use ingest::read_series;
pub use metrics::{percentiles, throughput, PercentileReport, ThroughputMetrics};
pub use series::{ExperimentSample, TimestampSeries};
pub use window::{find_window, trim, WarmupFraction, Window};

/// The current version of the analyzer, recorded in every report.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod defaults {
    /// Nanoseconds in one second; timestamps are nanoseconds, rates are per
    /// second.
    pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

    /// Percentile ranks reported for latency experiments.
    pub const PERCENTILES: &[f64] = &[1.0, 5.0, 50.0, 95.0, 99.0];

    /// Fraction of the observation window discarded as warmup.
    ///
    /// Zero keeps the whole overlap. Raise it when ramp-up effects (JIT
    /// warmup, cache fill, connection setup) are visible in the data.
    pub const WARMUP: f64 = 0.0;

    /// Default output file name
    pub const OUTPUT_FILE: &str = "analysis_results.json";
}
