//! # Per-File Analysis Pipelines
//!
//! Glue between ingest and aggregation for whole result files:
//!
//! - **Throughput files**: per-worker series → overlap window (minus warmup)
//!   → trim → ops/s.
//! - **Latency files**: flattened nanosecond pool → optional heuristic window
//!   → unit conversion → percentiles and spread.
//!
//! Each file is an independent, pure computation, so [`analyze_files`] fans a
//! batch out over a rayon pool without any shared state. Results come back in
//! input order.

use crate::cli::{AnalysisConfig, AnalysisMode, LatencyWindow};
use crate::error::Result;
use crate::ingest::{read_flat_values, read_series};
use crate::metrics::{
    convert_nanos, heuristic_window, latency_metrics, throughput_metrics, LatencyMetrics,
    ThroughputMetrics,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reduced result of one input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub file: PathBuf,
    pub mode: AnalysisMode,
    pub throughput: Option<ThroughputMetrics>,
    pub latency: Option<LatencyReport>,
}

/// Latency reduction of a flattened pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyReport {
    pub samples_read: usize,
    pub samples_used: usize,
    pub window: LatencyWindow,
    pub metrics: LatencyMetrics,
}

/// Throughput of a per-worker timestamp file.
pub fn analyze_throughput_file(path: &Path, config: &AnalysisConfig) -> Result<ThroughputMetrics> {
    let sample = read_series(path)?;
    let metrics = throughput_metrics(&sample, config.warmup)?;
    info!(
        "{:?}: {} ops from {} workers over {}ns",
        path, metrics.total_ops, metrics.workers, metrics.elapsed_ns
    );
    Ok(metrics)
}

/// Percentile report of a flattened latency file.
pub fn analyze_latency_file(path: &Path, config: &AnalysisConfig) -> Result<LatencyReport> {
    let raw = read_flat_values(path)?;
    latency_report(&raw, config)
}

/// Reduce an in-memory nanosecond latency pool.
pub fn latency_report(raw_ns: &[u64], config: &AnalysisConfig) -> Result<LatencyReport> {
    let windowed = match config.latency_window {
        LatencyWindow::Heuristic => heuristic_window(raw_ns),
        LatencyWindow::Full => raw_ns,
    };
    debug!(
        read = raw_ns.len(),
        used = windowed.len(),
        "applied latency window"
    );

    let converted = convert_nanos(windowed, config.unit);
    let metrics = latency_metrics(&converted, &config.percentiles, config.unit)?;

    Ok(LatencyReport {
        samples_read: raw_ns.len(),
        samples_used: windowed.len(),
        window: config.latency_window,
        metrics,
    })
}

/// Analyze one file in the configured mode.
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Result<FileReport> {
    let mut report = FileReport {
        file: path.to_path_buf(),
        mode: config.mode,
        throughput: None,
        latency: None,
    };

    match config.mode {
        AnalysisMode::Throughput => {
            report.throughput = Some(analyze_throughput_file(path, config)?);
        }
        AnalysisMode::Latency => {
            report.latency = Some(analyze_latency_file(path, config)?);
        }
    }

    Ok(report)
}

/// Analyze independent files in parallel. The output has one entry per
/// input, in input order.
pub fn analyze_files(
    paths: &[PathBuf],
    config: &AnalysisConfig,
) -> Vec<(PathBuf, Result<FileReport>)> {
    paths
        .par_iter()
        .map(|path| (path.clone(), analyze_file(path, config)))
        .collect()
}
