//! # Analysis Error Taxonomy
//!
//! Every failure the measurement engine can report. All of them are terminal
//! for the computation that raised them: the inputs are already-collected
//! experiment data, so nothing here is transient and nothing is retried.
//! Deciding whether to re-run an experiment is the caller's job.
//!
//! Each variant carries enough context (indices, timestamps, file names) to
//! tell a measurement artifact, such as a worker that crashed early and left
//! no overlap, apart from a tooling bug.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the analysis pipeline.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A field did not parse as a non-negative integer.
    #[error("{origin}: record {record}, field {field}: cannot parse {value:?} as a timestamp")]
    MalformedInput {
        origin: String,
        record: usize,
        field: usize,
        value: String,
    },

    /// The input contained no worker records at all.
    #[error("{origin}: input contains no records")]
    EmptySample { origin: String },

    /// A worker series has no samples.
    #[error("worker series {index} is empty")]
    EmptySeries { index: usize },

    /// The latest worker start comes after the earliest worker end.
    #[error("workers never overlapped: last start {last_start}ns is after first end {first_end}ns")]
    NoOverlap { last_start: u64, first_end: u64 },

    /// The observation window collapsed to a single instant.
    #[error("observation window has zero duration at {at}ns")]
    ZeroDuration { at: u64 },

    /// Percentiles were requested over an empty pool.
    #[error("cannot compute percentiles over an empty sample pool")]
    InsufficientSamples,

    #[error("warmup fraction {value} is outside [0, 1)")]
    InvalidWarmup { value: f64 },

    #[error("percentile rank {rank} is outside (0, 100)")]
    InvalidPercentile { rank: f64 },

    #[error("window start {start}ns is after window end {end}ns")]
    InvalidWindow { start: u64, end: u64 },

    #[error("latency histogram error: {0}")]
    Histogram(String),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read records from {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl AnalysisError {
    /// True for failures caused by the shape of the collected data rather
    /// than by the tool or its configuration.
    pub fn is_measurement_artifact(&self) -> bool {
        matches!(
            self,
            AnalysisError::EmptySample { .. }
                | AnalysisError::EmptySeries { .. }
                | AnalysisError::NoOverlap { .. }
                | AnalysisError::ZeroDuration { .. }
                | AnalysisError::InsufficientSamples
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_input_message_names_location() {
        let err = AnalysisError::MalformedInput {
            origin: "run.csv".to_string(),
            record: 2,
            field: 7,
            value: "12x".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("run.csv"));
        assert!(msg.contains("record 2"));
        assert!(msg.contains("field 7"));
        assert!(msg.contains("12x"));
    }

    #[test]
    fn test_measurement_artifact_classification() {
        assert!(AnalysisError::NoOverlap {
            last_start: 10,
            first_end: 5
        }
        .is_measurement_artifact());
        assert!(AnalysisError::InsufficientSamples.is_measurement_artifact());
        assert!(!AnalysisError::InvalidWarmup { value: 1.5 }.is_measurement_artifact());
        assert!(!AnalysisError::InvalidPercentile { rank: 100.0 }.is_measurement_artifact());
    }
}
