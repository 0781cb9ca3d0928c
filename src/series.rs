//! Per-worker timestamp series and the experiment sample built from them.

use crate::error::{AnalysisError, Result};
use crate::window::Window;

/// Operation-completion timestamps (nanoseconds) recorded by one worker,
/// held in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampSeries {
    values: Vec<u64>,
}

impl TimestampSeries {
    /// Build a series from values in any order. The values are always sorted;
    /// the recording order is never trusted.
    pub fn from_unsorted(mut values: Vec<u64>) -> Self {
        values.sort_unstable();
        Self { values }
    }

    pub(crate) fn from_sorted_slice(values: &[u64]) -> Self {
        debug_assert!(values.windows(2).all(|w| w[0] <= w[1]));
        Self {
            values: values.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Earliest completion, i.e. when this worker started producing samples.
    pub fn first(&self) -> Option<u64> {
        self.values.first().copied()
    }

    /// Latest completion, i.e. when this worker stopped producing samples.
    pub fn last(&self) -> Option<u64> {
        self.values.last().copied()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.values
    }

    /// The contiguous run of samples with `window.start <= v <= window.end`,
    /// located by binary search.
    pub fn within(&self, window: &Window) -> &[u64] {
        let lo = self.values.partition_point(|&v| v < window.start());
        let hi = self.values.partition_point(|&v| v <= window.end());
        &self.values[lo..hi]
    }

    /// Every timestamp multiplied by `factor`. Used to build time-dilated
    /// copies of an experiment. `None` if any timestamp would overflow.
    pub fn dilated(&self, factor: u64) -> Option<Self> {
        let values = self
            .values
            .iter()
            .map(|v| v.checked_mul(factor))
            .collect::<Option<Vec<u64>>>()?;
        Some(Self { values })
    }
}

impl From<Vec<u64>> for TimestampSeries {
    fn from(values: Vec<u64>) -> Self {
        Self::from_unsorted(values)
    }
}

/// One experiment run: a series per participating worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentSample {
    series: Vec<TimestampSeries>,
}

impl ExperimentSample {
    /// Build a validated sample: at least one worker, and no worker without
    /// samples.
    pub fn new(series: Vec<Vec<u64>>) -> Result<Self> {
        if series.is_empty() {
            return Err(AnalysisError::EmptySample {
                origin: "<memory>".to_string(),
            });
        }
        if let Some(index) = series.iter().position(Vec::is_empty) {
            return Err(AnalysisError::EmptySeries { index });
        }
        Ok(Self {
            series: series.into_iter().map(TimestampSeries::from_unsorted).collect(),
        })
    }

    /// Wrap already-built series without validating them. Empty series are
    /// accepted here and rejected later by window detection.
    pub fn from_series(series: Vec<TimestampSeries>) -> Self {
        Self { series }
    }

    pub fn series(&self) -> &[TimestampSeries] {
        &self.series
    }

    pub fn num_workers(&self) -> usize {
        self.series.len()
    }

    /// Total samples across all workers.
    pub fn total_ops(&self) -> usize {
        self.series.iter().map(TimestampSeries::len).sum()
    }

    /// `None` if any timestamp would overflow.
    pub fn dilated(&self, factor: u64) -> Option<Self> {
        let series = self
            .series
            .iter()
            .map(|s| s.dilated(factor))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { series })
    }
}
