//! # Observation Window Detection and Trimming
//!
//! Workers start and stop at slightly different wall-clock moments because of
//! process-launch skew and uneven teardown. Only the span during which every
//! worker was producing samples is a fair picture of steady-state concurrent
//! load, so aggregation always runs over that overlap.
//!
//! ## Algorithm
//!
//! 1. `last_start`: the latest first sample across workers. From here on every
//!    worker has completed at least one operation.
//! 2. `first_end`: the earliest last sample across workers. Past this point
//!    some worker has stopped, and the aggregate no longer describes the full
//!    configured load.
//! 3. An optional warmup fraction of `[last_start, first_end]` is dropped from
//!    the front to exclude ramp-up (JIT warmup, cache fill, connection setup).
//!
//! ## Precision
//!
//! The warmup offset is real-valued: `start = last_start + duration * w`. It is
//! computed in `f64` on the window *duration* only, since epoch nanoseconds
//! exceed the 53-bit mantissa. A [`Window`] carries that start twice:
//!
//! - [`Window::start`] is the offset rounded up to the next whole nanosecond,
//!   which keeps exactly the integer samples a real-valued start would keep.
//! - [`Window::elapsed_ns`] is the unrounded length `duration * (1 - w)`, the
//!   denominator for rates.

use crate::error::{AnalysisError, Result};
use crate::series::{ExperimentSample, TimestampSeries};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Proportion of the window to discard from its start, in `[0, 1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64")]
pub struct WarmupFraction(f64);

impl WarmupFraction {
    pub const NONE: WarmupFraction = WarmupFraction(0.0);

    pub fn new(value: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&value) {
            return Err(AnalysisError::InvalidWarmup { value });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Whole nanoseconds to skip from the start of a window of `duration_ns`.
    fn offset_ns(self, duration_ns: u64) -> u64 {
        let offset = (duration_ns as f64 * self.0).ceil() as u64;
        offset.min(duration_ns)
    }

    /// Real-valued length left after the warmup, never rounded.
    fn remaining_ns(self, duration_ns: u64) -> f64 {
        duration_ns as f64 * (1.0 - self.0)
    }
}

impl TryFrom<f64> for WarmupFraction {
    type Error = AnalysisError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

/// Inclusive `[start, end]` interval in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds")]
pub struct Window {
    start: u64,
    end: u64,
    elapsed_ns: f64,
}

/// Unchecked serialized form of a [`Window`].
#[derive(Deserialize)]
struct WindowBounds {
    start: u64,
    end: u64,
    elapsed_ns: f64,
}

impl TryFrom<WindowBounds> for Window {
    type Error = AnalysisError;

    fn try_from(raw: WindowBounds) -> Result<Self> {
        let mut window = Window::new(raw.start, raw.end)?;
        if !raw.elapsed_ns.is_finite() || raw.elapsed_ns < 0.0 {
            return Err(AnalysisError::InvalidWindow {
                start: raw.start,
                end: raw.end,
            });
        }
        window.elapsed_ns = raw.elapsed_ns;
        Ok(window)
    }
}

impl Window {
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if start > end {
            return Err(AnalysisError::InvalidWindow { start, end });
        }
        Ok(Self {
            start,
            end,
            elapsed_ns: (end - start) as f64,
        })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Whole nanoseconds between the integer bounds.
    pub fn duration_ns(&self) -> u64 {
        self.end - self.start
    }

    /// Exact length of the window after warmup exclusion. Equal to
    /// [`Window::duration_ns`] unless the warmup offset was fractional.
    pub fn elapsed_ns(&self) -> f64 {
        self.elapsed_ns
    }

    pub fn contains(&self, timestamp: u64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Find the span during which every worker was active, minus the warmup
/// fraction at its front.
///
/// Fails with `EmptySample` when there are no workers, `EmptySeries` when a
/// worker has no samples, and `NoOverlap` when the latest start comes after
/// the earliest end.
pub fn find_window(sample: &ExperimentSample, warmup: WarmupFraction) -> Result<Window> {
    let (last_start, first_end) = overlap_bounds(sample.series())?;

    if last_start > first_end {
        return Err(AnalysisError::NoOverlap {
            last_start,
            first_end,
        });
    }

    let duration = first_end - last_start;
    let window = Window {
        start: last_start + warmup.offset_ns(duration),
        end: first_end,
        elapsed_ns: warmup.remaining_ns(duration),
    };
    debug!(
        last_start,
        first_end,
        warmup = warmup.value(),
        start = window.start,
        elapsed_ns = window.elapsed_ns,
        "detected observation window"
    );

    Ok(window)
}

fn overlap_bounds(series: &[TimestampSeries]) -> Result<(u64, u64)> {
    if series.is_empty() {
        return Err(AnalysisError::EmptySample {
            origin: "<sample>".to_string(),
        });
    }

    let mut last_start = u64::MIN;
    let mut first_end = u64::MAX;
    for (index, s) in series.iter().enumerate() {
        match (s.first(), s.last()) {
            (Some(first), Some(last)) => {
                last_start = last_start.max(first);
                first_end = first_end.min(last);
            }
            _ => return Err(AnalysisError::EmptySeries { index }),
        }
    }
    Ok((last_start, first_end))
}

/// Keep only the samples inside `window` (boundaries included). Series may
/// come out empty.
pub fn trim(sample: &ExperimentSample, window: &Window) -> ExperimentSample {
    let series = sample
        .series()
        .iter()
        .map(|s| TimestampSeries::from_sorted_slice(s.within(window)))
        .collect();
    ExperimentSample::from_series(series)
}
