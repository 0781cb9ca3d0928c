//! # Utility Functions and Helper Module
//!
//! Small helpers shared by the analysis binary and the results manager:
//!
//! - **Identifiers**: unique ids for analysis runs
//! - **Formatting**: human-readable display of window durations
//! - **Display Helpers**: plain-text table rows and separators
//!
//! ## Usage Examples
//!
//! ```rust
//! use pronghorn_bench::utils::*;
//! use std::time::Duration;
//!
//! let duration_str = format_duration(Duration::from_micros(1500));
//! assert_eq!(duration_str, "1.50ms");
//!
//! assert_eq!(format_duration_ns(17), "17ns");
//! ```

use std::time::Duration;
use uuid::Uuid;

/// Generate a unique identifier for an analysis run
///
/// Written into the report metadata so that results produced from the same
/// input files at different times can be told apart.
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Convert nanoseconds to a human-readable duration string
///
/// Convenience wrapper around [`format_duration`] for window lengths, which
/// are carried as raw nanosecond counts.
///
/// ```rust
/// # use pronghorn_bench::utils::format_duration_ns;
/// assert_eq!(format_duration_ns(500), "500ns");
/// assert_eq!(format_duration_ns(1500), "1.50μs");
/// assert_eq!(format_duration_ns(1500000), "1.50ms");
/// ```
pub fn format_duration_ns(ns: u64) -> String {
    format_duration(Duration::from_nanos(ns))
}

/// Format a duration in a human-readable way
///
/// ## Unit Selection Logic
///
/// - **Nanoseconds**: < 1,000 ns (e.g., "500ns")
/// - **Microseconds**: < 1,000,000 ns (e.g., "1.50μs")
/// - **Milliseconds**: < 1,000,000,000 ns (e.g., "25.75ms")
/// - **Seconds**: < 60 seconds (e.g., "5.25s")
/// - **Minutes and Hours**: longer windows (e.g., "5m 30s", "2h 15m 30s")
///
/// Experiment windows range from milliseconds for smoke runs to the better
/// part of an hour for the large throughput sweeps, so all of these show up.
pub fn format_duration(duration: Duration) -> String {
    let total_ns = duration.as_nanos();

    if total_ns < 1_000 {
        format!("{}ns", total_ns)
    } else if total_ns < 1_000_000 {
        format!("{:.2}μs", total_ns as f64 / 1_000.0)
    } else if total_ns < 1_000_000_000 {
        format!("{:.2}ms", total_ns as f64 / 1_000_000.0)
    } else if total_ns < 60_000_000_000 {
        format!("{:.2}s", total_ns as f64 / 1_000_000_000.0)
    } else {
        let seconds = duration.as_secs();
        let minutes = seconds / 60;
        let remaining_seconds = seconds % 60;

        if minutes < 60 {
            format!("{}m {}s", minutes, remaining_seconds)
        } else {
            let hours = minutes / 60;
            let remaining_minutes = minutes % 60;
            format!("{}h {}m {}s", hours, remaining_minutes, remaining_seconds)
        }
    }
}

/// Print a formatted table row
///
/// Content is left-aligned within each column width and separated by pipes.
/// Columns without a configured width fall back to 10 characters.
pub fn print_table_row(columns: &[&str], widths: &[usize]) {
    println!("{}", format_table_row(columns, widths));
}

/// Print a table separator matching the column widths
pub fn print_table_separator(widths: &[usize]) {
    println!("{}", format_table_separator(widths));
}

fn format_table_row(columns: &[&str], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (i, column) in columns.iter().enumerate() {
        let width = widths.get(i).copied().unwrap_or(10);
        line.push_str(&format!(" {:width$} |", column, width = width));
    }
    line
}

fn format_table_separator(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for &width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line
}
