use crate::analysis::FileReport;
use crate::experiment::RunContext;
use crate::metrics::utils::{format_latency, format_throughput};
use crate::utils::{format_duration_ns, print_table_row, print_table_separator};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A file that could not be analyzed, and why
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedFile {
    pub file: PathBuf,
    pub error: String,
    pub measurement_artifact: bool,
}

/// System information for reproducibility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub architecture: String,
    pub cpu_cores: usize,
    pub analyzer_version: String,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            cpu_cores: num_cpus::get(),
            analyzer_version: crate::VERSION.to_string(),
        }
    }
}

/// Results manager for collecting per-file reports and writing the final JSON
pub struct ResultsManager {
    output_file: PathBuf,
    run: RunContext,
    run_id: String,
    results: Vec<FileReport>,
    failures: Vec<FailedFile>,
}

impl ResultsManager {
    /// Create a new results manager
    pub fn new(output_file: &Path, run: RunContext) -> Self {
        Self {
            output_file: output_file.to_path_buf(),
            run,
            run_id: crate::utils::generate_run_id(),
            results: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn add_report(&mut self, report: FileReport) {
        info!("Adding {} results for {:?}", report.mode, report.file);
        self.results.push(report);
    }

    pub fn add_failure(&mut self, file: &Path, error: &crate::error::AnalysisError) {
        warn!("Recording failure for {:?}: {}", file, error);
        self.failures.push(FailedFile {
            file: file.to_path_buf(),
            error: error.to_string(),
            measurement_artifact: error.is_measurement_artifact(),
        });
    }

    pub fn reports(&self) -> &[FileReport] {
        &self.results
    }

    pub fn failures(&self) -> &[FailedFile] {
        &self.failures
    }

    /// Write consolidated results to the output file
    pub fn finalize(&self) -> Result<()> {
        info!("Finalizing analysis results");

        let final_results = FinalAnalysisResults {
            metadata: AnalysisMetadata {
                version: crate::VERSION.to_string(),
                run_id: self.run_id.clone(),
                timestamp: chrono::Utc::now(),
                run_started_at: self.run.started_at,
                total_files: self.results.len() + self.failures.len(),
                system_info: SystemInfo::default(),
            },
            results: self.results.clone(),
            failures: self.failures.clone(),
            summary: self.calculate_overall_summary(),
        };

        let json = serde_json::to_string_pretty(&final_results)?;
        std::fs::write(&self.output_file, json)
            .with_context(|| format!("Failed to write results to {:?}", self.output_file))?;

        info!("Results written to: {:?}", self.output_file);
        Ok(())
    }

    /// Calculate overall summary across all files
    fn calculate_overall_summary(&self) -> OverallSummary {
        let throughputs: Vec<(&FileReport, f64)> = self
            .results
            .iter()
            .filter_map(|r| r.throughput.as_ref().map(|t| (r, t.ops_per_second)))
            .collect();

        let total_ops = self
            .results
            .iter()
            .filter_map(|r| r.throughput.as_ref())
            .map(|t| t.total_ops)
            .sum();

        let mean_ops_per_second = if throughputs.is_empty() {
            None
        } else {
            Some(throughputs.iter().map(|(_, t)| t).sum::<f64>() / throughputs.len() as f64)
        };

        let fastest_file = throughputs
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(r, _)| r.file.clone());

        OverallSummary {
            analyzed_files: self.results.len(),
            failed_files: self.failures.len(),
            total_ops,
            mean_ops_per_second,
            peak_ops_per_second: throughputs.iter().map(|(_, t)| *t).reduce(f64::max),
            fastest_file,
        }
    }

    /// Print a human-readable table of every report
    pub fn print_summary(&self) {
        let widths = [40, 10, 22, 36];
        print_table_row(&["File", "Mode", "Window", "Result"], &widths);
        print_table_separator(&widths);

        for report in &self.results {
            let file = report
                .file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| report.file.display().to_string());
            let mode = report.mode.to_string();

            let (window, result) = if let Some(t) = &report.throughput {
                (
                    format_duration_ns(t.elapsed_ns.round() as u64),
                    format!("{} ({} ops)", format_throughput(t.ops_per_second), t.total_ops),
                )
            } else if let Some(l) = &report.latency {
                let result = l
                    .metrics
                    .percentiles
                    .iter()
                    .map(|p| format!("p{}={}", p.percentile, format_latency(p.value, l.metrics.unit)))
                    .collect::<Vec<_>>()
                    .join(" ");
                (format!("{}/{} samples", l.samples_used, l.samples_read), result)
            } else {
                (String::new(), String::new())
            };

            print_table_row(
                &[file.as_str(), mode.as_str(), window.as_str(), result.as_str()],
                &widths,
            );
        }

        for failure in &self.failures {
            let file = failure.file.display().to_string();
            print_table_row(&[file.as_str(), "FAILED", "", failure.error.as_str()], &widths);
        }
    }
}

/// Final analysis results structure
#[derive(Debug, Serialize, Deserialize)]
pub struct FinalAnalysisResults {
    pub metadata: AnalysisMetadata,
    pub results: Vec<FileReport>,
    pub failures: Vec<FailedFile>,
    pub summary: OverallSummary,
}

/// Analysis metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub version: String,
    pub run_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub run_started_at: chrono::DateTime<chrono::Utc>,
    pub total_files: usize,
    pub system_info: SystemInfo,
}

/// Overall summary across all analyzed files
#[derive(Debug, Serialize, Deserialize)]
pub struct OverallSummary {
    pub analyzed_files: usize,
    pub failed_files: usize,
    pub total_ops: usize,
    pub mean_ops_per_second: Option<f64>,
    pub peak_ops_per_second: Option<f64>,
    pub fastest_file: Option<PathBuf>,
}
