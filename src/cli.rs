use crate::error::AnalysisError;
use crate::experiment::ExperimentKind;
use crate::metrics::TimeUnit;
use crate::window::WarmupFraction;
use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pronghorn Bench - throughput and latency reduction for controller experiments
#[derive(Parser, Debug, Clone)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// Result files to analyze (one worker series per line)
    #[clap(required = true, num_args = 1.., help_heading = "Core Options")]
    pub inputs: Vec<PathBuf>,

    /// How to reduce the input files
    #[clap(short = 'm', long, value_enum, help_heading = "Core Options")]
    pub mode: Option<AnalysisMode>,

    /// Experiment that produced the inputs; picks the mode when --mode is absent
    #[clap(short = 'k', long, value_enum, help_heading = "Core Options")]
    pub kind: Option<ExperimentKind>,

    /// Fraction of the observation window to discard as warmup, in [0, 1)
    #[clap(short = 'w', long, default_value_t = crate::defaults::WARMUP)]
    pub warmup: f64,

    /// Percentiles to report for latency analysis
    #[clap(short = 'p', long, num_args = 1.., default_values_t = crate::defaults::PERCENTILES.to_vec())]
    pub percentiles: Vec<f64>,

    /// Unit latency values are reported in (inputs are nanoseconds)
    #[clap(short = 'u', long, value_enum, default_value_t = TimeUnit::Milliseconds)]
    pub unit: TimeUnit,

    /// Sample range used for latency pools
    #[clap(long, value_enum, default_value_t = LatencyWindow::Heuristic)]
    pub latency_window: LatencyWindow,

    /// Output file for results (JSON format)
    #[clap(short = 'o', long, default_value = crate::defaults::OUTPUT_FILE)]
    pub output_file: PathBuf,

    /// Continue analyzing other files even if one fails
    #[clap(long, default_value_t = false)]
    pub continue_on_error: bool,

    /// Verbose output
    #[clap(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

/// Aggregation applied to an input file
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum AnalysisMode {
    /// Overlap window, warmup exclusion and ops/s
    #[clap(name = "throughput")]
    Throughput,

    /// Flattened latency pool and percentiles
    #[clap(name = "latency")]
    Latency,
}

impl std::fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisMode::Throughput => write!(f, "Throughput"),
            AnalysisMode::Latency => write!(f, "Latency"),
        }
    }
}

/// Sample range for flattened latency pools
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum LatencyWindow {
    /// Skip the first quarter, keep 80% of the rest
    #[clap(name = "heuristic")]
    Heuristic,

    /// Every sample
    #[clap(name = "full")]
    Full,
}

/// Validated analysis settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub mode: AnalysisMode,
    pub kind: Option<ExperimentKind>,
    pub warmup: WarmupFraction,
    pub percentiles: Vec<f64>,
    pub unit: TimeUnit,
    pub latency_window: LatencyWindow,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::Throughput,
            kind: None,
            warmup: WarmupFraction::NONE,
            percentiles: crate::defaults::PERCENTILES.to_vec(),
            unit: TimeUnit::Milliseconds,
            latency_window: LatencyWindow::Heuristic,
        }
    }
}

impl AnalysisConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let mode = match (args.mode, args.kind) {
            (Some(mode), _) => mode,
            (None, Some(kind)) => kind.analysis_mode(),
            (None, None) => AnalysisMode::Throughput,
        };

        let warmup = WarmupFraction::new(args.warmup)?;

        if args.percentiles.is_empty() {
            bail!("At least one percentile is required");
        }
        if let Some(&rank) = args
            .percentiles
            .iter()
            .find(|&&p| !(p > 0.0 && p < 100.0))
        {
            return Err(AnalysisError::InvalidPercentile { rank }.into());
        }

        Ok(Self {
            mode,
            kind: args.kind,
            warmup,
            percentiles: args.percentiles.clone(),
            unit: args.unit,
            latency_window: args.latency_window,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["pronghorn-bench"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["run.csv"]);
        assert_eq!(args.inputs, vec![PathBuf::from("run.csv")]);
        assert_eq!(args.warmup, 0.0);
        assert_eq!(args.percentiles, vec![1.0, 5.0, 50.0, 95.0, 99.0]);
        assert_eq!(args.unit, TimeUnit::Milliseconds);

        let config = AnalysisConfig::from_args(&args).unwrap();
        assert_eq!(config.mode, AnalysisMode::Throughput);
        assert_eq!(config.warmup, WarmupFraction::NONE);
    }

    #[test]
    fn test_inputs_are_required() {
        assert!(Args::try_parse_from(["pronghorn-bench"]).is_err());
    }

    #[test]
    fn test_kind_implies_mode() {
        let args = parse(&["--kind", "latency", "a.csv", "b.csv"]);
        let config = AnalysisConfig::from_args(&args).unwrap();
        assert_eq!(config.mode, AnalysisMode::Latency);
        assert_eq!(args.inputs.len(), 2);

        let args = parse(&["--kind", "latency", "--mode", "throughput", "a.csv"]);
        let config = AnalysisConfig::from_args(&args).unwrap();
        assert_eq!(config.mode, AnalysisMode::Throughput);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let args = parse(&["--warmup", "1.0", "a.csv"]);
        assert!(AnalysisConfig::from_args(&args).is_err());

        let args = parse(&["-p", "50", "100", "--", "a.csv"]);
        assert!(AnalysisConfig::from_args(&args).is_err());
    }

    #[test]
    fn test_analysis_mode_display() {
        assert_eq!(AnalysisMode::Throughput.to_string(), "Throughput");
        assert_eq!(AnalysisMode::Latency.to_string(), "Latency");
    }
}
