//! # Pronghorn Bench - Main Entry Point
//!
//! Reduces result files collected from distributed controller experiments.
//!
//! 1. **Initialize logging**: colorized tracing output on stderr
//! 2. **Parse arguments**: input files and analysis options
//! 3. **Validate configuration**: warmup range, percentile ranks, mode
//! 4. **Analyze**: every input file, in parallel
//! 5. **Report**: a table on stdout and a JSON file with full results
//!
//! A file that fails to analyze stops the run unless `--continue-on-error`
//! is given, in which case the failure is recorded in the report instead.

use anyhow::{Context, Result};
use clap::Parser;
use pronghorn_bench::{
    analysis::analyze_files,
    cli::{AnalysisConfig, Args},
    experiment::RunContext,
    logging::init_logging,
    results::ResultsManager,
};
use tracing::{error, info};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    info!("Starting Pronghorn Bench analysis");
    info!("Configuration: {:?}", args);

    let config = AnalysisConfig::from_args(&args).context("Invalid analysis configuration")?;
    let data_root = std::env::current_dir().context("Failed to get current directory")?;
    let mut results_manager =
        ResultsManager::new(&args.output_file, RunContext::starting_now(data_root));

    info!(
        "Analyzing {} file(s) in {} mode",
        args.inputs.len(),
        config.mode
    );

    for (path, outcome) in analyze_files(&args.inputs, &config) {
        match outcome {
            Ok(report) => results_manager.add_report(report),
            Err(e) => {
                error!("Analysis failed for {:?}: {}", path, e);
                if !args.continue_on_error {
                    return Err(e).with_context(|| format!("Failed to analyze {:?}", path));
                }
                results_manager.add_failure(&path, &e);
            }
        }
    }

    results_manager.print_summary();
    results_manager.finalize()?;

    info!("Pronghorn Bench analysis completed successfully");
    Ok(())
}
