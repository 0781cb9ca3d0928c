//! # Experiment Descriptions and Run Context
//!
//! Typed descriptions of the experiments whose result files this crate
//! analyzes. Launching them is handled elsewhere; what lives here is the
//! information the analysis side needs:
//!
//! - [`RunContext`]: when the run started and where its data lands. Passed
//!   explicitly to whatever needs a run start instead of being captured once
//!   in global state.
//! - [`ExperimentConfig`]: an immutable, validated description of one
//!   invocation (run an experiment on a topology, or kill running ones).
//! - [`ExperimentKind`]: which experiment produced a file, and therefore
//!   which aggregation applies to it.

use crate::cli::AnalysisMode;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Experiments the controller test harness can run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum ExperimentKind {
    /// Single-operation round trip latency
    #[clap(name = "latency")]
    Latency,

    /// Aggregate operations per second
    #[clap(name = "throughput")]
    Throughput,

    /// Reader/writer fairness, optionally with wound-wait
    #[clap(name = "fairness")]
    Fairness,

    /// Throughput under injected operation failures
    #[clap(name = "error")]
    Error,

    /// Throughput with speculative execution toggled
    #[clap(name = "speculation")]
    Speculation,
}

impl ExperimentKind {
    /// Task name used for data directories and result files.
    pub fn task_name(self) -> &'static str {
        match self {
            ExperimentKind::Latency => "latency",
            ExperimentKind::Throughput => "throughput",
            ExperimentKind::Fairness => "fairness",
            ExperimentKind::Error => "error",
            ExperimentKind::Speculation => "speculation_throughput",
        }
    }

    /// Operations each switch runs unless told otherwise.
    pub fn default_ops_per_switch(self) -> usize {
        match self {
            ExperimentKind::Latency => 1_000,
            ExperimentKind::Throughput | ExperimentKind::Speculation => 10_000,
            ExperimentKind::Fairness | ExperimentKind::Error => 50,
        }
    }

    /// How this experiment's result files are reduced.
    pub fn analysis_mode(self) -> AnalysisMode {
        match self {
            ExperimentKind::Latency => AnalysisMode::Latency,
            _ => AnalysisMode::Throughput,
        }
    }
}

impl std::fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.task_name())
    }
}

/// How controller nodes are chained together
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Topology {
    #[clap(name = "linear")]
    Linear,

    #[clap(name = "tree")]
    Tree,
}

/// Start time and data location of one experiment session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    pub started_at: DateTime<Utc>,
    pub data_root: PathBuf,
}

impl RunContext {
    pub fn new<P: Into<PathBuf>>(data_root: P, started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            data_root: data_root.into(),
        }
    }

    /// Context for a session starting now.
    pub fn starting_now<P: Into<PathBuf>>(data_root: P) -> Self {
        Self::new(data_root, Utc::now())
    }

    /// `<root>/<task>-<start epoch seconds>`
    pub fn data_dir(&self, kind: ExperimentKind) -> PathBuf {
        self.data_root
            .join(format!("{}-{}", kind.task_name(), self.started_at.timestamp()))
    }

    /// `<data_dir>/<basename>.csv`
    pub fn result_path(&self, kind: ExperimentKind, basename: &str) -> PathBuf {
        self.data_dir(kind).join(format!("{basename}.csv"))
    }

    /// Create the task's data directory if it does not exist yet.
    pub fn ensure_data_dir(&self, kind: ExperimentKind) -> Result<PathBuf> {
        let dir = self.data_dir(kind);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {:?}", dir))?;
        debug!("Data directory ready: {:?}", dir);
        Ok(dir)
    }
}

/// What an invocation does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperimentAction {
    Run {
        topology: Topology,
        output: PathBuf,
        switches_per_controller: usize,
        ops_per_switch: usize,
    },
    Kill,
}

/// Validated, immutable description of one experiment invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    kind: ExperimentKind,
    action: ExperimentAction,
}

impl ExperimentConfig {
    pub fn builder(kind: ExperimentKind) -> ExperimentConfigBuilder {
        ExperimentConfigBuilder::new(kind)
    }

    pub fn kind(&self) -> ExperimentKind {
        self.kind
    }

    pub fn action(&self) -> &ExperimentAction {
        &self.action
    }

    /// Local file the run's results are saved to, if this is a run.
    pub fn output(&self) -> Option<&Path> {
        match &self.action {
            ExperimentAction::Run { output, .. } => Some(output),
            ExperimentAction::Kill => None,
        }
    }
}

/// Collects invocation options and checks their combination in `build`.
#[derive(Debug, Clone)]
pub struct ExperimentConfigBuilder {
    kind: ExperimentKind,
    kill: bool,
    topology: Option<Topology>,
    output: Option<PathBuf>,
    switches_per_controller: usize,
    ops_per_switch: Option<usize>,
}

impl ExperimentConfigBuilder {
    fn new(kind: ExperimentKind) -> Self {
        Self {
            kind,
            kill: false,
            topology: None,
            output: None,
            switches_per_controller: 1,
            ops_per_switch: None,
        }
    }

    pub fn kill(mut self, kill: bool) -> Self {
        self.kill = kill;
        self
    }

    pub fn topology(mut self, topology: Topology) -> Self {
        self.topology = Some(topology);
        self
    }

    pub fn output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn switches_per_controller(mut self, switches: usize) -> Self {
        self.switches_per_controller = switches;
        self
    }

    pub fn ops_per_switch(mut self, ops: usize) -> Self {
        self.ops_per_switch = Some(ops);
        self
    }

    pub fn build(self) -> Result<ExperimentConfig> {
        if self.kill {
            if self.output.is_some() || self.topology.is_some() {
                bail!("A kill invocation takes no output file or topology");
            }
            return Ok(ExperimentConfig {
                kind: self.kind,
                action: ExperimentAction::Kill,
            });
        }

        let Some(output) = self.output else {
            bail!("If not killing, an output filename is required");
        };
        let Some(topology) = self.topology else {
            bail!("If not killing, a topology is required");
        };
        if self.switches_per_controller == 0 {
            bail!("Switches per controller cannot be zero");
        }
        let ops_per_switch = self
            .ops_per_switch
            .unwrap_or_else(|| self.kind.default_ops_per_switch());
        if ops_per_switch == 0 {
            bail!("Operations per switch cannot be zero");
        }

        Ok(ExperimentConfig {
            kind: self.kind,
            action: ExperimentAction::Run {
                topology,
                output,
                switches_per_controller: self.switches_per_controller,
                ops_per_switch,
            },
        })
    }
}
