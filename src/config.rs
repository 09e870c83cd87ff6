//! Runtime configuration for evict-sim.
//!
//! Configuration can be loaded from a JSON file or constructed
//! programmatically; CLI flags override file values. All simulation knobs
//! (trace path, capacity, decay factor, execution mode, per-policy
//! overrides) live here.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::sim::cache::Policy;
use crate::sim::harness::{ExecutionMode, PolicySpec};

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "evict-sim", about = "Cache-eviction policy simulator")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Trace file to replay (overrides the config file).
    #[arg(short, long)]
    pub trace: Option<PathBuf>,

    /// Cache capacity in entries (overrides the config file).
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Frequency decay factor in (0, 1] (overrides the config file).
    #[arg(long)]
    pub decay_factor: Option<f64>,

    /// Execution mode: sequential or concurrent.
    #[arg(short, long)]
    pub mode: Option<ExecutionMode>,

    /// Directory for per-run result files.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trace input.
    pub trace: TraceConfig,

    /// Simulation parameters and policy set.
    pub simulation: SimulationConfig,

    /// Result output.
    pub output: OutputConfig,
}

/// Trace input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Path to the operation trace file.
    pub path: PathBuf,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cpu_operations.txt"),
        }
    }
}

/// Simulation parameters shared by all policies unless overridden.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Default cache capacity in entries. Zero is valid and makes a cache
    /// permanently empty.
    pub capacity: usize,

    /// Default frequency decay factor in (0, 1]. `1.0` disables decay.
    pub decay_factor: f64,

    /// Whether policy runs execute one at a time or concurrently.
    pub mode: ExecutionMode,

    /// The policies to evaluate. Each gets its own cache instance.
    pub policies: Vec<PolicyConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            decay_factor: 0.5,
            mode: ExecutionMode::Sequential,
            policies: vec![
                PolicyConfig::variant(Policy::FifoDecay),
                PolicyConfig::variant(Policy::LruDecay),
                PolicyConfig::variant(Policy::LfuDecay),
            ],
        }
    }
}

/// One policy entry; capacity and decay fall back to the shared defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Display name; defaults to the policy's own label.
    #[serde(default)]
    pub name: Option<String>,

    /// Which cache variant to run.
    pub policy: Policy,

    /// Capacity override for this policy.
    #[serde(default)]
    pub capacity: Option<usize>,

    /// Decay factor override for this policy.
    #[serde(default)]
    pub decay_factor: Option<f64>,
}

impl PolicyConfig {
    fn variant(policy: Policy) -> Self {
        Self {
            name: None,
            policy,
            capacity: None,
            decay_factor: None,
        }
    }
}

/// Result output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the per-run CSV files are written to.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults for
    /// missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// Fold CLI overrides into this configuration.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(trace) = &cli.trace {
            self.trace.path = trace.clone();
        }
        if let Some(capacity) = cli.capacity {
            self.simulation.capacity = capacity;
        }
        if let Some(decay_factor) = cli.decay_factor {
            self.simulation.decay_factor = decay_factor;
        }
        if let Some(mode) = cli.mode {
            self.simulation.mode = mode;
        }
        if let Some(output) = &cli.output {
            self.output.dir = output.clone();
        }
    }

    /// Resolve the configured policies into concrete per-run specs.
    pub fn policy_specs(&self) -> Vec<PolicySpec> {
        self.simulation
            .policies
            .iter()
            .map(|entry| PolicySpec {
                name: entry
                    .name
                    .clone()
                    .unwrap_or_else(|| entry.policy.to_string()),
                policy: entry.policy,
                capacity: entry.capacity.unwrap_or(self.simulation.capacity),
                decay_factor: entry.decay_factor.unwrap_or(self.simulation.decay_factor),
            })
            .collect()
    }
}
