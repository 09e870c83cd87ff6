//! Runs one trace against several policy configurations and aggregates
//! their metrics.
//!
//! Each configuration gets a fresh, exclusively-owned cache; runs never
//! share mutable state, so sequential and concurrent execution produce
//! identical results. Concurrent mode fans each replay out to a blocking
//! worker task and joins them all before aggregating.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::sim::cache::{EvictionCache, Policy, PolicyError};
use crate::sim::op::{Operation, OperationRecord};
use crate::sim::runner::{Replay, RunMetrics};

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("policy {name}: {source}")]
    Construction {
        name: String,
        #[source]
        source: PolicyError,
    },

    #[error("policy {name}: worker task failed: {reason}")]
    WorkerFailed { name: String, reason: String },
}

/// One named policy configuration: variant, capacity, decay factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySpec {
    pub name: String,
    pub policy: Policy,
    pub capacity: usize,
    pub decay_factor: f64,
}

impl PolicySpec {
    pub fn new(name: impl Into<String>, policy: Policy, capacity: usize, decay_factor: f64) -> Self {
        Self {
            name: name.into(),
            policy,
            capacity,
            decay_factor,
        }
    }
}

/// Whether policy runs execute one at a time or fan out to worker tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Sequential,
    Concurrent,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Concurrent => write!(f, "concurrent"),
        }
    }
}

impl std::str::FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(ExecutionMode::Sequential),
            "concurrent" => Ok(ExecutionMode::Concurrent),
            other => Err(format!(
                "unknown execution mode {other:?}, expected \"sequential\" or \"concurrent\""
            )),
        }
    }
}

/// Everything one completed run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Per-operation records, in trace order.
    pub records: Vec<OperationRecord>,
    pub metrics: RunMetrics,
    pub elapsed: Duration,
}

/// Outcome of one policy's run. A failed run carries its error and never
/// affects sibling runs.
#[derive(Debug)]
pub struct PolicyRun {
    pub spec: PolicySpec,
    pub result: Result<RunReport, HarnessError>,
}

/// Per-run outcomes plus the aggregate over every successful run.
#[derive(Debug)]
pub struct HarnessReport {
    /// One entry per configured policy, in configuration order.
    pub runs: Vec<PolicyRun>,
    /// Counters summed over successful runs only.
    pub aggregate: RunMetrics,
    pub elapsed: Duration,
}

impl HarnessReport {
    /// Number of runs that failed.
    pub fn failed_runs(&self) -> usize {
        self.runs.iter().filter(|run| run.result.is_err()).count()
    }
}

/// Drives N independent simulation runs over one shared, immutable trace.
pub struct Harness {
    specs: Vec<PolicySpec>,
    mode: ExecutionMode,
}

impl Harness {
    pub fn new(specs: Vec<PolicySpec>, mode: ExecutionMode) -> Self {
        Self { specs, mode }
    }

    /// Replay `trace` once per configured policy and aggregate the
    /// counters. Run order in the report always matches configuration
    /// order, whatever the execution mode.
    pub async fn run(&self, trace: Arc<Vec<Operation>>) -> HarnessReport {
        let started = Instant::now();

        let runs: Vec<PolicyRun> = match self.mode {
            ExecutionMode::Sequential => self
                .specs
                .iter()
                .map(|spec| PolicyRun {
                    spec: spec.clone(),
                    result: run_policy(spec, &trace),
                })
                .collect(),
            ExecutionMode::Concurrent => {
                let handles: Vec<_> = self
                    .specs
                    .iter()
                    .map(|spec| {
                        let spec = spec.clone();
                        let trace = trace.clone();
                        tokio::task::spawn_blocking(move || {
                            let result = run_policy(&spec, &trace);
                            PolicyRun { spec, result }
                        })
                    })
                    .collect();

                // Join barrier: all workers finish before aggregation.
                join_all(handles)
                    .await
                    .into_iter()
                    .zip(&self.specs)
                    .map(|(joined, spec)| match joined {
                        Ok(run) => run,
                        Err(err) => PolicyRun {
                            spec: spec.clone(),
                            result: Err(HarnessError::WorkerFailed {
                                name: spec.name.clone(),
                                reason: err.to_string(),
                            }),
                        },
                    })
                    .collect()
            }
        };

        let mut aggregate = RunMetrics::default();
        for run in &runs {
            if let Ok(report) = &run.result {
                aggregate.absorb(&report.metrics);
            }
        }

        HarnessReport {
            runs,
            aggregate,
            elapsed: started.elapsed(),
        }
    }
}

/// One full replay: construct the cache, drain the trace, time it.
fn run_policy(spec: &PolicySpec, trace: &[Operation]) -> Result<RunReport, HarnessError> {
    let cache = EvictionCache::new(spec.policy, spec.capacity, spec.decay_factor).map_err(
        |source| HarnessError::Construction {
            name: spec.name.clone(),
            source,
        },
    )?;

    let started = Instant::now();
    let (records, metrics) = Replay::new(cache, trace).run_to_end();
    let elapsed = started.elapsed();

    debug!(
        policy = %spec.policy,
        name = spec.name,
        hits = metrics.hits,
        misses = metrics.misses,
        elapsed_us = elapsed.as_micros() as u64,
        "Run complete"
    );

    Ok(RunReport {
        records,
        metrics,
        elapsed,
    })
}
