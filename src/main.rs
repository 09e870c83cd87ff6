//! evict-sim binary: load a trace, run every configured policy against it,
//! persist per-operation records, and log the hit/miss summary.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use evict_sim::config::{Cli, Config};
use evict_sim::report;
use evict_sim::sim::harness::Harness;
use evict_sim::trace;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging.
    let filter = if cli.verbose {
        "evict_sim=debug"
    } else {
        "evict_sim=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .init();

    info!("evict-sim v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration and fold in CLI overrides.
    let mut config = Config::load(&cli.config)?;
    config.apply_cli(&cli);

    let specs = config.policy_specs();
    let mode = config.simulation.mode;

    info!(
        trace = %config.trace.path.display(),
        policies = specs.len(),
        mode = %mode,
        "Configuration loaded"
    );

    // Parse the trace up front; a malformed trace fails here, before any
    // policy run starts.
    let operations = trace::load(&config.trace.path)
        .with_context(|| format!("failed to load trace {:?}", config.trace.path))?;

    info!(operations = operations.len(), "Trace loaded");

    // Run every policy against the shared trace.
    let harness = Harness::new(specs, mode);
    let harness_report = harness.run(Arc::new(operations)).await;

    // Persist records and log per-run summaries.
    std::fs::create_dir_all(&config.output.dir)
        .with_context(|| format!("failed to create output dir {:?}", config.output.dir))?;

    for run in &harness_report.runs {
        match &run.result {
            Ok(run_report) => {
                let path = config
                    .output
                    .dir
                    .join(report::results_file_name(&run.spec.name, mode));
                report::write_csv(&path, &run_report.records)
                    .with_context(|| format!("failed to write results to {path:?}"))?;

                let metrics = &run_report.metrics;
                info!(
                    policy = %run.spec.policy,
                    name = run.spec.name,
                    capacity = run.spec.capacity,
                    hits = metrics.hits,
                    misses = metrics.misses,
                    hit_rate = format!("{:.2}%", metrics.hit_rate() * 100.0),
                    miss_rate = format!("{:.2}%", metrics.miss_rate() * 100.0),
                    elapsed_ms = run_report.elapsed.as_millis() as u64,
                    results = %path.display(),
                    "Run summary"
                );
            }
            Err(err) => {
                error!(name = run.spec.name, error = %err, "Run failed");
            }
        }
    }

    // Aggregate over all successful runs.
    let aggregate = &harness_report.aggregate;
    info!(
        mode = %mode,
        total_hits = aggregate.hits,
        total_misses = aggregate.misses,
        hit_rate = format!("{:.2}%", aggregate.hit_rate() * 100.0),
        miss_rate = format!("{:.2}%", aggregate.miss_rate() * 100.0),
        elapsed_ms = harness_report.elapsed.as_millis() as u64,
        "Aggregate summary"
    );

    let failed = harness_report.failed_runs();
    if failed > 0 {
        anyhow::bail!("{failed} of {} policy runs failed", harness_report.runs.len());
    }

    Ok(())
}
