// Copyright (c) 2025 - Cowboy AI, Inc.
//! SIAM testbed runner
//!
//! Cleans up the previous run, builds the services, renders their configs
//! and launches them against a SCION topology generated beforehand.
//!
//! Run with:
//! SIAM_WORK_DIR=demos cargo run --bin siam-run -- --folder demos/basic --services services.json --genpath ~/scion/gen
//!
//! Expects the working directory (or `SIAM_WORK_DIR`) to contain:
//! 1. `config/<kind>.conf` templates
//! 2. `bin/build_all.sh`
//! 3. `run/r.sh <kind> <config> <instance>`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use siam_harness::{HarnessConfig, LaunchOrchestrator, Manifest, ScriptLauncher};
use tracing::{info, warn};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "siam-run")]
#[command(about = "Render SIAM service configs and launch them on a local SCION testbed")]
struct Args {
    /// Folder with test files and config
    #[arg(long, value_name = "DIR")]
    folder: PathBuf,

    /// Services manifest, relative to --folder
    #[arg(long, value_name = "FILE")]
    services: PathBuf,

    /// Path to the gen folder of the SCION network
    #[arg(long, value_name = "DIR")]
    genpath: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = HarnessConfig::from_env(args.folder, args.services, args.genpath)
        .context("Invalid harness configuration")?;

    info!("📋 Configuration loaded:");
    info!("  - Working dir: {}", config.layout().work_dir().display());
    info!("  - Manifest: {}", config.manifest_path().display());
    info!("  - Topology: {}", config.genpath.display());
    info!("  - Barrier: {:?} (probe: {})", config.barrier.delay, config.barrier.readiness_probe);

    let launcher = ScriptLauncher::new(config.layout().clone());
    let mut orchestrator = LaunchOrchestrator::new(&config, launcher);

    info!("🧹 Cleaning up previous run");
    orchestrator
        .cleanup()
        .await
        .context("Failed to clean up previous run")?;

    let manifest = Manifest::from_file(&config.manifest_path())
        .with_context(|| format!("Failed to load {}", config.manifest_path().display()))?;

    info!("🚀 Building and launching services");
    let report = orchestrator.run(&manifest).await.context("Run aborted")?;

    let report_path = config.layout().report_path();
    report
        .write_to(&report_path)
        .context("Failed to write launch report")?;

    if report.unresolved_count() > 0 {
        warn!(
            "⚠️ {} template tokens were left unresolved, see {}",
            report.unresolved_count(),
            report_path.display()
        );
    }

    info!(
        "✅ Launched {} instances (run {})",
        report.launched.len(),
        report.run_id
    );
    Ok(())
}
