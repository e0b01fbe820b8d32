// Copyright (c) 2025 - Cowboy AI, Inc.
//! Launch Orchestrator
//!
//! Drives one harness run end to end:
//!
//! ```text
//! cleanup ─→ build ─→ PLN ─→ PGN ─→ MS ─→ barrier ─→ SIG ─→ done
//!                      │      │      │               │
//!                      └──────┴──────┴─ per instance: render → launch
//! ```
//!
//! Everything runs sequentially on the caller's task. Launches are
//! fire-and-forget: a launch call returns once the launcher script has
//! dispatched the service. The first error aborts the run; instances already
//! launched keep running until the next run's cleanup.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::allocator::EndpointAllocator;
use crate::barrier::Barrier;
use crate::config::{HarnessConfig, WorkspaceLayout};
use crate::domain::{Endpoint, ServiceKind};
use crate::errors::{HarnessError, HarnessResult};
use crate::launcher::ProcessLauncher;
use crate::manifest::Manifest;
use crate::materializer::{ConfigMaterializer, RenderedConfig};
use crate::state_machine::{
    LaunchState, LaunchStep, StateMachineWithHistory, Transition, TransitionError,
};
use crate::topology::TopologyReader;

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct LaunchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Launched instances in launch order
    pub launched: Vec<RenderedConfig>,
    pub history: Vec<Transition<LaunchState, LaunchStep>>,
}

impl LaunchReport {
    /// Instances of `kind` in launch order
    pub fn instances_of(&self, kind: ServiceKind) -> impl Iterator<Item = &RenderedConfig> {
        self.launched.iter().filter(move |c| c.kind == kind)
    }

    /// Total unresolved tokens across all rendered configs
    pub fn unresolved_count(&self) -> usize {
        self.launched.iter().map(|c| c.unresolved.len()).sum()
    }

    /// Write the report as pretty JSON
    pub fn write_to(&self, path: &std::path::Path) -> HarnessResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| HarnessError::Configuration(format!("Cannot encode report: {e}")))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| HarnessError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, json).map_err(|source| HarnessError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Sequences cleanup, build and the four launch phases
pub struct LaunchOrchestrator<L: ProcessLauncher> {
    layout: WorkspaceLayout,
    launcher: L,
    barrier: Box<dyn Barrier>,
    materializer: ConfigMaterializer,
    lifecycle: StateMachineWithHistory<LaunchState>,
}

impl<L: ProcessLauncher> LaunchOrchestrator<L> {
    /// Orchestrator for one run, with a fresh allocator
    pub fn new(config: &HarnessConfig, launcher: L) -> Self {
        let materializer = ConfigMaterializer::new(
            config.layout.clone(),
            TopologyReader::new(&config.genpath),
            EndpointAllocator::new(config.allocator),
        );

        Self {
            layout: config.layout.clone(),
            launcher,
            barrier: config.barrier.into_barrier(),
            materializer,
            lifecycle: StateMachineWithHistory::new(LaunchState::Idle),
        }
    }

    /// Replace the configured barrier
    pub fn with_barrier(mut self, barrier: Box<dyn Barrier>) -> Self {
        self.barrier = barrier;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> LaunchState {
        *self.lifecycle.current_state()
    }

    /// Lifecycle transitions so far
    pub fn history(&self) -> &[Transition<LaunchState, LaunchStep>] {
        self.lifecycle.get_history()
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Remove the previous run's output and kill its processes
    ///
    /// Safe to call repeatedly; a missing `gen/` directory is not an error.
    pub async fn cleanup(&self) -> HarnessResult<()> {
        let gen_dir = self.layout.gen_dir();
        match tokio::fs::remove_dir_all(&gen_dir).await {
            Ok(()) => info!("Removed {}", gen_dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(HarnessError::Cleanup {
                    path: gen_dir,
                    source,
                })
            }
        }

        self.launcher.terminate_all().await;
        Ok(())
    }

    /// Build, then launch every manifest instance phase by phase
    ///
    /// # Errors
    ///
    /// Returns the first failure. The lifecycle is left in
    /// [`LaunchState::Aborted`] and cannot be run again.
    pub async fn run(&mut self, manifest: &Manifest) -> HarnessResult<LaunchReport> {
        let run_id = Uuid::now_v7();
        let started_at = Utc::now();
        info!(
            "Starting run {} with {} instances via {}",
            run_id,
            manifest.len(),
            self.launcher.name()
        );

        let mut launched = Vec::with_capacity(manifest.len());
        if let Err(e) = self.drive(manifest, &mut launched).await {
            error!("Run {} aborted in {}: {}", run_id, self.state(), e);
            if let Err(abort) = self.advance(LaunchStep::Abort) {
                debug!("Run {} not marked aborted: {}", run_id, abort);
            }
            return Err(e);
        }

        info!("Run {} launched {} instances", run_id, launched.len());
        Ok(LaunchReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            launched,
            history: self.lifecycle.get_history().to_vec(),
        })
    }

    async fn drive(
        &mut self,
        manifest: &Manifest,
        launched: &mut Vec<RenderedConfig>,
    ) -> HarnessResult<()> {
        self.advance(LaunchStep::StartBuild)?;
        self.launcher.build().await?;
        self.advance(LaunchStep::BuildFinished)?;

        loop {
            let state = self.state();
            if let Some(kind) = state.service_kind() {
                self.launch_phase(kind, manifest, launched).await?;
                self.advance(LaunchStep::PhaseFinished)?;
                continue;
            }

            match state {
                LaunchState::Barrier => {
                    let endpoints: Vec<Endpoint> = launched.iter().map(|c| c.endpoint).collect();
                    info!("Barrier {} over {} endpoints", self.barrier.name(), endpoints.len());
                    self.barrier.wait(&endpoints).await?;
                    self.advance(LaunchStep::BarrierReleased)?;
                }
                LaunchState::Done => return Ok(()),
                other => {
                    return Err(TransitionError::InvalidTransition {
                        from: other.to_string(),
                        input: "launch".to_string(),
                    }
                    .into())
                }
            }
        }
    }

    async fn launch_phase(
        &mut self,
        kind: ServiceKind,
        manifest: &Manifest,
        launched: &mut Vec<RenderedConfig>,
    ) -> HarnessResult<()> {
        let instances = manifest.instances(kind);
        info!("Phase {}: launching {} {} instances", self.state(), instances.len(), kind);

        for instance in instances {
            let rendered = self
                .materializer
                .render(kind, &instance.name, &instance.identity)?;
            self.launcher
                .launch(kind, &rendered.path, &instance.name)
                .await?;
            info!("Launched {} {} on {}", kind, instance.name, rendered.endpoint);
            launched.push(rendered);
        }

        Ok(())
    }

    fn advance(&mut self, step: LaunchStep) -> HarnessResult<()> {
        self.lifecycle.transition_with_history(step, Utc::now())?;
        Ok(())
    }
}
