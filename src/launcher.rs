// Copyright (c) 2025 - Cowboy AI, Inc.
//! Process Launcher
//!
//! The harness never starts service binaries itself. It delegates three
//! operations to a [`ProcessLauncher`]:
//!
//! - `build()` compiles every binary, once per run
//! - `launch(kind, config, instance)` starts one service detached
//! - `terminate_all()` kills whatever a previous run left behind
//!
//! [`ScriptLauncher`] drives the testbed's shell scripts. Tests substitute a
//! recording fake.

use std::path::Path;
use std::process::ExitStatus;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::WorkspaceLayout;
use crate::domain::ServiceKind;

/// External process failure
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited unsuccessfully (code {code:?})")]
    NonZeroExit { command: String, code: Option<i32> },
}

/// Capability to build, start and kill service processes
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Build all service binaries; a failure aborts the run
    async fn build(&self) -> Result<(), LauncherError>;

    /// Start one instance detached
    ///
    /// Returns once the launcher has dispatched the process, not once the
    /// service is listening.
    async fn launch(
        &self,
        kind: ServiceKind,
        config_path: &Path,
        instance: &str,
    ) -> Result<(), LauncherError>;

    /// Kill every service process; failures are ignored
    async fn terminate_all(&self);

    /// Get the name of this launcher
    fn name(&self) -> &str;
}

/// Launcher backed by `bin/build_all.sh`, `run/r.sh` and `pkill`
#[derive(Debug, Clone)]
pub struct ScriptLauncher {
    layout: WorkspaceLayout,
    process_patterns: Vec<String>,
}

impl ScriptLauncher {
    /// Launcher for the scripts under `layout`, killing every service kind
    pub fn new(layout: WorkspaceLayout) -> Self {
        Self {
            layout,
            process_patterns: ServiceKind::ALL
                .iter()
                .map(|k| k.lowercase().to_string())
                .collect(),
        }
    }

    /// Process-name patterns passed to `pkill`
    pub fn process_patterns(&self) -> &[String] {
        &self.process_patterns
    }

    async fn run(command: &mut Command, label: String) -> Result<(), LauncherError> {
        let status = command
            .status()
            .await
            .map_err(|source| LauncherError::Spawn {
                command: label.clone(),
                source,
            })?;
        check_status(label, status)
    }
}

fn check_status(command: String, status: ExitStatus) -> Result<(), LauncherError> {
    if status.success() {
        Ok(())
    } else {
        Err(LauncherError::NonZeroExit {
            command,
            code: status.code(),
        })
    }
}

#[async_trait]
impl ProcessLauncher for ScriptLauncher {
    async fn build(&self) -> Result<(), LauncherError> {
        let script = self.layout.build_script();
        info!("Building services with {}", script.display());

        Self::run(
            Command::new(&script).current_dir(self.layout.bin_dir()),
            script.display().to_string(),
        )
        .await
    }

    async fn launch(
        &self,
        kind: ServiceKind,
        config_path: &Path,
        instance: &str,
    ) -> Result<(), LauncherError> {
        let script = self.layout.run_script();
        debug!(
            "{} {} {} {}",
            script.display(),
            kind.lowercase(),
            config_path.display(),
            instance
        );

        Self::run(
            Command::new(&script)
                .arg(kind.lowercase())
                .arg(config_path)
                .arg(instance)
                .current_dir(self.layout.run_dir()),
            format!("{} {}", script.display(), instance),
        )
        .await
    }

    async fn terminate_all(&self) {
        for pattern in &self.process_patterns {
            match Command::new("pkill").args(["-9", pattern]).status().await {
                // pkill exits 1 when nothing matched.
                Ok(status) => debug!("pkill -9 {} exited with {}", pattern, status),
                Err(e) => warn!("Failed to run pkill for {}: {}", pattern, e),
            }
        }
    }

    fn name(&self) -> &str {
        "script-launcher"
    }
}
