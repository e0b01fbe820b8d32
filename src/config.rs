// Copyright (c) 2025 - Cowboy AI, Inc.
//! Harness configuration
//!
//! The three CLI values (`--folder`, `--services`, `--genpath`) are combined
//! with tunables read from the environment:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `SIAM_WORK_DIR` | current directory | root holding `config/`, `gen/`, `run/`, `bin/` |
//! | `SIAM_BARRIER_SECS` | `20` | pause between the MS and SIG phases |
//! | `SIAM_READINESS_PROBE` | off | probe earlier endpoints instead of sleeping blindly |
//! | `SIAM_ADDRESS_BASE` | `100` | last octet of the first allocated address |
//! | `SIAM_PORT_BASE` | `2000` | first allocated port |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::allocator::AllocatorConfig;
use crate::barrier::BarrierConfig;
use crate::domain::ServiceKind;
use crate::errors::{HarnessError, HarnessResult};

/// Fixed directory layout under the working directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceLayout {
    work_dir: PathBuf,
}

impl WorkspaceLayout {
    /// Layout rooted at `work_dir`
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Service config templates
    pub fn config_dir(&self) -> PathBuf {
        self.work_dir.join("config")
    }

    /// Rendered configs; wiped at the start of every run
    pub fn gen_dir(&self) -> PathBuf {
        self.work_dir.join("gen")
    }

    /// Directory the launcher script runs in
    pub fn run_dir(&self) -> PathBuf {
        self.work_dir.join("run")
    }

    /// Directory the build script runs in
    pub fn bin_dir(&self) -> PathBuf {
        self.work_dir.join("bin")
    }

    pub fn run_script(&self) -> PathBuf {
        self.run_dir().join("r.sh")
    }

    pub fn build_script(&self) -> PathBuf {
        self.bin_dir().join("build_all.sh")
    }

    /// Template for `kind`
    pub fn template_path(&self, kind: ServiceKind) -> PathBuf {
        self.config_dir().join(kind.template_file_name())
    }

    /// Rendered config for `instance`
    pub fn rendered_path(&self, instance: &str) -> PathBuf {
        self.gen_dir().join(format!("{instance}.conf"))
    }

    /// Summary of the last run
    pub fn report_path(&self) -> PathBuf {
        self.gen_dir().join("launch-report.json")
    }
}

/// Complete configuration of one harness run
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Folder holding the manifest
    pub folder: PathBuf,
    /// Manifest file name, relative to `folder`
    pub services: PathBuf,
    /// Root of the generated SCION topology
    pub genpath: PathBuf,
    /// Working directory layout
    pub layout: WorkspaceLayout,
    /// Allocator starting points
    pub allocator: AllocatorConfig,
    /// Barrier strategy between phases 3 and 4
    pub barrier: BarrierConfig,
}

impl HarnessConfig {
    /// Configuration with default tunables
    pub fn new(
        folder: impl Into<PathBuf>,
        services: impl Into<PathBuf>,
        genpath: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            folder: folder.into(),
            services: services.into(),
            genpath: genpath.into(),
            layout: WorkspaceLayout::new(work_dir),
            allocator: AllocatorConfig::default(),
            barrier: BarrierConfig::default(),
        }
    }

    /// Load tunables from environment variables
    pub fn from_env(
        folder: impl Into<PathBuf>,
        services: impl Into<PathBuf>,
        genpath: impl Into<PathBuf>,
    ) -> HarnessResult<Self> {
        Self::from_lookup(folder, services, genpath, |key| std::env::var(key).ok())
    }

    /// Load tunables through `lookup`
    pub fn from_lookup<F>(
        folder: impl Into<PathBuf>,
        services: impl Into<PathBuf>,
        genpath: impl Into<PathBuf>,
        lookup: F,
    ) -> HarnessResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cwd = std::env::current_dir().map_err(|e| {
            HarnessError::Configuration(format!("Cannot determine working directory: {e}"))
        })?;

        // Launcher scripts run in other directories, so keep every path absolute.
        let work_dir = match lookup("SIAM_WORK_DIR") {
            Some(dir) => cwd.join(dir),
            None => cwd,
        };

        let genpath: PathBuf = genpath.into();
        // The topology root is substituted into configs as text.
        if genpath.to_str().is_none() {
            return Err(HarnessError::Configuration(format!(
                "Topology path {} is not valid UTF-8",
                genpath.display()
            )));
        }

        let mut config = Self::new(folder, services, genpath, work_dir);

        if let Some(secs) = parse_var::<u64, _>(&lookup, "SIAM_BARRIER_SECS")? {
            config.barrier.delay = Duration::from_secs(secs);
        }
        if let Some(flag) = lookup("SIAM_READINESS_PROBE") {
            config.barrier.readiness_probe = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Some(base) = parse_var::<u8, _>(&lookup, "SIAM_ADDRESS_BASE")? {
            config.allocator.address_base = base;
        }
        if let Some(base) = parse_var::<u16, _>(&lookup, "SIAM_PORT_BASE")? {
            config.allocator.port_base = base;
        }

        Ok(config)
    }

    /// Manifest location
    pub fn manifest_path(&self) -> PathBuf {
        self.folder.join(&self.services)
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> HarnessResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                HarnessError::Configuration(format!("{key}={raw:?} is invalid: {e}"))
            })
        })
        .transpose()
}
