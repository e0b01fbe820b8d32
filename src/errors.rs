// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for harness operations

use std::path::PathBuf;

use thiserror::Error;

use crate::allocator::AllocationError;
use crate::domain::IdentityError;
use crate::launcher::LauncherError;
use crate::manifest::ManifestError;
use crate::state_machine::TransitionError;
use crate::topology::TopologyError;

/// Errors that abort a harness run
///
/// Every variant is fatal: the orchestrator never retries and stops at the
/// first error it sees.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Malformed `<isd>-<as>` identity
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Manifest missing or malformed
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Topology descriptor missing or malformed
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    /// Address or port space exhausted
    #[error("Allocation error: {0}")]
    Allocation(#[from] AllocationError),

    /// Template for a service kind could not be read
    #[error("Failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rendered output could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Previous run's generated directory could not be removed
    #[error("Failed to remove {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Build step, launcher script or probe failure
    #[error("Launcher error: {0}")]
    Launcher(#[from] LauncherError),

    /// Lifecycle sequencing violated
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] TransitionError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;
