// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Reader
//!
//! Reads the service-discovery address that the SCION topology generator
//! wrote for an AS:
//!
//! ```text
//! <genpath>/ISD<isd>/AS<as_escaped>/endhost/sd.toml
//!
//! [sd]
//! address = "127.0.0.19:30255"
//! ```
//!
//! Lookups are not cached; every rendered config re-reads its descriptor.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::IsdAs;

/// Topology descriptor lookup failure
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("Failed to read topology descriptor {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed topology descriptor {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize)]
struct SdDescriptor {
    sd: SdSection,
}

#[derive(Debug, Deserialize)]
struct SdSection {
    address: String,
}

/// Reader rooted at the topology generator's output directory
#[derive(Debug, Clone)]
pub struct TopologyReader {
    root: PathBuf,
}

impl TopologyReader {
    /// Descriptor file name inside `endhost/`
    pub const DESCRIPTOR_FILE: &'static str = "sd.toml";

    /// Create a reader for the tree under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root of the generated topology tree
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the descriptor for `ia`
    pub fn descriptor_path(&self, ia: &IsdAs) -> PathBuf {
        self.root
            .join(format!("ISD{}", ia.isd()))
            .join(format!("AS{}", ia.as_id_escaped()))
            .join("endhost")
            .join(Self::DESCRIPTOR_FILE)
    }

    /// Service-discovery address advertised for `ia`
    ///
    /// # Errors
    ///
    /// Fails when the descriptor is missing, is not TOML, or has no
    /// `sd.address` string. There is no fallback address.
    pub fn lookup_discovery_address(&self, ia: &IsdAs) -> Result<String, TopologyError> {
        let path = self.descriptor_path(ia);
        let content = std::fs::read_to_string(&path).map_err(|source| TopologyError::Read {
            path: path.clone(),
            source,
        })?;

        let descriptor: SdDescriptor =
            toml::from_str(&content).map_err(|source| TopologyError::Parse {
                path: path.clone(),
                source,
            })?;

        debug!(
            "Discovery address for {} is {} ({})",
            ia,
            descriptor.sd.address,
            path.display()
        );

        Ok(descriptor.sd.address)
    }
}
