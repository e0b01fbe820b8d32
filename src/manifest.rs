// Copyright (c) 2025 - Cowboy AI, Inc.
//! Instance Manifest
//!
//! JSON document listing the instances to configure and launch:
//!
//! ```json
//! {
//!   "PLN": { "pln1": { "ia": "1-ff00:0:110" } },
//!   "PGN": { "pgn1": { "ia": "1-ff00:0:111" } },
//!   "MS":  { "ms1":  { "ia": "1-ff00:0:110" } },
//!   "SIG": { "sig1": { "ia": "1-ff00:0:112" } }
//! }
//! ```
//!
//! Kind keys are case-insensitive and a missing kind is an empty phase.
//! Instances keep their document order.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{IsdAs, ServiceKind, UnknownServiceKind};

/// Manifest loading error
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed manifest {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    UnknownServiceKind(#[from] UnknownServiceKind),

    #[error("Service kind {0} appears more than once")]
    DuplicateServiceKind(ServiceKind),

    #[error("Invalid instance name {name:?} under {kind}: {reason}")]
    InvalidInstanceName {
        kind: ServiceKind,
        name: String,
        reason: &'static str,
    },

    #[error("Instance name {name:?} is used by both {first} and {second}")]
    DuplicateInstanceName {
        name: String,
        first: ServiceKind,
        second: ServiceKind,
    },
}

/// Per-instance entry as written in the manifest
///
/// Fields other than the identity are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    #[serde(rename = "ia", alias = "identity")]
    pub identity: IsdAs,
}

/// One instance to render and launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// Unique within its kind; names the rendered config file
    pub name: String,
    pub identity: IsdAs,
}

/// Loaded manifest, read-only for the run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    services: BTreeMap<ServiceKind, Vec<ServiceInstance>>,
}

impl Manifest {
    /// Load a manifest from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse a manifest from a JSON string
    pub fn from_json(content: &str) -> Result<Self, ManifestError> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ManifestError> {
        let raw: IndexMap<String, IndexMap<String, InstanceDescriptor>> =
            serde_json::from_str(content).map_err(|source| ManifestError::Parse {
                origin: origin.to_string(),
                source,
            })?;

        let mut services = BTreeMap::new();
        // Names key gen/<name>.conf, so they are unique across kinds.
        let mut owners: HashMap<String, ServiceKind> = HashMap::new();
        for (key, entries) in raw {
            let kind: ServiceKind = key.parse()?;

            let mut instances = Vec::with_capacity(entries.len());
            for (name, descriptor) in entries {
                validate_instance_name(kind, &name)?;
                if let Some(&first) = owners.get(&name) {
                    return Err(ManifestError::DuplicateInstanceName {
                        name,
                        first,
                        second: kind,
                    });
                }
                owners.insert(name.clone(), kind);
                instances.push(ServiceInstance {
                    name,
                    identity: descriptor.identity,
                });
            }

            if services.insert(kind, instances).is_some() {
                return Err(ManifestError::DuplicateServiceKind(kind));
            }
        }

        let manifest = Self { services };
        debug!(
            "Loaded manifest {} with {} instances",
            origin,
            manifest.len()
        );
        Ok(manifest)
    }

    /// Instances of `kind` in document order
    pub fn instances(&self, kind: ServiceKind) -> &[ServiceInstance] {
        self.services.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of instances
    pub fn len(&self) -> usize {
        self.services.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate_instance_name(kind: ServiceKind, name: &str) -> Result<(), ManifestError> {
    let reason = if name.is_empty() {
        "empty"
    } else if name.contains(['/', '\\']) {
        "contains a path separator"
    } else if name == "." || name == ".." {
        "is a relative path component"
    } else {
        return Ok(());
    };

    Err(ManifestError::InvalidInstanceName {
        kind,
        name: name.to_string(),
        reason,
    })
}
