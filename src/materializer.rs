// Copyright (c) 2025 - Cowboy AI, Inc.
//! Config Materializer
//!
//! Turns `(kind, instance, identity)` into a config file on disk:
//!
//! ```text
//! config/<kind>.conf ──parse──> Template
//!                                   │  + Endpoint      (allocator)
//!                                   │  + SD address    (topology reader)
//!                                   │  + identity / paths
//!                                   ▼
//!                         gen/<instance>.conf
//! ```
//!
//! Unknown `#TOKEN#`s in a template are written through unchanged. They are
//! logged and listed on the returned [`RenderedConfig`] but do not fail the
//! render.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::allocator::EndpointAllocator;
use crate::config::WorkspaceLayout;
use crate::domain::{Endpoint, IsdAs, ServiceKind};
use crate::errors::{HarnessError, HarnessResult};
use crate::template::{Placeholder, PlaceholderValues, Template};
use crate::topology::TopologyReader;

/// A config written for one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedConfig {
    pub kind: ServiceKind,
    pub instance: String,
    pub identity: IsdAs,
    pub endpoint: Endpoint,
    pub discovery_address: String,
    /// Location of the written file
    pub path: PathBuf,
    /// Sentinel-shaped tokens the template left unsubstituted
    pub unresolved: Vec<String>,
}

/// Renders per-instance configs from service templates
#[derive(Debug)]
pub struct ConfigMaterializer {
    layout: WorkspaceLayout,
    topology: TopologyReader,
    allocator: EndpointAllocator,
}

impl ConfigMaterializer {
    /// Create a materializer that owns the run's allocator
    pub fn new(
        layout: WorkspaceLayout,
        topology: TopologyReader,
        allocator: EndpointAllocator,
    ) -> Self {
        Self {
            layout,
            topology,
            allocator,
        }
    }

    /// Render and write the config of one instance
    ///
    /// # Errors
    ///
    /// Fails when the template is missing, the endpoint space is exhausted,
    /// the topology descriptor for `identity` cannot be read, or the output
    /// cannot be written.
    pub fn render(
        &mut self,
        kind: ServiceKind,
        instance: &str,
        identity: &IsdAs,
    ) -> HarnessResult<RenderedConfig> {
        let gen_dir = self.layout.gen_dir();
        std::fs::create_dir_all(&gen_dir).map_err(|source| HarnessError::Write {
            path: gen_dir.clone(),
            source,
        })?;

        let template_path = self.layout.template_path(kind);
        let source =
            std::fs::read_to_string(&template_path).map_err(|source| HarnessError::TemplateRead {
                path: template_path.clone(),
                source,
            })?;
        let template = Template::parse(&source);

        let endpoint = self.allocator.allocate()?;
        let discovery_address = self.topology.lookup_discovery_address(identity)?;

        let values = self.placeholder_values(instance, identity, &endpoint, &discovery_address);
        let rendered = template.render(&values);

        if !rendered.unresolved.is_empty() {
            warn!(
                "Template {} left unresolved tokens in config of {}: {}",
                template_path.display(),
                instance,
                rendered.unresolved.join(", ")
            );
        }

        let path = self.layout.rendered_path(instance);
        std::fs::write(&path, rendered.text).map_err(|source| HarnessError::Write {
            path: path.clone(),
            source,
        })?;

        info!(
            "Rendered {} config for {} ({}) at {} -> {}",
            kind,
            instance,
            identity,
            endpoint,
            path.display()
        );

        Ok(RenderedConfig {
            kind,
            instance: instance.to_string(),
            identity: identity.clone(),
            endpoint,
            discovery_address,
            path,
            unresolved: rendered.unresolved,
        })
    }

    fn placeholder_values(
        &self,
        instance: &str,
        identity: &IsdAs,
        endpoint: &Endpoint,
        discovery_address: &str,
    ) -> PlaceholderValues {
        let root = self.topology.root();
        let gen_path = match root.to_str() {
            Some(path) => path.to_string(),
            None => {
                warn!(
                    "Topology path {} is not valid UTF-8; substituting a lossy copy",
                    root.display()
                );
                root.to_string_lossy().into_owned()
            }
        };

        let values = PlaceholderValues::from([
            (Placeholder::Id, instance.to_string()),
            (Placeholder::GenPath, gen_path),
            (Placeholder::IsdId, identity.isd().to_string()),
            (Placeholder::AsId, identity.as_id().to_string()),
            (Placeholder::AsIdEscaped, identity.as_id_escaped()),
            (Placeholder::Ip, endpoint.address().to_string()),
            (Placeholder::Port, endpoint.primary_port().to_string()),
            (Placeholder::QuicPort, endpoint.secondary_port().to_string()),
            (Placeholder::SdAddr, discovery_address.to_string()),
            (Placeholder::Db, format!("{instance}.db")),
        ]);
        debug!("Placeholder values for {}: {:?}", instance, values);
        values
    }

    /// The run's allocator
    pub fn allocator(&self) -> &EndpointAllocator {
        &self.allocator
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }
}
