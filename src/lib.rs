//! Test harness for SIAM services on a local SCION testbed
//!
//! Renders one config per service instance from templates, hands each
//! instance a unique loopback endpoint, and launches the services in
//! dependency order: PLN, PGN, MS, a barrier, then SIG.

pub mod allocator;
pub mod barrier;
pub mod config;
pub mod domain;
pub mod errors;
pub mod launcher;
pub mod manifest;
pub mod materializer;
pub mod orchestrator;
pub mod state_machine;
pub mod template;
pub mod topology;

// Re-export commonly used types
pub use allocator::{AllocatorConfig, EndpointAllocator};
pub use barrier::{Barrier, BarrierConfig, FixedDelay, TcpReadinessProbe};
pub use config::{HarnessConfig, WorkspaceLayout};
pub use errors::{HarnessError, HarnessResult};
pub use launcher::{LauncherError, ProcessLauncher, ScriptLauncher};
pub use manifest::Manifest;
pub use materializer::{ConfigMaterializer, RenderedConfig};
pub use orchestrator::{LaunchOrchestrator, LaunchReport};
pub use topology::TopologyReader;
