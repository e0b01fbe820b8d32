// Copyright (c) 2025 - Cowboy AI, Inc.
//! Endpoint Allocator
//!
//! Hands out one [`Endpoint`] per rendered config from two run-scoped
//! counters:
//!
//! ```text
//! call k:  address = 127.0.0.(address_base + k - 1)
//!          primary = port_base + 2 * (k - 1)
//!          secondary = primary + 1
//! ```
//!
//! Both counters only move forward, and they are never reset between phases,
//! so no two instances of a run share an address or a port.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use thiserror::Error;
use tracing::debug;

use crate::domain::Endpoint;

/// Allocation failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("Address space exhausted: last octet {0} is out of range")]
    AddressSpaceExhausted(u16),

    #[error("Port space exhausted at port {0}")]
    PortSpaceExhausted(u32),
}

/// Starting points of the allocator counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// First three octets of every allocated address
    pub network: [u8; 3],
    /// Last octet of the first allocated address
    pub address_base: u8,
    /// Primary port of the first allocated endpoint
    pub port_base: u16,
}

impl AllocatorConfig {
    /// Default last octet
    pub const DEFAULT_ADDRESS_BASE: u8 = 100;

    /// Default first port
    pub const DEFAULT_PORT_BASE: u16 = 2000;
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            network: [127, 0, 0],
            address_base: Self::DEFAULT_ADDRESS_BASE,
            port_base: Self::DEFAULT_PORT_BASE,
        }
    }
}

/// Sequential endpoint allocator
///
/// Construct one per run. The counters are plain fields; uniqueness holds as
/// long as a single allocator serves the whole run.
#[derive(Debug, Clone)]
pub struct EndpointAllocator {
    network: [u8; 3],
    next_host: u16,
    next_port: u32,
    allocated: usize,
}

impl EndpointAllocator {
    /// Create an allocator positioned at the configured bases
    pub fn new(config: AllocatorConfig) -> Self {
        Self {
            network: config.network,
            next_host: u16::from(config.address_base),
            next_port: u32::from(config.port_base),
            allocated: 0,
        }
    }

    /// Allocate the next `(address, primary, secondary)` triple
    pub fn allocate(&mut self) -> Result<Endpoint, AllocationError> {
        let host = u8::try_from(self.next_host)
            .map_err(|_| AllocationError::AddressSpaceExhausted(self.next_host))?;

        let primary = u16::try_from(self.next_port)
            .map_err(|_| AllocationError::PortSpaceExhausted(self.next_port))?;

        let [a, b, c] = self.network;
        let endpoint = Endpoint::new(Ipv4Addr::new(a, b, c, host), primary)
            .ok_or(AllocationError::PortSpaceExhausted(self.next_port + 1))?;

        // Skip past the secondary port so the next primary does not reuse it.
        self.next_host += 1;
        self.next_port += 2;
        self.allocated += 1;

        debug!(
            "Allocated endpoint #{}: {}",
            self.allocated, endpoint
        );

        Ok(endpoint)
    }

    /// Number of endpoints handed out so far
    pub fn allocated(&self) -> usize {
        self.allocated
    }
}

impl Default for EndpointAllocator {
    fn default() -> Self {
        Self::new(AllocatorConfig::default())
    }
}
