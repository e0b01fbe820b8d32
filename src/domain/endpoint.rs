// Copyright (c) 2025 - Cowboy AI, Inc.
//! Endpoint Value Object

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Local endpoint handed to one service instance
///
/// Invariants:
/// - `secondary_port == primary_port + 1`
/// - The address is unique within a run
///
/// The secondary port carries the QUIC listener of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    address: Ipv4Addr,
    primary_port: u16,
    secondary_port: u16,
}

impl Endpoint {
    /// Create an endpoint; returns `None` when `primary_port + 1` overflows
    pub fn new(address: Ipv4Addr, primary_port: u16) -> Option<Self> {
        let secondary_port = primary_port.checked_add(1)?;
        Some(Self {
            address,
            primary_port,
            secondary_port,
        })
    }

    /// Listen address
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Main service port
    pub fn primary_port(&self) -> u16 {
        self.primary_port
    }

    /// Companion (QUIC) port, adjacent to the primary one
    pub fn secondary_port(&self) -> u16 {
        self.secondary_port
    }

    /// Socket address of the main service port
    pub fn primary_socket(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.address, self.primary_port))
    }

    /// Socket address of the companion port
    pub fn secondary_socket(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.address, self.secondary_port))
    }

    /// Whether the two endpoints share an address or any port
    pub fn overlaps(&self, other: &Endpoint) -> bool {
        self.address == other.address
            || [self.primary_port, self.secondary_port]
                .iter()
                .any(|p| *p == other.primary_port || *p == other.secondary_port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}/{}",
            self.address, self.primary_port, self.secondary_port
        )
    }
}
