// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Endpoint Allocation
//!
//! The allocator is the only source of listen addresses in a run, so its
//! output must never collide, whatever the bases and run length.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use proptest::prelude::*;
use siam_harness::allocator::AllocationError;
use siam_harness::{AllocatorConfig, EndpointAllocator};

// ============================================================================
// Strategies
// ============================================================================

/// Bases and a run length that stay inside the address and port spaces
fn bounded_run() -> impl Strategy<Value = (u8, u16, usize)> {
    (0u8..=200, 1024u16..=60000, 1usize..=55)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: No two allocations share an address or a port
    #[test]
    fn prop_allocations_never_overlap((address_base, port_base, count) in bounded_run()) {
        let mut allocator = EndpointAllocator::new(AllocatorConfig {
            address_base,
            port_base,
            ..AllocatorConfig::default()
        });

        let mut addresses = HashSet::new();
        let mut ports = HashSet::new();
        for _ in 0..count {
            let endpoint = allocator.allocate().expect("run fits the address space");
            prop_assert!(addresses.insert(endpoint.address()), "address reused: {}", endpoint);
            prop_assert!(ports.insert(endpoint.primary_port()), "primary reused: {}", endpoint);
            prop_assert!(ports.insert(endpoint.secondary_port()), "secondary reused: {}", endpoint);
        }
        prop_assert_eq!(allocator.allocated(), count);
    }

    /// Property: The k-th allocation is a pure function of k and the bases
    #[test]
    fn prop_kth_allocation_follows_formula((address_base, port_base, count) in bounded_run()) {
        let config = AllocatorConfig { address_base, port_base, ..AllocatorConfig::default() };
        let mut allocator = EndpointAllocator::new(config);

        for k in 0..count {
            let endpoint = allocator.allocate().expect("run fits the address space");
            let expected_port = port_base + 2 * k as u16;
            prop_assert_eq!(endpoint.address(), Ipv4Addr::new(127, 0, 0, address_base + k as u8));
            prop_assert_eq!(endpoint.primary_port(), expected_port);
            prop_assert_eq!(endpoint.secondary_port(), expected_port + 1);
        }
    }

    /// Property: Exhaustion is reported, never wrapped around
    #[test]
    fn prop_exhaustion_is_an_error(address_base in 200u8..=255) {
        let mut allocator = EndpointAllocator::new(AllocatorConfig {
            address_base,
            ..AllocatorConfig::default()
        });

        let available = 256 - usize::from(address_base);
        for _ in 0..available {
            prop_assert!(allocator.allocate().is_ok());
        }
        prop_assert_eq!(
            allocator.allocate(),
            Err(AllocationError::AddressSpaceExhausted(256))
        );
    }
}
