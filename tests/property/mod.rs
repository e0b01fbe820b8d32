// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Allocation and rendering properties, checked with proptest.

mod allocation;
mod rendering;
