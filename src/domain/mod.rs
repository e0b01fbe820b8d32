// Copyright (c) 2025 - Cowboy AI, Inc.
//! Testbed Domain Models
//!
//! Value objects shared by every stage of a harness run.
//!
//! # Value Objects with Invariants
//!
//! - [`IsdAs`] - `<isd>-<as>` identity with raw and path-escaped AS forms
//! - [`ServiceKind`] - the four service kinds, ordered by launch phase
//! - [`Endpoint`] - address plus an adjacent primary/secondary port pair

pub mod endpoint;
pub mod identity;
pub mod service_kind;

pub use endpoint::Endpoint;
pub use identity::{IdentityError, IsdAs};
pub use service_kind::{ServiceKind, UnknownServiceKind};
