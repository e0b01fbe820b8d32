// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Kind Domain Model
//!
//! The testbed runs four kinds of SIAM services. Each kind has one config
//! template, one binary name and one slot in the launch order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unknown service kind name
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown service kind: {0} (expected one of PLN, PGN, MS, SIG)")]
pub struct UnknownServiceKind(pub String);

/// Service kinds launched by the harness
///
/// Declaration order is launch order: PLN, PGN and MS come up before the
/// barrier, SIG after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceKind {
    /// PCN list service
    Pln,
    /// Path gateway node
    Pgn,
    /// Mapping service
    Ms,
    /// SCION-IP gateway
    Sig,
}

impl ServiceKind {
    /// All kinds in launch order
    pub const ALL: [ServiceKind; 4] = [Self::Pln, Self::Pgn, Self::Ms, Self::Sig];

    /// Canonical manifest key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pln => "PLN",
            Self::Pgn => "PGN",
            Self::Ms => "MS",
            Self::Sig => "SIG",
        }
    }

    /// Lowercase name used for template files, launcher arguments and process names
    pub fn lowercase(&self) -> &'static str {
        match self {
            Self::Pln => "pln",
            Self::Pgn => "pgn",
            Self::Ms => "ms",
            Self::Sig => "sig",
        }
    }

    /// Template file name under the `config/` directory
    pub fn template_file_name(&self) -> String {
        format!("{}.conf", self.lowercase())
    }

    /// Whether this kind can only start once the others are reachable
    pub fn requires_barrier(&self) -> bool {
        matches!(self, Self::Sig)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = UnknownServiceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pln" => Ok(Self::Pln),
            "pgn" => Ok(Self::Pgn),
            "ms" => Ok(Self::Ms),
            "sig" => Ok(Self::Sig),
            _ => Err(UnknownServiceKind(s.to_string())),
        }
    }
}
