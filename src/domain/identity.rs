// Copyright (c) 2025 - Cowboy AI, Inc.
//! ISD-AS Identity Value Object
//!
//! Every service instance lives in one autonomous system of one isolation
//! domain. The manifest spells that as `"<isd>-<as>"`, e.g. `"1-ff00:0:110"`.
//! The AS part of a SCION identity uses `:` as group separator, which the
//! topology generator rewrites to `_` in directory names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identity parsing error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Identity is empty")]
    Empty,

    #[error("Identity has no '-' separator: {0}")]
    MissingSeparator(String),

    #[error("Identity has an empty ISD component: {0}")]
    EmptyIsd(String),

    #[error("Identity has an empty AS component: {0}")]
    EmptyAs(String),
}

/// ISD-AS identity of a service instance
///
/// Invariants:
/// - Both components are non-empty
/// - The ISD component is everything before the first `-`
///
/// # Examples
///
/// ```rust
/// use siam_harness::domain::IsdAs;
///
/// let ia = IsdAs::new("1-ff00:0:110").unwrap();
/// assert_eq!(ia.isd(), "1");
/// assert_eq!(ia.as_id(), "ff00:0:110");
/// assert_eq!(ia.as_id_escaped(), "ff00_0_110");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IsdAs {
    isd: String,
    as_id: String,
}

impl IsdAs {
    /// Separator between the ISD and AS components
    pub const SEPARATOR: char = '-';

    /// Reserved character inside AS identifiers
    pub const AS_GROUP_SEPARATOR: char = ':';

    /// Replacement for [`Self::AS_GROUP_SEPARATOR`] in filesystem paths
    pub const AS_PATH_SEPARATOR: char = '_';

    /// Parse an identity string
    pub fn new(identity: impl AsRef<str>) -> Result<Self, IdentityError> {
        let identity = identity.as_ref().trim();

        if identity.is_empty() {
            return Err(IdentityError::Empty);
        }

        let (isd, as_id) = identity
            .split_once(Self::SEPARATOR)
            .ok_or_else(|| IdentityError::MissingSeparator(identity.to_string()))?;

        if isd.is_empty() {
            return Err(IdentityError::EmptyIsd(identity.to_string()));
        }
        if as_id.is_empty() {
            return Err(IdentityError::EmptyAs(identity.to_string()));
        }

        Ok(Self {
            isd: isd.to_string(),
            as_id: as_id.to_string(),
        })
    }

    /// Isolation domain component
    pub fn isd(&self) -> &str {
        &self.isd
    }

    /// Raw autonomous system component
    pub fn as_id(&self) -> &str {
        &self.as_id
    }

    /// Autonomous system component with `:` replaced by `_`
    pub fn as_id_escaped(&self) -> String {
        self.as_id
            .replace(Self::AS_GROUP_SEPARATOR, &Self::AS_PATH_SEPARATOR.to_string())
    }
}

impl fmt::Display for IsdAs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.isd, Self::SEPARATOR, self.as_id)
    }
}

impl FromStr for IsdAs {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for IsdAs {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IsdAs> for String {
    fn from(value: IsdAs) -> Self {
        value.to_string()
    }
}
