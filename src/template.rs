// Copyright (c) 2025 - Cowboy AI, Inc.
//! Sentinel Placeholder Templates
//!
//! Service config templates are plain text with fixed `#NAME#` sentinels.
//! A template is parsed once into a list of literal and placeholder
//! segments, then rendered in a single pass against a value map:
//!
//! ```text
//! "port = #PORT#\n"  ──parse──>  [Text("port = "), Slot(Port), Text("\n")]
//!                    ──render──> "port = 2000\n"
//! ```
//!
//! Because substituted values are never re-scanned, replacement order cannot
//! matter and a value that happens to contain a sentinel stays literal.
//!
//! Tokens that look like sentinels (`#UPPER_CASE#`) but are not recognized are
//! copied to the output unchanged and reported in [`Rendered::unresolved`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Recognized placeholder sentinels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Placeholder {
    /// Instance name
    Id,
    /// Root of the generated topology tree
    GenPath,
    /// Isolation domain
    IsdId,
    /// Raw AS identifier (`ff00:0:110`)
    AsId,
    /// Path-escaped AS identifier (`ff00_0_110`)
    AsIdEscaped,
    /// Allocated listen address
    Ip,
    /// Allocated primary port
    Port,
    /// Allocated secondary (QUIC) port
    QuicPort,
    /// Service-discovery address from the topology descriptor
    SdAddr,
    /// Database file name
    Db,
}

impl Placeholder {
    /// Every recognized placeholder
    pub const ALL: [Placeholder; 10] = [
        Self::Id,
        Self::GenPath,
        Self::IsdId,
        Self::AsId,
        Self::AsIdEscaped,
        Self::Ip,
        Self::Port,
        Self::QuicPort,
        Self::SdAddr,
        Self::Db,
    ];

    /// Literal sentinel as it appears in templates
    pub fn sentinel(&self) -> &'static str {
        match self {
            Self::Id => "#ID#",
            Self::GenPath => "#GEN_PATH#",
            Self::IsdId => "#ISD_ID#",
            Self::AsId => "#AS_ID#",
            Self::AsIdEscaped => "#AS_ID_#",
            Self::Ip => "#IP#",
            Self::Port => "#PORT#",
            Self::QuicPort => "#QUIC_PORT#",
            Self::SdAddr => "#SD_ADDR#",
            Self::Db => "#DB#",
        }
    }

    // No sentinel is a prefix of another, so at most one can match.
    fn match_at(input: &str) -> Option<Placeholder> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| input.starts_with(p.sentinel()))
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sentinel())
    }
}

/// Values bound to placeholders for one render
pub type PlaceholderValues = BTreeMap<Placeholder, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot(Placeholder),
}

/// Parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

/// Output of [`Template::render`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Fully substituted text
    pub text: String,
    /// Sentinel-shaped tokens left in `text`, in order of appearance
    pub unresolved: Vec<String>,
}

impl Template {
    /// Split `source` into literal text and recognized placeholders
    pub fn parse(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut segments = Vec::new();
        let mut text_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] == b'#' {
                if let Some(placeholder) = Placeholder::match_at(&source[i..]) {
                    if text_start < i {
                        segments.push(Segment::Text(source[text_start..i].to_string()));
                    }
                    segments.push(Segment::Slot(placeholder));
                    i += placeholder.sentinel().len();
                    text_start = i;
                    continue;
                }
            }
            i += 1;
        }

        if text_start < bytes.len() {
            segments.push(Segment::Text(source[text_start..].to_string()));
        }

        Self { segments }
    }

    /// Placeholders referenced by the template, deduplicated
    pub fn placeholders(&self) -> Vec<Placeholder> {
        let mut found: Vec<Placeholder> = self
            .segments
            .iter()
            .filter_map(|s| match s {
                Segment::Slot(p) => Some(*p),
                Segment::Text(_) => None,
            })
            .collect();
        found.sort();
        found.dedup();
        found
    }

    /// Substitute every placeholder in one pass
    ///
    /// A recognized placeholder with no value in `values` is left as its
    /// sentinel and reported as unresolved, same as an unknown token.
    pub fn render(&self, values: &PlaceholderValues) -> Rendered {
        let mut text = String::new();
        let mut unresolved = Vec::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(literal) => {
                    unresolved.extend(sentinel_like_tokens(literal));
                    text.push_str(literal);
                }
                Segment::Slot(placeholder) => match values.get(placeholder) {
                    Some(value) => text.push_str(value),
                    None => {
                        unresolved.push(placeholder.sentinel().to_string());
                        text.push_str(placeholder.sentinel());
                    }
                },
            }
        }

        Rendered { text, unresolved }
    }
}

/// `#UPPER_CASE#` tokens in `text`
fn sentinel_like_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('#') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('#') else {
            break;
        };
        let name = &after[..close];
        let looks_like_sentinel = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase())
            && name
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');

        if looks_like_sentinel {
            tokens.push(format!("#{name}#"));
            rest = &after[close + 1..];
        } else {
            // The closing '#' may open the next token.
            rest = &after[close..];
        }
    }

    tokens
}
