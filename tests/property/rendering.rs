// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Template Rendering and Identities
//!
//! Rendering is a single pass over the template: every recognized sentinel
//! is replaced by its value, values are never scanned again, and literal
//! text is copied through untouched.

use proptest::prelude::*;
use siam_harness::domain::IsdAs;
use siam_harness::template::{Placeholder, PlaceholderValues, Template};

// ============================================================================
// Strategies
// ============================================================================

/// Literal template text without sentinel delimiters
fn literal() -> impl Strategy<Value = String> {
    "[a-z0-9 =:./\"\n\\[\\]]{0,16}"
}

/// Substitution values, including ones that look like sentinels
fn value() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9:._/-]{1,24}",
        prop::sample::select(Placeholder::ALL.to_vec()).prop_map(|p| p.sentinel().to_string()),
    ]
}

/// Every placeholder once, in random order, interleaved with literals
fn template_parts() -> impl Strategy<Value = (Vec<Placeholder>, Vec<String>)> {
    (
        Just(Placeholder::ALL.to_vec()).prop_shuffle(),
        prop::collection::vec(literal(), Placeholder::ALL.len() + 1),
    )
}

fn values_strategy() -> impl Strategy<Value = PlaceholderValues> {
    prop::collection::vec(value(), Placeholder::ALL.len()).prop_map(|values| {
        Placeholder::ALL.iter().copied().zip(values).collect()
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: A fully bound template renders to the interleaving of literals and values
    #[test]
    fn prop_full_binding_leaves_nothing_unresolved(
        (order, literals) in template_parts(),
        values in values_strategy(),
    ) {
        let mut source = String::new();
        let mut expected = String::new();
        for (placeholder, text) in order.iter().zip(&literals) {
            source.push_str(text);
            source.push_str(placeholder.sentinel());
            expected.push_str(text);
            expected.push_str(&values[placeholder]);
        }
        let tail = literals.last().expect("one more literal than placeholders");
        source.push_str(tail);
        expected.push_str(tail);

        let rendered = Template::parse(&source).render(&values);

        prop_assert_eq!(rendered.text, expected);
        prop_assert!(rendered.unresolved.is_empty(), "unresolved: {:?}", rendered.unresolved);
    }

    /// Property: Every sentinel is discovered once, whatever the order or repetition
    #[test]
    fn prop_placeholders_deduplicated((order, literals) in template_parts()) {
        let once: String = order
            .iter()
            .zip(&literals)
            .map(|(placeholder, text)| format!("{text}{}", placeholder.sentinel()))
            .collect();
        let twice = format!("{once}{once}");

        prop_assert_eq!(Template::parse(&twice).placeholders(), Placeholder::ALL.to_vec());
    }

    /// Property: Text without sentinels renders unchanged
    #[test]
    fn prop_plain_text_is_identity(text in literal(), values in values_strategy()) {
        let rendered = Template::parse(&text).render(&values);
        prop_assert_eq!(rendered.text, text);
    }

    /// Property: The escaped AS identifier only swaps group separators
    #[test]
    fn prop_identity_escaping(
        isd in "[1-9][0-9]{0,3}",
        groups in prop::collection::vec("[0-9a-f]{1,4}", 1..=3),
    ) {
        let as_id = groups.join(":");
        let identity = IsdAs::new(format!("{isd}-{as_id}")).expect("well-formed identity");

        prop_assert_eq!(identity.isd(), isd.as_str());
        prop_assert_eq!(identity.as_id(), as_id.as_str());
        prop_assert_eq!(identity.as_id_escaped(), groups.join("_"));
        prop_assert_eq!(identity.to_string(), format!("{isd}-{as_id}"));
    }
}
