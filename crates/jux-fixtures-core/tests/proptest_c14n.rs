// crates/jux-fixtures-core/tests/proptest_c14n.rs
// ============================================================================
// Module: Canonicalization Property-Based Tests
// Description: Randomized documents through parse, serialize, and c14n.
// Purpose: Ensure canonical output is a fixed point and rewrites are lossless.
// ============================================================================

//! ## Overview
//! Generates small JUnit-shaped documents with arbitrary attribute values
//! and text, then checks that canonicalizing the canonical form changes
//! nothing, that serialization preserves the canonical form, and that
//! enrichment followed by stripping restores the semantic view.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;

use jux_fixtures_core::CanonicalizationMethod;
use jux_fixtures_core::Enricher;
use jux_fixtures_core::ExistingPolicy;
use jux_fixtures_core::Metadata;
use jux_fixtures_core::c14n::canonicalize_document;
use jux_fixtures_core::enrich::strip_tool_properties;
use jux_fixtures_core::junit::TestSuiteDocument;
use jux_fixtures_core::xml::escape_attribute;
use jux_fixtures_core::xml::escape_text;
use jux_fixtures_core::xml::parse_str;
use proptest::prelude::*;

// ============================================================================
// SECTION: Strategies
// ============================================================================

fn attributes() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("a[a-z0-9_]{0,7}", "[ -~\t\n]{0,16}", 0 .. 4)
}

fn test_case() -> impl Strategy<Value = String> {
    (attributes(), prop::option::of("[ -~\n]{0,24}")).prop_map(|(attributes, failure)| {
        let mut out = String::from("<testcase");
        for (name, value) in &attributes {
            out.push_str(&format!(" {name}=\"{}\"", escape_attribute(value)));
        }
        match failure {
            Some(text) => out.push_str(&format!("><failure>{}</failure></testcase>", escape_text(&text))),
            None => out.push_str("/>"),
        }
        out
    })
}

fn document() -> impl Strategy<Value = String> {
    (attributes(), prop::collection::vec(test_case(), 0 .. 5), "[ \n]{0,3}").prop_map(
        |(attributes, cases, indent)| {
            let mut out = String::from("<?xml version=\"1.0\"?>\n<!-- generated -->\n<testsuite");
            for (name, value) in &attributes {
                out.push_str(&format!(" {name}=\"{}\"", escape_attribute(value)));
            }
            out.push('>');
            for case in cases {
                out.push_str(&indent);
                out.push_str(&case);
            }
            out.push_str("</testsuite>\n");
            out
        },
    )
}

fn canonical(source: &str, method: CanonicalizationMethod) -> String {
    let document = parse_str(source).unwrap();
    String::from_utf8(canonicalize_document(&document, method, None)).unwrap()
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #[test]
    fn canonical_form_is_a_fixed_point(source in document()) {
        for method in [CanonicalizationMethod::Inclusive, CanonicalizationMethod::ExclusiveWithComments] {
            let once = canonical(&source, method);
            let twice = canonical(&once, method);
            prop_assert_eq!(once, twice);
        }
    }

    #[test]
    fn serialization_preserves_the_canonical_form(source in document()) {
        let document = parse_str(&source).unwrap();
        let rewritten = document.to_xml_string();
        prop_assert_eq!(
            canonical(&source, CanonicalizationMethod::Inclusive),
            canonical(&rewritten, CanonicalizationMethod::Inclusive)
        );
    }

    #[test]
    fn strip_after_enrich_restores_the_view(source in document()) {
        let raw = TestSuiteDocument::from_document(&parse_str(&source).unwrap()).unwrap();
        let enricher = Enricher::new(Metadata::from_static("2025-01-15T10:30:00Z"), ExistingPolicy::Update);
        let mut document = parse_str(&source).unwrap();
        enricher.enrich(&mut document).unwrap();
        let mut enriched = parse_str(&document.to_xml_string()).unwrap();
        prop_assert_eq!(strip_tool_properties(&mut enriched).unwrap(), 11);
        let stripped = TestSuiteDocument::from_document(&parse_str(&enriched.to_xml_string()).unwrap()).unwrap();
        prop_assert_eq!(stripped, raw);
    }
}
