// crates/jux-fixtures-core/src/c14n/tests.rs
// ============================================================================
// Module: Canonicalization Tests
// Description: Unit tests for inclusive and exclusive canonical XML output.
// Purpose: Pin normalization rules against known canonical forms.
// Dependencies: jux-fixtures-core
// ============================================================================

//! ## Overview
//! Checks empty-element expansion, attribute and namespace ordering,
//! escaping, comment handling, subset canonicalization, and exclusion.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::CanonicalizationMethod;
use super::InheritedContext;
use super::canonicalize_document;
use super::canonicalize_element;
use crate::xml::parse_str;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn c14n(source: &str, method: CanonicalizationMethod) -> String {
    let doc = parse_str(source).unwrap();
    String::from_utf8(canonicalize_document(&doc, method, None)).unwrap()
}

// ============================================================================
// SECTION: Document Output
// ============================================================================

#[test]
fn expands_empty_elements_and_sorts_attributes() {
    let out = c14n(
        "<?xml version=\"1.0\"?>\n<doc><e1   /><e2   ></e2><e3   name = \"elem3\"   id=\"elem3\"   /></doc>",
        CanonicalizationMethod::Inclusive,
    );
    assert_eq!(out, "<doc><e1></e1><e2></e2><e3 id=\"elem3\" name=\"elem3\"></e3></doc>");
}

#[test]
fn escapes_text_and_attribute_values() {
    let out = c14n(
        "<a attr='\"q&#9;&lt;'>t &gt; &#13; <![CDATA[<raw>&]]></a>",
        CanonicalizationMethod::Inclusive,
    );
    assert_eq!(out, "<a attr=\"&quot;q&#x9;&lt;\">t &gt; &#xD; &lt;raw&gt;&amp;</a>");
}

#[test]
fn comments_follow_the_selected_variant() {
    let source = "<!-- lead --><a><!-- inner --><b/></a><!-- tail -->";
    assert_eq!(c14n(source, CanonicalizationMethod::Inclusive), "<a><b></b></a>");
    assert_eq!(
        c14n(source, CanonicalizationMethod::InclusiveWithComments),
        "<!-- lead -->\n<a><!-- inner --><b></b></a>\n<!-- tail -->"
    );
}

#[test]
fn processing_instructions_are_kept() {
    let out = c14n("<?pi  data?><a><?inner?></a>", CanonicalizationMethod::Inclusive);
    assert_eq!(out, "<?pi data?>\n<a><?inner?></a>");
}

#[test]
fn inclusive_drops_superfluous_declarations() {
    let out = c14n(
        "<a xmlns=\"urn:a\" xmlns:b=\"urn:b\"><c xmlns:b=\"urn:b\" xmlns:z=\"urn:z\"/></a>",
        CanonicalizationMethod::Inclusive,
    );
    assert_eq!(out, "<a xmlns=\"urn:a\" xmlns:b=\"urn:b\"><c xmlns:z=\"urn:z\"></c></a>");
}

#[test]
fn inclusive_renders_default_undeclaration_once() {
    let out = c14n("<a xmlns=\"urn:a\"><b xmlns=\"\"><c xmlns=\"\"/></b></a>", CanonicalizationMethod::Inclusive);
    assert_eq!(out, "<a xmlns=\"urn:a\"><b xmlns=\"\"><c></c></b></a>");
}

#[test]
fn exclusive_renders_only_utilized_namespaces() {
    let out = c14n(
        "<a xmlns:b=\"urn:b\" xmlns:unused=\"urn:u\"><c b:x=\"1\"><b:d/></c></a>",
        CanonicalizationMethod::Exclusive,
    );
    assert_eq!(out, "<a><c xmlns:b=\"urn:b\" b:x=\"1\"><b:d></b:d></c></a>");
}

#[test]
fn attributes_sort_by_namespace_uri_then_local_name() {
    let out = c14n(
        "<a xmlns:z=\"urn:a\" xmlns:y=\"urn:b\" y:attr=\"2\" z:attr=\"1\" plain=\"0\"/>",
        CanonicalizationMethod::Inclusive,
    );
    assert_eq!(
        out,
        "<a xmlns:y=\"urn:b\" xmlns:z=\"urn:a\" plain=\"0\" z:attr=\"1\" y:attr=\"2\"></a>"
    );
}

#[test]
fn excluded_subtree_is_omitted() {
    let doc = parse_str("<a><keep/><drop><x/></drop></a>").unwrap();
    let drop = doc.root().find_child(None, "drop").unwrap();
    let out = canonicalize_document(&doc, CanonicalizationMethod::Inclusive, Some(drop));
    assert_eq!(String::from_utf8(out).unwrap(), "<a><keep></keep></a>");
}

// ============================================================================
// SECTION: Subset Output
// ============================================================================

#[test]
fn subset_apex_receives_inherited_namespaces() {
    let doc = parse_str(
        "<root xmlns:p=\"urn:p\" xml:lang=\"en\"><Sig xmlns=\"urn:sig\"><Info><M a=\"1\"/></Info></Sig></root>",
    )
    .unwrap();
    let sig = doc.root().find_child(Some("urn:sig"), "Sig").unwrap();
    let info = sig.find_child(Some("urn:sig"), "Info").unwrap();
    let context = InheritedContext::new().descend(doc.root()).descend(sig);

    let inclusive = canonicalize_element(info, &context, CanonicalizationMethod::Inclusive);
    assert_eq!(
        String::from_utf8(inclusive).unwrap(),
        "<Info xmlns=\"urn:sig\" xmlns:p=\"urn:p\" xml:lang=\"en\"><M a=\"1\"></M></Info>"
    );

    let exclusive = canonicalize_element(info, &context, CanonicalizationMethod::Exclusive);
    assert_eq!(
        String::from_utf8(exclusive).unwrap(),
        "<Info xmlns=\"urn:sig\"><M a=\"1\"></M></Info>"
    );
}

#[test]
fn method_labels_and_uris_resolve() {
    for method in [
        CanonicalizationMethod::Inclusive,
        CanonicalizationMethod::InclusiveWithComments,
        CanonicalizationMethod::Exclusive,
        CanonicalizationMethod::ExclusiveWithComments,
    ] {
        assert_eq!(CanonicalizationMethod::from_uri(method.uri()), Some(method));
        assert_eq!(method.label().parse::<CanonicalizationMethod>().unwrap(), method);
    }
    assert!("c14n-2.0".parse::<CanonicalizationMethod>().is_err());
}
