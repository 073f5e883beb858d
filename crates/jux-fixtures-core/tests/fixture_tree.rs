// crates/jux-fixtures-core/tests/fixture_tree.rs
// ============================================================================
// Module: Fixture Tree Tests
// Description: Runs the tree pipeline over the checked-in fixture set.
// Purpose: Check mirrored trees, round trips, and schema conformance.
// ============================================================================

//! ## Overview
//! Enriches, signs, strips, and validates the real `fixtures/raw` tree in
//! scratch directories and checks the tree-level properties: the three trees
//! mirror each other, stripping restores the raw view, enrichment is
//! idempotent, and every derived file still conforms to the JUnit schema.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::fs;
use std::path::Path;

use jux_fixtures_core::Enricher;
use jux_fixtures_core::ExistingPolicy;
use jux_fixtures_core::FailureKind;
use jux_fixtures_core::FixtureSigner;
use jux_fixtures_core::FixtureValidator;
use jux_fixtures_core::FixtureVerifier;
use jux_fixtures_core::Metadata;
use jux_fixtures_core::Schema;
use jux_fixtures_core::SignOptions;
use jux_fixtures_core::enrich::MetadataKey;
use jux_fixtures_core::enrich::TOOL_PROPERTY_PREFIX;
use jux_fixtures_core::enrich_tree;
use jux_fixtures_core::events::NoopEventSink;
use jux_fixtures_core::junit::TestSuiteDocument;
use jux_fixtures_core::load_signing_key_pem;
use jux_fixtures_core::load_verifying_key_pem;
use jux_fixtures_core::sign_tree;
use jux_fixtures_core::strip_tree;
use jux_fixtures_core::validate_tree;
use jux_fixtures_core::verify_tree;
use jux_fixtures_core::xml::parse_str;

use crate::common::fixtures_dir;
use crate::common::key;
use crate::common::malformed_dir;
use crate::common::raw_dir;
use crate::common::schema_path;
use crate::common::xml_files;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const TIMESTAMP: &str = "2025-01-15T10:30:00Z";

fn enricher() -> Enricher {
    Enricher::new(Metadata::from_static(TIMESTAMP), ExistingPolicy::Update)
}

fn view(path: &Path) -> TestSuiteDocument {
    let text = fs::read_to_string(path).unwrap();
    TestSuiteDocument::from_document(&parse_str(&text).unwrap()).unwrap()
}

fn schema_validator() -> FixtureValidator {
    FixtureValidator::new(Some(Schema::load(&schema_path()).unwrap()), false)
}

// ============================================================================
// SECTION: Mirrored Trees
// ============================================================================

#[test]
fn raw_enriched_and_signed_trees_mirror_each_other() {
    let scratch = tempfile::tempdir().unwrap();
    let enriched = scratch.path().join("enriched");
    let signed = scratch.path().join("signed");
    let signer = FixtureSigner::new(load_signing_key_pem(&key("rsa-2048.pem")).unwrap(), SignOptions::default());

    let enrich_report = enrich_tree(&raw_dir(), &enriched, &enricher(), &NoopEventSink).unwrap();
    let sign_report = sign_tree(&enriched, &signed, &signer, &NoopEventSink).unwrap();

    assert!(enrich_report.is_success());
    assert!(sign_report.is_success());
    let raw_files = xml_files(&raw_dir());
    assert_eq!(xml_files(&enriched), raw_files);
    assert_eq!(xml_files(&signed), raw_files);

    let verifier = FixtureVerifier::new(load_verifying_key_pem(&key("rsa-2048.pub.pem")).unwrap());
    let verify_report = verify_tree(&signed, &verifier, &NoopEventSink).unwrap();
    assert!(verify_report.is_success());
    assert_eq!(verify_report.summary.total, raw_files.len());
}

#[test]
fn stripping_the_enriched_tree_restores_the_raw_view() {
    let scratch = tempfile::tempdir().unwrap();
    let enriched = scratch.path().join("enriched");
    let stripped = scratch.path().join("stripped");

    enrich_tree(&raw_dir(), &enriched, &enricher(), &NoopEventSink).unwrap();
    let report = strip_tree(&enriched, &stripped, &NoopEventSink).unwrap();

    assert!(report.is_success());
    for relative in xml_files(&raw_dir()) {
        assert_eq!(view(&stripped.join(&relative)), view(&raw_dir().join(&relative)), "{relative}");
    }
}

#[test]
fn enriching_an_enriched_tree_changes_nothing() {
    let scratch = tempfile::tempdir().unwrap();
    let once = scratch.path().join("once");
    let twice = scratch.path().join("twice");

    enrich_tree(&raw_dir(), &once, &enricher(), &NoopEventSink).unwrap();
    let report = enrich_tree(&once, &twice, &enricher(), &NoopEventSink).unwrap();

    assert!(report.files.iter().all(|file| file.enrichment.is_some_and(|outcome| outcome.inserted == 0)));
    for relative in xml_files(&once) {
        let first = fs::read_to_string(once.join(&relative)).unwrap();
        let second = fs::read_to_string(twice.join(&relative)).unwrap();
        assert_eq!(first, second, "{relative}");
    }
}

#[test]
fn simple_suite_gains_exactly_the_ordered_tool_properties() {
    let scratch = tempfile::tempdir().unwrap();
    let enriched = scratch.path().join("enriched");

    enrich_tree(&raw_dir(), &enriched, &enricher(), &NoopEventSink).unwrap();

    let text = fs::read_to_string(enriched.join("generic/simple_suite.xml")).unwrap();
    let document = parse_str(&text).unwrap();
    let root = document.root();
    assert_eq!(root.attribute("tests"), Some("3"));
    assert_eq!(root.attribute("failures"), Some("1"));
    assert_eq!(root.child_elements().next().unwrap().local_name(), "properties");

    let view = TestSuiteDocument::from_document(&document).unwrap();
    let names: Vec<&str> = view.root.properties.iter().map(|entry| entry.name.as_str()).collect();
    let expected: Vec<&str> = MetadataKey::ALL.iter().map(|key| key.property_name()).collect();
    assert_eq!(names, expected);
    assert!(names.iter().all(|name| name.starts_with(TOOL_PROPERTY_PREFIX)));
    let timestamp = view.root.properties.iter().find(|entry| entry.name == "jux.timestamp").unwrap();
    assert_eq!(timestamp.value, TIMESTAMP);

    let summary = view.summary();
    assert_eq!(summary.test_cases, 3);
    assert_eq!(summary.failures, 1);
}

#[test]
fn test_case_markup_is_byte_identical_after_enrichment() {
    let scratch = tempfile::tempdir().unwrap();
    let enriched = scratch.path().join("enriched");

    enrich_tree(&raw_dir(), &enriched, &enricher(), &NoopEventSink).unwrap();

    let raw = fs::read_to_string(raw_dir().join("surefire/surefire_report.xml")).unwrap();
    let out = fs::read_to_string(enriched.join("surefire/surefire_report.xml")).unwrap();
    let start = raw.find("<testcase").unwrap();
    let end = raw.find("</testsuite>").unwrap();
    assert!(out.contains(&raw[start .. end]));
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn every_tree_conforms_to_the_junit_schema() {
    let scratch = tempfile::tempdir().unwrap();
    let enriched = scratch.path().join("enriched");
    let signed = scratch.path().join("signed");
    let signer = FixtureSigner::new(load_signing_key_pem(&key("ec-p256.pem")).unwrap(), SignOptions::default());
    enrich_tree(&raw_dir(), &enriched, &enricher(), &NoopEventSink).unwrap();
    sign_tree(&enriched, &signed, &signer, &NoopEventSink).unwrap();

    for root in [raw_dir(), enriched, signed] {
        let report = validate_tree(&root, &schema_validator(), &NoopEventSink).unwrap();
        let failed: Vec<_> = report.failed_files().map(|file| (&file.path, &file.failures)).collect();
        assert!(failed.is_empty(), "{}: {failed:?}", root.display());
    }
}

#[test]
fn malformed_fixtures_fail_with_locations() {
    let report = validate_tree(&malformed_dir(), &FixtureValidator::default(), &NoopEventSink).unwrap();

    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.failed, 2);
    for file in &report.files {
        let failure = file.first_failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Malformed);
        assert!(failure.line.is_some(), "{}", file.path);
    }
}

#[test]
fn whole_fixture_root_skips_malformed_only_on_request() {
    let root = fixtures_dir();
    let strict = validate_tree(&root, &FixtureValidator::default(), &NoopEventSink).unwrap();
    let skipping = validate_tree(&root, &FixtureValidator::new(None, true), &NoopEventSink).unwrap();

    assert_eq!(strict.summary.failed, 2);
    assert!(skipping.is_success());
    assert_eq!(skipping.summary.total, strict.summary.total - 2);
}

#[test]
fn schema_violations_carry_constraint_and_location() {
    let scratch = tempfile::tempdir().unwrap();
    fs::write(
        scratch.path().join("bad.xml"),
        "<testsuite name=\"s\" tests=\"three\">\n  <testcase classname=\"c\"/>\n  <bogus/>\n</testsuite>\n",
    )
    .unwrap();

    let report = validate_tree(scratch.path(), &schema_validator(), &NoopEventSink).unwrap();

    let failures = &report.files[0].failures;
    assert!(failures.iter().all(|failure| failure.kind == FailureKind::Nonconforming));
    let constraints: Vec<&str> = failures.iter().filter_map(|failure| failure.constraint.as_deref()).collect();
    assert!(constraints.contains(&"cvc-datatype-valid.1.2.1"), "{constraints:?}");
    assert!(constraints.contains(&"cvc-complex-type.4"), "{constraints:?}");
    assert!(constraints.contains(&"cvc-complex-type.2.4"), "{constraints:?}");
    let missing_name = failures.iter().find(|failure| failure.constraint.as_deref() == Some("cvc-complex-type.4")).unwrap();
    assert_eq!(missing_name.line, Some(2));
}
