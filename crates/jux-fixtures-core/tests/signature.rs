// crates/jux-fixtures-core/tests/signature.rs
// ============================================================================
// Module: Enveloped Signature Tests
// Description: Signs checked-in fixtures and verifies them with real keys.
// Purpose: Prove signature validity, determinism, and tamper detection.
// ============================================================================

//! ## Overview
//! Exercises RSA and P-256 keys from `fixtures/keys` over every raw fixture,
//! then checks the failure reasons for tampered content, foreign keys, and
//! mismatched key types.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use jux_fixtures_core::CanonicalizationMethod;
use jux_fixtures_core::FixtureSigner;
use jux_fixtures_core::FixtureVerifier;
use jux_fixtures_core::KeyError;
use jux_fixtures_core::SignOptions;
use jux_fixtures_core::SignatureAlgorithm;
use jux_fixtures_core::SignatureError;
use jux_fixtures_core::dsig::DSIG_NAMESPACE;
use jux_fixtures_core::dsig::InvalidReason;
use jux_fixtures_core::dsig::VerificationReport;
use jux_fixtures_core::load_certificate_pem;
use jux_fixtures_core::load_signing_key_pem;
use jux_fixtures_core::load_verifying_key_pem;
use jux_fixtures_core::xml::parse_str;

use crate::common::key;
use crate::common::raw;
use crate::common::raw_dir;
use crate::common::xml_files;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn signer(pem: &str, canonicalization: CanonicalizationMethod) -> FixtureSigner {
    FixtureSigner::new(
        load_signing_key_pem(&key(pem)).unwrap(),
        SignOptions {
            canonicalization,
            certificate: None,
        },
    )
}

fn sign(source: &str, signer: &FixtureSigner) -> String {
    let mut document = parse_str(source).unwrap();
    signer.sign_document(&mut document).unwrap();
    document.to_xml_string()
}

fn verify(signed: &str, public_pem: &str) -> VerificationReport {
    let verifier = FixtureVerifier::new(load_verifying_key_pem(&key(public_pem)).unwrap());
    verifier.verify_document(&parse_str(signed).unwrap())
}

// ============================================================================
// SECTION: Round Trips
// ============================================================================

#[test]
fn every_raw_fixture_signs_and_verifies_with_rsa_and_ec() {
    let cases = [
        ("rsa-2048.pem", "rsa-2048.pub.pem", SignatureAlgorithm::RsaSha256),
        ("ec-p256.pem", "ec-p256.pub.pem", SignatureAlgorithm::EcdsaP256Sha256),
    ];
    let files = xml_files(&raw_dir());
    assert!(files.len() >= 6);
    for (private, public, algorithm) in cases {
        let signer = signer(private, CanonicalizationMethod::Inclusive);
        for relative in &files {
            let signed = sign(&raw(relative), &signer);
            let report = verify(&signed, public);
            assert!(report.valid, "{relative} with {private}: {:?}", report.reason);
            assert_eq!(report.algorithm, Some(algorithm));
        }
    }
}

#[test]
fn every_canonicalization_variant_verifies() {
    let source = raw("jenkins/jenkins_nested.xml");
    for method in [
        CanonicalizationMethod::Inclusive,
        CanonicalizationMethod::InclusiveWithComments,
        CanonicalizationMethod::Exclusive,
        CanonicalizationMethod::ExclusiveWithComments,
    ] {
        let signed = sign(&source, &signer("ec-p256.pem", method));
        assert!(signed.contains(method.uri()));
        assert!(verify(&signed, "ec-p256.pub.pem").valid, "{method}");
    }
}

#[test]
fn signing_is_deterministic_for_a_fixed_key() {
    let source = raw("generic/simple_suite.xml");
    for pem in ["rsa-2048.pem", "ec-p256.pem"] {
        let signer = signer(pem, CanonicalizationMethod::Inclusive);
        assert_eq!(sign(&source, &signer), sign(&source, &signer));
    }
}

#[test]
fn signature_is_the_single_last_child_and_leaves_content_alone() {
    let source = raw("surefire/surefire_report.xml");
    let signed = sign(&source, &signer("rsa-2048.pem", CanonicalizationMethod::Inclusive));
    let document = parse_str(&signed).unwrap();

    let children: Vec<_> = document.root().child_elements().collect();
    let signatures = children.iter().filter(|child| child.is(Some(DSIG_NAMESPACE), "Signature")).count();
    assert_eq!(signatures, 1);
    assert!(children.last().unwrap().is(Some(DSIG_NAMESPACE), "Signature"));

    let body_end = source.find("</testsuite>").unwrap();
    assert!(signed.starts_with(&source[..body_end]));
    assert!(signed.trim_end().ends_with("</testsuite>"));
}

#[test]
fn certificate_is_embedded_when_supplied() {
    let certificate = load_certificate_pem(&key("ec-p256.cert.pem")).unwrap();
    let signer = FixtureSigner::new(
        load_signing_key_pem(&key("ec-p256.pem")).unwrap(),
        SignOptions {
            canonicalization: CanonicalizationMethod::Inclusive,
            certificate: Some(certificate),
        },
    );
    let signed = sign(&raw("generic/simple_suite.xml"), &signer);
    assert!(signed.contains("X509Certificate"));
    assert!(verify(&signed, "ec-p256.pub.pem").valid);
}

// ============================================================================
// SECTION: Failures
// ============================================================================

#[test]
fn modified_content_is_a_digest_mismatch() {
    let signed = sign(&raw("generic/simple_suite.xml"), &signer("rsa-2048.pem", CanonicalizationMethod::Inclusive));
    let tampered = signed.replace("name=\"test_addition\"", "name=\"test_addition_renamed\"");
    assert_ne!(signed, tampered);

    let report = verify(&tampered, "rsa-2048.pub.pem");

    assert!(!report.valid);
    assert_eq!(report.reason, Some(InvalidReason::DigestMismatch));
}

#[test]
fn foreign_key_is_a_signature_mismatch() {
    let signed = sign(&raw("generic/simple_suite.xml"), &signer("ec-p256.pem", CanonicalizationMethod::Inclusive));

    let report = verify(&signed, "ec-p256-other.pub.pem");

    assert_eq!(report.reason, Some(InvalidReason::SignatureMismatch));
}

#[test]
fn key_type_must_match_the_signature_method() {
    let signed = sign(&raw("generic/simple_suite.xml"), &signer("ec-p256.pem", CanonicalizationMethod::Inclusive));

    let report = verify(&signed, "rsa-2048.pub.pem");

    assert!(matches!(report.reason, Some(InvalidReason::KeyMismatch { .. })));
}

#[test]
fn unsigned_documents_are_reported_as_missing_signatures() {
    let report = verify(&raw("generic/simple_suite.xml"), "rsa-2048.pub.pem");
    assert_eq!(report.reason, Some(InvalidReason::MissingSignature));
}

#[test]
fn signed_documents_are_not_signed_twice() {
    let signer = signer("ec-p256.pem", CanonicalizationMethod::Inclusive);
    let mut document = parse_str(&sign(&raw("generic/simple_suite.xml"), &signer)).unwrap();
    let err = signer.sign_document(&mut document).unwrap_err();
    assert!(matches!(err, SignatureError::AlreadySigned));
}

// ============================================================================
// SECTION: Key Loading
// ============================================================================

#[test]
fn private_key_encodings_are_accepted() {
    let cases = [
        ("rsa-2048.pem", SignatureAlgorithm::RsaSha256),
        ("rsa-2048.pkcs1.pem", SignatureAlgorithm::RsaSha256),
        ("ec-p256.pem", SignatureAlgorithm::EcdsaP256Sha256),
        ("ec-p256.pkcs8.pem", SignatureAlgorithm::EcdsaP256Sha256),
    ];
    for (pem, algorithm) in cases {
        assert_eq!(load_signing_key_pem(&key(pem)).unwrap().algorithm(), algorithm, "{pem}");
    }
}

#[test]
fn private_key_verifies_its_own_signatures() {
    let signed = sign(&raw("cucumber/cucumber_features.xml"), &signer("rsa-2048.pkcs1.pem", CanonicalizationMethod::Inclusive));
    assert!(verify(&signed, "rsa-2048.pem").valid);
}

#[test]
fn weak_and_unsupported_keys_are_rejected() {
    assert_eq!(
        load_signing_key_pem(&key("rsa-1024.pem")).unwrap_err(),
        KeyError::RsaTooSmall {
            bits: 1024
        }
    );
    assert!(matches!(load_signing_key_pem(&key("ec-p384.pem")).unwrap_err(), KeyError::UnsupportedKey(_)));
    assert_eq!(load_signing_key_pem("not a key").unwrap_err(), KeyError::NoPemBlock);
    assert!(matches!(
        load_signing_key_pem(&key("ec-p256.cert.pem")).unwrap_err(),
        KeyError::UnsupportedLabel(_)
    ));
}
