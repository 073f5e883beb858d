// crates/jux-fixtures-core/src/dsig/verify.rs
// ============================================================================
// Module: Enveloped Verifier
// Description: Checks enveloped XML-DSig signatures against a trusted key.
// Purpose: Detect any change to a signed fixture.
// Dependencies: base64, sha2, subtle
// ============================================================================

//! ## Overview
//! Verification is strict: exactly one signature, a single whole-document
//! reference with the enveloped transform, SHA-256 digests, and a signature
//! method matching the trusted key. Any deviation yields an invalid report
//! with a reason rather than an error, so batch runs keep going.
//!
//! Security posture: key material embedded in `KeyInfo` is ignored; only the
//! caller-supplied key is trusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use super::DSIG_NAMESPACE;
use super::ENVELOPED_SIGNATURE_TRANSFORM;
use super::SHA256_DIGEST;
use super::SignatureAlgorithm;
use super::VerifyingKey;
use super::signature_elements;
use crate::c14n::CanonicalizationMethod;
use crate::c14n::InheritedContext;
use crate::c14n::canonicalize_document;
use crate::c14n::canonicalize_element;
use crate::xml::Document;
use crate::xml::Element;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Why a signature did not verify.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum InvalidReason {
    /// No signature element under the root.
    #[error("document is not signed")]
    MissingSignature,
    /// More than one signature element under the root.
    #[error("document carries {0} signatures; exactly one is supported")]
    MultipleSignatures(usize),
    /// Required signature markup is missing or malformed.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
    /// Unknown canonicalization algorithm.
    #[error("unsupported canonicalization method '{0}'")]
    UnsupportedCanonicalization(String),
    /// Unknown signature algorithm.
    #[error("unsupported signature method '{0}'")]
    UnsupportedSignatureMethod(String),
    /// Unknown digest algorithm.
    #[error("unsupported digest method '{0}'")]
    UnsupportedDigestMethod(String),
    /// Unknown or disallowed transform.
    #[error("unsupported transform '{0}'")]
    UnsupportedTransform(String),
    /// Reference does not cover the whole document.
    #[error("unsupported reference URI '{0}'")]
    UnsupportedReference(String),
    /// Signature method does not match the trusted key type.
    #[error("signature method {signature} does not match the {key} verification key")]
    KeyMismatch {
        /// Algorithm named by the signature.
        signature: String,
        /// Algorithm of the trusted key.
        key: String,
    },
    /// The document content no longer matches the signed digest.
    #[error("digest mismatch: document content was modified")]
    DigestMismatch,
    /// The signature value does not verify under the trusted key.
    #[error("signature value does not verify with the supplied key")]
    SignatureMismatch,
}

/// Outcome of verifying one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    /// Whether the signature is valid.
    pub valid: bool,
    /// Signature algorithm found in the document, when parseable.
    pub algorithm: Option<SignatureAlgorithm>,
    /// Reason for an invalid result.
    pub reason: Option<InvalidReason>,
}

impl VerificationReport {
    /// Builds an invalid report.
    const fn invalid(algorithm: Option<SignatureAlgorithm>, reason: InvalidReason) -> Self {
        Self {
            valid: false,
            algorithm,
            reason: Some(reason),
        }
    }
}

/// Parsed `SignedInfo` contents.
struct SignedInfoParts<'a> {
    /// `SignedInfo` element itself.
    element: &'a Element,
    /// `SignedInfo` canonicalization.
    canonicalization: CanonicalizationMethod,
    /// Signature algorithm.
    algorithm: SignatureAlgorithm,
    /// Canonicalization applied to the referenced document.
    reference_method: CanonicalizationMethod,
    /// Decoded digest value.
    digest: Vec<u8>,
}

/// Verifies fixtures against one trusted key.
#[derive(Debug, Clone)]
pub struct FixtureVerifier {
    /// Trusted public key.
    key: VerifyingKey,
}

// ============================================================================
// SECTION: Verifier
// ============================================================================

impl FixtureVerifier {
    /// Creates a verifier for `key`.
    #[must_use]
    pub const fn new(key: VerifyingKey) -> Self {
        Self {
            key,
        }
    }

    /// Verifies the enveloped signature of `document`.
    #[must_use]
    pub fn verify_document(&self, document: &Document) -> VerificationReport {
        let signatures = signature_elements(document.root());
        let signature = match signatures.as_slice() {
            [] => return VerificationReport::invalid(None, InvalidReason::MissingSignature),
            [single] => *single,
            many => {
                return VerificationReport::invalid(None, InvalidReason::MultipleSignatures(many.len()));
            }
        };
        let parts = match parse_signed_info(signature) {
            Ok(parts) => parts,
            Err(reason) => return VerificationReport::invalid(None, reason),
        };
        let algorithm = Some(parts.algorithm);
        if parts.algorithm != self.key.algorithm() {
            return VerificationReport::invalid(
                algorithm,
                InvalidReason::KeyMismatch {
                    signature: parts.algorithm.label().to_string(),
                    key: self.key.algorithm().label().to_string(),
                },
            );
        }

        let canonical = canonicalize_document(document, parts.reference_method, Some(signature));
        let actual = Sha256::digest(&canonical);
        if !bool::from(actual.as_slice().ct_eq(parts.digest.as_slice())) {
            return VerificationReport::invalid(algorithm, InvalidReason::DigestMismatch);
        }

        let signature_value = match dsig_child(signature, "SignatureValue").and_then(|value| {
            decode_base64(&value.text())
                .ok_or_else(|| malformed("SignatureValue is not valid base64"))
        }) {
            Ok(value) => value,
            Err(reason) => return VerificationReport::invalid(algorithm, reason),
        };
        let context = InheritedContext::new().descend(document.root()).descend(signature);
        let signed = canonicalize_element(parts.element, &context, parts.canonicalization);
        if !self.key.verify(&signed, &signature_value) {
            return VerificationReport::invalid(algorithm, InvalidReason::SignatureMismatch);
        }
        VerificationReport {
            valid: true,
            algorithm,
            reason: None,
        }
    }
}

// ============================================================================
// SECTION: SignedInfo Parsing
// ============================================================================

/// Extracts and checks the `SignedInfo` algorithm set.
fn parse_signed_info(signature: &Element) -> Result<SignedInfoParts<'_>, InvalidReason> {
    let signed_info = dsig_child(signature, "SignedInfo")?;
    let canonicalization_uri = algorithm_of(dsig_child(signed_info, "CanonicalizationMethod")?)?;
    let canonicalization = CanonicalizationMethod::from_uri(canonicalization_uri)
        .ok_or_else(|| InvalidReason::UnsupportedCanonicalization(canonicalization_uri.to_string()))?;
    let method_uri = algorithm_of(dsig_child(signed_info, "SignatureMethod")?)?;
    let algorithm = SignatureAlgorithm::from_uri(method_uri)
        .ok_or_else(|| InvalidReason::UnsupportedSignatureMethod(method_uri.to_string()))?;

    let references: Vec<&Element> = signed_info
        .child_elements()
        .filter(|child| child.is(Some(DSIG_NAMESPACE), "Reference"))
        .collect();
    let [reference] = references.as_slice() else {
        return Err(malformed(&format!("expected one Reference, found {}", references.len())));
    };
    match reference.attribute("URI") {
        Some("") => {}
        Some(other) => return Err(InvalidReason::UnsupportedReference(other.to_string())),
        None => return Err(InvalidReason::UnsupportedReference(String::from("(absent)"))),
    }
    let reference_method = reference_transforms(reference)?;

    let digest_uri = algorithm_of(dsig_child(reference, "DigestMethod")?)?;
    if digest_uri != SHA256_DIGEST {
        return Err(InvalidReason::UnsupportedDigestMethod(digest_uri.to_string()));
    }
    let digest = decode_base64(&dsig_child(reference, "DigestValue")?.text())
        .ok_or_else(|| malformed("DigestValue is not valid base64"))?;

    Ok(SignedInfoParts {
        element: signed_info,
        canonicalization,
        algorithm,
        reference_method,
        digest,
    })
}

/// Checks the reference transform chain and returns the digest canonicalization.
fn reference_transforms(reference: &Element) -> Result<CanonicalizationMethod, InvalidReason> {
    let Some(transforms) = reference.find_child(Some(DSIG_NAMESPACE), "Transforms") else {
        return Err(InvalidReason::UnsupportedTransform(String::from("(enveloped transform missing)")));
    };
    let mut enveloped = false;
    let mut method = CanonicalizationMethod::Inclusive;
    for transform in transforms.child_elements() {
        if !transform.is(Some(DSIG_NAMESPACE), "Transform") {
            return Err(malformed(&format!("unexpected <{}> in Transforms", transform.name())));
        }
        let uri = algorithm_of(transform)?;
        if uri == ENVELOPED_SIGNATURE_TRANSFORM && !enveloped {
            enveloped = true;
        } else if let Some(found) = CanonicalizationMethod::from_uri(uri) {
            method = found;
        } else {
            return Err(InvalidReason::UnsupportedTransform(uri.to_string()));
        }
    }
    if !enveloped {
        return Err(InvalidReason::UnsupportedTransform(String::from("(enveloped transform missing)")));
    }
    Ok(method.without_comments())
}

/// Returns a required XML-DSig child element.
fn dsig_child<'a>(parent: &'a Element, local_name: &str) -> Result<&'a Element, InvalidReason> {
    parent
        .find_child(Some(DSIG_NAMESPACE), local_name)
        .ok_or_else(|| malformed(&format!("missing {local_name} in {}", parent.local_name())))
}

/// Returns the `Algorithm` attribute of an element.
fn algorithm_of(element: &Element) -> Result<&str, InvalidReason> {
    element
        .attribute("Algorithm")
        .ok_or_else(|| malformed(&format!("{} has no Algorithm", element.local_name())))
}

/// Decodes base64 text, ignoring embedded whitespace.
fn decode_base64(text: &str) -> Option<Vec<u8>> {
    let compact: String = text.chars().filter(|ch| !ch.is_whitespace()).collect();
    STANDARD.decode(compact).ok()
}

/// Builds a malformed-signature reason.
fn malformed(message: &str) -> InvalidReason {
    InvalidReason::MalformedSignature(message.to_string())
}
