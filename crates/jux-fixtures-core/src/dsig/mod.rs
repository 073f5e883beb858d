// crates/jux-fixtures-core/src/dsig/mod.rs
// ============================================================================
// Module: XML Signatures
// Description: Enveloped XML-DSig signing and verification for fixtures.
// Purpose: Let tests trust that signed fixtures have not been altered.
// Dependencies: rsa, p256, sha2, base64, subtle
// ============================================================================

//! ## Overview
//! Signed fixtures carry one enveloped `<Signature>` element as the last child
//! of the root. The signature references the whole document (`URI=""`) with
//! the enveloped-signature transform, a SHA-256 digest, and either
//! RSA-SHA256 (PKCS#1 v1.5) or ECDSA-P256-SHA256 over the canonicalized
//! `SignedInfo`.
//!
//! Security posture: documents and signature markup are untrusted input;
//! verification never consults embedded key material and only accepts the
//! algorithm set it knows.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod keys;
mod sign;
mod verify;

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

pub use keys::KeyError;
pub use keys::SignatureAlgorithm;
pub use keys::SigningKey;
pub use keys::VerifyingKey;
pub use keys::load_certificate_pem;
pub use keys::load_signing_key_pem;
pub use keys::load_verifying_key_pem;
pub use sign::FixtureSigner;
pub use sign::SignOptions;
pub use sign::SignatureSummary;
pub use verify::FixtureVerifier;
pub use verify::InvalidReason;
pub use verify::VerificationReport;

use crate::xml::Element;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// XML-DSig core namespace.
pub const DSIG_NAMESPACE: &str = "http://www.w3.org/2000/09/xmldsig#";
/// XML-DSig 1.1 namespace (EC key values).
pub const DSIG11_NAMESPACE: &str = "http://www.w3.org/2009/xmldsig11#";
/// Enveloped-signature transform URI.
pub const ENVELOPED_SIGNATURE_TRANSFORM: &str =
    "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
/// SHA-256 digest method URI.
pub const SHA256_DIGEST: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
/// URN naming the NIST P-256 curve.
pub const P256_CURVE_URN: &str = "urn:oid:1.2.840.10045.3.1.7";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while signing a document.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The document already carries a signature.
    #[error("document is already signed")]
    AlreadySigned,
    /// The key could not produce a signature.
    #[error(transparent)]
    Key(#[from] KeyError),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the signature elements directly under `root`.
pub(crate) fn signature_elements(root: &Element) -> Vec<&Element> {
    root.child_elements().filter(|child| child.is(Some(DSIG_NAMESPACE), "Signature")).collect()
}

/// Returns true when the root element carries an enveloped signature.
#[must_use]
pub fn is_signed(root: &Element) -> bool {
    !signature_elements(root).is_empty()
}

/// Computes a base64 SHA-256 digest.
pub(crate) fn sha256_base64(bytes: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(bytes))
}
