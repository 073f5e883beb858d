// crates/jux-fixtures-core/src/dsig/keys.rs
// ============================================================================
// Module: Signature Keys
// Description: PEM key loading and raw signature primitives.
// Purpose: Map RSA and P-256 key material onto XML-DSig algorithms.
// Dependencies: rsa, p256, pem-rfc7468, sha2
// ============================================================================

//! ## Overview
//! Keys arrive as PEM files. Private keys may be PKCS#8 (`PRIVATE KEY`),
//! PKCS#1 (`RSA PRIVATE KEY`), or SEC1 (`EC PRIVATE KEY`); public keys may be
//! SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`). OpenSSL's
//! `EC PARAMETERS` block is skipped when it precedes the key.
//!
//! ## Invariants
//! - RSA keys must be at least 2048 bits.
//! - Only the NIST P-256 curve is accepted for ECDSA.
//! - ECDSA signature values are the 64-byte `r || s` concatenation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use p256::elliptic_curve::sec1::ToEncodedPoint;
use rsa::RsaPrivateKey;
use rsa::RsaPublicKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs1v15;
use rsa::pkcs8::DecodePrivateKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::SignatureEncoding;
use rsa::signature::Signer;
use rsa::signature::Verifier;
use rsa::traits::PublicKeyParts;
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum accepted RSA modulus size in bytes (2048 bits).
const MIN_RSA_MODULUS_BYTES: usize = 256;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading keys or producing signatures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The input contains no PEM block.
    #[error("no PEM block found")]
    NoPemBlock,
    /// A PEM block could not be decoded.
    #[error("invalid PEM block: {0}")]
    Pem(String),
    /// The PEM label is not a supported key type.
    #[error("unsupported PEM label '{0}'")]
    UnsupportedLabel(String),
    /// The key is neither RSA nor P-256 ECDSA.
    #[error("unsupported key: {0}")]
    UnsupportedKey(String),
    /// The RSA key is smaller than 2048 bits.
    #[error("RSA key is {bits} bits; at least 2048 bits are required")]
    RsaTooSmall {
        /// Modulus size in bits.
        bits: usize,
    },
    /// The underlying primitive failed to sign.
    #[error("signing failed: {0}")]
    Signing(String),
}

// ============================================================================
// SECTION: Algorithms
// ============================================================================

/// Signature algorithms supported for fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    RsaSha256,
    /// ECDSA on P-256 with SHA-256.
    EcdsaP256Sha256,
}

impl SignatureAlgorithm {
    /// Algorithm URI used in `SignatureMethod`.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::RsaSha256 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256",
            Self::EcdsaP256Sha256 => "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256",
        }
    }

    /// Looks up an algorithm by URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        [Self::RsaSha256, Self::EcdsaP256Sha256].into_iter().find(|algorithm| algorithm.uri() == uri)
    }

    /// Short label for reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RsaSha256 => "rsa-sha256",
            Self::EcdsaP256Sha256 => "ecdsa-p256-sha256",
        }
    }
}

// ============================================================================
// SECTION: Key Types
// ============================================================================

/// Private key used to sign fixtures.
#[derive(Debug, Clone)]
pub enum SigningKey {
    /// RSA private key.
    Rsa(Box<RsaPrivateKey>),
    /// P-256 ECDSA private key.
    EcdsaP256(p256::ecdsa::SigningKey),
}

impl SigningKey {
    /// Returns the signature algorithm this key produces.
    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            Self::Rsa(_) => SignatureAlgorithm::RsaSha256,
            Self::EcdsaP256(_) => SignatureAlgorithm::EcdsaP256Sha256,
        }
    }

    /// Returns the matching public key.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        match self {
            Self::Rsa(key) => VerifyingKey::Rsa(key.to_public_key()),
            Self::EcdsaP256(key) => VerifyingKey::EcdsaP256(key.verifying_key().clone()),
        }
    }

    /// Signs `message` with SHA-256.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Signing`] when the primitive fails.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyError> {
        match self {
            Self::Rsa(key) => {
                let signer = pkcs1v15::SigningKey::<Sha256>::new(key.as_ref().clone());
                let signature =
                    signer.try_sign(message).map_err(|err| KeyError::Signing(err.to_string()))?;
                Ok(signature.to_vec())
            }
            Self::EcdsaP256(key) => {
                let signature: p256::ecdsa::Signature =
                    key.try_sign(message).map_err(|err| KeyError::Signing(err.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            }
        }
    }
}

/// Public key used to verify fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyingKey {
    /// RSA public key.
    Rsa(RsaPublicKey),
    /// P-256 ECDSA public key.
    EcdsaP256(p256::ecdsa::VerifyingKey),
}

impl VerifyingKey {
    /// Returns the signature algorithm this key verifies.
    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            Self::Rsa(_) => SignatureAlgorithm::RsaSha256,
            Self::EcdsaP256(_) => SignatureAlgorithm::EcdsaP256Sha256,
        }
    }

    /// Checks `signature` over `message`.
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match self {
            Self::Rsa(key) => {
                let verifier = pkcs1v15::VerifyingKey::<Sha256>::new(key.clone());
                pkcs1v15::Signature::try_from(signature)
                    .is_ok_and(|signature| verifier.verify(message, &signature).is_ok())
            }
            Self::EcdsaP256(key) => p256::ecdsa::Signature::from_slice(signature)
                .is_ok_and(|signature| key.verify(message, &signature).is_ok()),
        }
    }

    /// Big-endian modulus and exponent of an RSA key.
    #[must_use]
    pub fn rsa_components(&self) -> Option<(Vec<u8>, Vec<u8>)> {
        match self {
            Self::Rsa(key) => Some((key.n().to_bytes_be(), key.e().to_bytes_be())),
            Self::EcdsaP256(_) => None,
        }
    }

    /// Uncompressed SEC1 point of an EC key.
    #[must_use]
    pub fn ec_point(&self) -> Option<Vec<u8>> {
        match self {
            Self::Rsa(_) => None,
            Self::EcdsaP256(key) => Some(key.to_encoded_point(false).as_bytes().to_vec()),
        }
    }
}

// ============================================================================
// SECTION: PEM Loading
// ============================================================================

/// Loads a signing key from PEM text.
///
/// # Errors
///
/// Returns [`KeyError`] when no supported private key block is present.
pub fn load_signing_key_pem(text: &str) -> Result<SigningKey, KeyError> {
    let (label, der) = first_key_block(text)?;
    match label.as_str() {
        "PRIVATE KEY" => {
            if let Ok(key) = RsaPrivateKey::from_pkcs8_der(&der) {
                return rsa_signing_key(key);
            }
            let secret = p256::SecretKey::from_pkcs8_der(&der).map_err(|err| {
                KeyError::UnsupportedKey(format!("not an RSA or P-256 private key ({err})"))
            })?;
            ec_signing_key(&secret)
        }
        "RSA PRIVATE KEY" => {
            let key = RsaPrivateKey::from_pkcs1_der(&der)
                .map_err(|err| KeyError::UnsupportedKey(err.to_string()))?;
            rsa_signing_key(key)
        }
        "EC PRIVATE KEY" => {
            let secret = p256::SecretKey::from_sec1_der(&der).map_err(|err| {
                KeyError::UnsupportedKey(format!("not a P-256 private key ({err})"))
            })?;
            ec_signing_key(&secret)
        }
        other => Err(KeyError::UnsupportedLabel(other.to_string())),
    }
}

/// Loads a verifying key from PEM text.
///
/// Private key PEM is accepted too; its public half is used.
///
/// # Errors
///
/// Returns [`KeyError`] when no supported key block is present.
pub fn load_verifying_key_pem(text: &str) -> Result<VerifyingKey, KeyError> {
    let (label, der) = first_key_block(text)?;
    match label.as_str() {
        "PUBLIC KEY" => {
            if let Ok(key) = RsaPublicKey::from_public_key_der(&der) {
                check_rsa_size(&key)?;
                return Ok(VerifyingKey::Rsa(key));
            }
            let public = p256::PublicKey::from_public_key_der(&der).map_err(|err| {
                KeyError::UnsupportedKey(format!("not an RSA or P-256 public key ({err})"))
            })?;
            ec_verifying_key(&public)
        }
        "RSA PUBLIC KEY" => {
            let key = RsaPublicKey::from_pkcs1_der(&der)
                .map_err(|err| KeyError::UnsupportedKey(err.to_string()))?;
            check_rsa_size(&key)?;
            Ok(VerifyingKey::Rsa(key))
        }
        "PRIVATE KEY" | "RSA PRIVATE KEY" | "EC PRIVATE KEY" => {
            load_signing_key_pem(text).map(|key| key.verifying_key())
        }
        other => Err(KeyError::UnsupportedLabel(other.to_string())),
    }
}

/// Loads an X.509 certificate and returns its DER bytes.
///
/// # Errors
///
/// Returns [`KeyError`] when no `CERTIFICATE` block is present.
pub fn load_certificate_pem(text: &str) -> Result<Vec<u8>, KeyError> {
    for block in pem_blocks(text) {
        let (label, der) = decode_block(block)?;
        if label == "CERTIFICATE" {
            return Ok(der);
        }
    }
    Err(KeyError::NoPemBlock)
}

/// Returns the first non-parameter PEM block.
fn first_key_block(text: &str) -> Result<(String, Vec<u8>), KeyError> {
    for block in pem_blocks(text) {
        let (label, der) = decode_block(block)?;
        if label != "EC PARAMETERS" {
            return Ok((label, der));
        }
    }
    Err(KeyError::NoPemBlock)
}

/// Decodes one PEM block.
fn decode_block(block: &str) -> Result<(String, Vec<u8>), KeyError> {
    pem_rfc7468::decode_vec(block.as_bytes())
        .map(|(label, der)| (label.to_string(), der))
        .map_err(|err| KeyError::Pem(err.to_string()))
}

/// Splits text into `-----BEGIN ...-----` / `-----END ...-----` blocks.
fn pem_blocks(text: &str) -> Vec<&str> {
    const BEGIN: &str = "-----BEGIN ";
    const END: &str = "-----END ";
    const DASHES: &str = "-----";
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(begin) = rest.find(BEGIN) {
        let candidate = &rest[begin ..];
        let Some(end) = candidate.find(END) else {
            break;
        };
        let tail = &candidate[end + END.len() ..];
        let Some(close) = tail.find(DASHES) else {
            break;
        };
        let length = end + END.len() + close + DASHES.len();
        blocks.push(&candidate[.. length]);
        rest = &candidate[length ..];
    }
    blocks
}

/// Wraps an RSA private key after checking its size.
fn rsa_signing_key(key: RsaPrivateKey) -> Result<SigningKey, KeyError> {
    check_rsa_size(&key)?;
    Ok(SigningKey::Rsa(Box::new(key)))
}

/// Rejects RSA keys below 2048 bits.
fn check_rsa_size(key: &impl PublicKeyParts) -> Result<(), KeyError> {
    let bytes = key.size();
    if bytes < MIN_RSA_MODULUS_BYTES {
        return Err(KeyError::RsaTooSmall {
            bits: bytes * 8,
        });
    }
    Ok(())
}

/// Converts a P-256 secret key into a signing key.
fn ec_signing_key(secret: &p256::SecretKey) -> Result<SigningKey, KeyError> {
    p256::ecdsa::SigningKey::from_bytes(&secret.to_bytes())
        .map(SigningKey::EcdsaP256)
        .map_err(|err| KeyError::UnsupportedKey(err.to_string()))
}

/// Converts a P-256 public key into a verifying key.
fn ec_verifying_key(public: &p256::PublicKey) -> Result<VerifyingKey, KeyError> {
    p256::ecdsa::VerifyingKey::from_sec1_bytes(public.to_encoded_point(false).as_bytes())
        .map(VerifyingKey::EcdsaP256)
        .map_err(|err| KeyError::UnsupportedKey(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
