// crates/jux-fixtures-core/src/dsig/sign.rs
// ============================================================================
// Module: Enveloped Signer
// Description: Appends an enveloped XML-DSig signature to a document.
// Purpose: Produce signed fixtures verifiable by standard XML-DSig tooling.
// Dependencies: base64, sha2
// ============================================================================

//! ## Overview
//! Signing runs in a fixed order so the signature never covers itself:
//! layout whitespace for the new block is inserted first, the document is
//! digested (which equals the enveloped-transform output once the block is
//! added), `SignedInfo` is built and canonicalized in the namespace context
//! it will live in, and the finished block is appended last.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use super::DSIG_NAMESPACE;
use super::DSIG11_NAMESPACE;
use super::ENVELOPED_SIGNATURE_TRANSFORM;
use super::P256_CURVE_URN;
use super::SHA256_DIGEST;
use super::SignatureAlgorithm;
use super::SignatureError;
use super::SigningKey;
use super::VerifyingKey;
use super::is_signed;
use super::sha256_base64;
use crate::c14n::CanonicalizationMethod;
use crate::c14n::InheritedContext;
use crate::c14n::canonicalize_document;
use crate::c14n::canonicalize_element;
use crate::xml::Document;
use crate::xml::Element;
use crate::xml::Node;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Signing options.
#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    /// Canonicalization applied to `SignedInfo`.
    pub canonicalization: CanonicalizationMethod,
    /// DER certificate embedded as `X509Data`, if any.
    pub certificate: Option<Vec<u8>>,
}

/// Facts about a signature that was just produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureSummary {
    /// Signature algorithm.
    pub algorithm: SignatureAlgorithm,
    /// `SignedInfo` canonicalization.
    pub canonicalization: CanonicalizationMethod,
    /// Base64 SHA-256 digest of the referenced document.
    pub digest_value: String,
}

/// Signs fixtures with one key and option set.
#[derive(Debug, Clone)]
pub struct FixtureSigner {
    /// Private key.
    key: SigningKey,
    /// Signing options.
    options: SignOptions,
}

/// Indentation observed among the root's children.
struct Layout {
    /// Indentation of root children, or `None` for compact documents.
    indent: Option<String>,
    /// One indentation step.
    unit: String,
}

// ============================================================================
// SECTION: Signer
// ============================================================================

impl FixtureSigner {
    /// Creates a signer.
    #[must_use]
    pub const fn new(key: SigningKey, options: SignOptions) -> Self {
        Self {
            key,
            options,
        }
    }

    /// Returns the signing algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        self.key.algorithm()
    }

    /// Appends an enveloped signature to `document`.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::AlreadySigned`] when a signature is present,
    /// or [`SignatureError::Key`] when the key fails to sign.
    pub fn sign_document(&self, document: &mut Document) -> Result<SignatureSummary, SignatureError> {
        if is_signed(document.root()) {
            return Err(SignatureError::AlreadySigned);
        }
        let layout = Layout::of(document.root());
        let index = reserve_slot(document.root_mut(), &layout);

        let reference_method = self.options.canonicalization.without_comments();
        let digest_value = sha256_base64(&canonicalize_document(document, reference_method, None));

        let shell = Element::in_namespace("Signature", Some(DSIG_NAMESPACE))
            .with_namespace_decl(None, DSIG_NAMESPACE);
        let mut signed_info = self.signed_info(reference_method, &digest_value);
        if let Some(indent) = &layout.indent {
            indent_element(&mut signed_info, &format!("{indent}{}", layout.unit), &layout.unit);
        }
        let context = InheritedContext::new().descend(document.root()).descend(&shell);
        let canonical = canonicalize_element(&signed_info, &context, self.options.canonicalization);
        let signature_value = STANDARD.encode(self.key.sign(&canonical)?);

        let mut signature = shell
            .with_child(signed_info)
            .with_child(dsig("SignatureValue").with_text(&signature_value))
            .with_child(self.key_info());
        if let Some(indent) = &layout.indent {
            indent_element(&mut signature, indent, &layout.unit);
        }
        document.root_mut().children_mut().insert(index, Node::Element(signature));

        Ok(SignatureSummary {
            algorithm: self.key.algorithm(),
            canonicalization: self.options.canonicalization,
            digest_value,
        })
    }

    /// Builds `SignedInfo` for a whole-document reference.
    fn signed_info(&self, reference_method: CanonicalizationMethod, digest_value: &str) -> Element {
        let transforms = dsig("Transforms")
            .with_child(dsig("Transform").with_attribute("Algorithm", ENVELOPED_SIGNATURE_TRANSFORM))
            .with_child(dsig("Transform").with_attribute("Algorithm", reference_method.uri()));
        let reference = dsig("Reference")
            .with_attribute("URI", "")
            .with_child(transforms)
            .with_child(dsig("DigestMethod").with_attribute("Algorithm", SHA256_DIGEST))
            .with_child(dsig("DigestValue").with_text(digest_value));
        dsig("SignedInfo")
            .with_child(
                dsig("CanonicalizationMethod")
                    .with_attribute("Algorithm", self.options.canonicalization.uri()),
            )
            .with_child(dsig("SignatureMethod").with_attribute("Algorithm", self.key.algorithm().uri()))
            .with_child(reference)
    }

    /// Builds `KeyInfo` with the public key and optional certificate.
    fn key_info(&self) -> Element {
        let public = self.key.verifying_key();
        let mut key_info = dsig("KeyInfo").with_child(dsig("KeyValue").with_child(key_value(&public)));
        if let Some(certificate) = &self.options.certificate {
            key_info = key_info.with_child(
                dsig("X509Data")
                    .with_child(dsig("X509Certificate").with_text(&STANDARD.encode(certificate))),
            );
        }
        key_info
    }
}

// ============================================================================
// SECTION: Markup Helpers
// ============================================================================

/// Creates an element in the XML-DSig namespace.
fn dsig(name: &str) -> Element {
    Element::in_namespace(name, Some(DSIG_NAMESPACE))
}

/// Builds the `RSAKeyValue` or `ECKeyValue` element for a public key.
fn key_value(public: &VerifyingKey) -> Element {
    if let Some((modulus, exponent)) = public.rsa_components() {
        return dsig("RSAKeyValue")
            .with_child(dsig("Modulus").with_text(&STANDARD.encode(modulus)))
            .with_child(dsig("Exponent").with_text(&STANDARD.encode(exponent)));
    }
    let point = public.ec_point().unwrap_or_default();
    Element::in_namespace("ECKeyValue", Some(DSIG11_NAMESPACE))
        .with_namespace_decl(None, DSIG11_NAMESPACE)
        .with_child(
            Element::in_namespace("NamedCurve", Some(DSIG11_NAMESPACE))
                .with_attribute("URI", P256_CURVE_URN),
        )
        .with_child(
            Element::in_namespace("PublicKey", Some(DSIG11_NAMESPACE))
                .with_text(&STANDARD.encode(point)),
        )
}

// ============================================================================
// SECTION: Layout
// ============================================================================

impl Layout {
    /// Infers indentation from the root's existing children.
    fn of(root: &Element) -> Self {
        let indent = match root.child_indentation() {
            Some(indent) => Some(indent.to_string()),
            None if root.child_elements().next().is_none()
                && root.children().iter().any(Node::is_indentation) =>
            {
                Some("  ".to_string())
            }
            None => None,
        };
        let unit = match indent.as_deref() {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => "  ".to_string(),
        };
        Self {
            indent,
            unit,
        }
    }
}

/// Inserts layout whitespace for the signature and returns its child index.
fn reserve_slot(root: &mut Element, layout: &Layout) -> usize {
    let children = root.children_mut();
    let trailing = children.last().is_some_and(Node::is_indentation);
    let mut index = if trailing { children.len() - 1 } else { children.len() };
    if let Some(indent) = &layout.indent {
        children.insert(index, Node::Text(format!("\n{indent}")));
        index += 1;
        if !trailing {
            children.push(Node::Text("\n".to_string()));
        }
    }
    index
}

/// Pretty-prints element-only content below `element`.
fn indent_element(element: &mut Element, base: &str, unit: &str) {
    let element_only =
        !element.children().is_empty() && element.children().iter().all(|child| child.as_element().is_some());
    if !element_only {
        return;
    }
    let inner = format!("{base}{unit}");
    let children = std::mem::take(element.children_mut());
    let mut laid_out = Vec::with_capacity(children.len() * 2 + 1);
    for mut child in children {
        if let Node::Element(nested) = &mut child {
            indent_element(nested, &inner, unit);
        }
        laid_out.push(Node::Text(format!("\n{inner}")));
        laid_out.push(child);
    }
    laid_out.push(Node::Text(format!("\n{base}")));
    *element.children_mut() = laid_out;
}
