// crates/jux-fixtures-core/src/schema/mod.rs
// ============================================================================
// Module: XML Schema Validation
// Description: Loads an XSD subset and validates documents against it.
// Purpose: Report schema violations with location and violated constraint.
// Dependencies: regex, serde, thiserror
// ============================================================================

//! ## Overview
//! [`Schema`] compiles a single XSD document into declarations and content
//! models, then validates instance documents, collecting every violation
//! instead of stopping at the first one. The supported subset is what JUnit
//! schemas use: global and local elements with `ref`, named and anonymous
//! complex types, `sequence`/`choice`/`all`, occurrence bounds, wildcards,
//! group and attribute-group references, simple and complex content
//! derivation, mixed content, attribute `use`/`default`/`fixed`, facets,
//! `list`, `union`, and the common builtin datatypes.
//!
//! Composition (`include`, `import`, `redefine`) is rejected at load time.
//! Element names are matched by local name; the schema's target namespace is
//! recorded but not enforced, since JUnit reports are unqualified.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::xml::Document;
use crate::xml::XmlError;
use crate::xml::parse_bytes;

mod compile;
mod model;
mod types;
mod validate;

use model::AttributeSet;
use model::ComplexType;
use model::ElementDecl;
use model::Particle;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// XML Schema namespace.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema instance namespace.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Maximum schema file size accepted by [`Schema::load`].
pub const MAX_SCHEMA_BYTES: u64 = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading a schema.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// Schema file could not be read.
    #[error("failed to read schema {path}: {message}")]
    Io {
        /// Schema path.
        path: String,
        /// Underlying error text.
        message: String,
    },
    /// Schema document is not well-formed.
    #[error("schema is not well-formed XML: {0}")]
    Xml(#[from] XmlError),
    /// Root element is not `xs:schema`.
    #[error("root element <{0}> is not an XML Schema")]
    NotASchema(String),
    /// Schema uses a construct outside the supported subset.
    #[error("unsupported schema construct: {0}")]
    Unsupported(String),
    /// Schema component is malformed.
    #[error("invalid schema: {0}")]
    Invalid(String),
    /// Type reference does not resolve.
    #[error("unknown type '{0}'")]
    UnknownType(String),
    /// Element, group, or attribute reference does not resolve.
    #[error("unknown {kind} '{name}'")]
    UnknownReference {
        /// Component kind.
        kind: &'static str,
        /// Referenced name.
        name: String,
    },
    /// `pattern` facet is not a supported regular expression.
    #[error("invalid pattern '{pattern}': {message}")]
    Pattern {
        /// Pattern text.
        pattern: String,
        /// Regex compiler message.
        message: String,
    },
}

// ============================================================================
// SECTION: Violations
// ============================================================================

/// One schema violation in an instance document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Human-readable description.
    pub message: String,
    /// Violated XSD validation rule (e.g. `cvc-complex-type.2.4`).
    pub constraint: String,
    /// One-based line of the offending element, when known.
    pub line: Option<usize>,
    /// One-based column of the offending element, when known.
    pub column: Option<usize>,
    /// Element path such as `/testsuites/testsuite[2]/testcase[1]`.
    pub path: String,
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// A compiled XML Schema.
#[derive(Debug, Clone)]
pub struct Schema {
    /// `targetNamespace` of the schema document.
    target_namespace: Option<String>,
    /// Global element declarations.
    elements: BTreeMap<String, ElementDecl>,
    /// Named complex types.
    complex_types: BTreeMap<String, ComplexType>,
    /// Named model groups.
    groups: BTreeMap<String, Particle>,
    /// Named attribute groups.
    attribute_groups: BTreeMap<String, AttributeSet>,
}

impl Schema {
    /// Compiles a schema from a parsed schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the document is not a schema, uses an
    /// unsupported construct, or references undefined components.
    pub fn from_document(document: &Document) -> Result<Self, SchemaError> {
        compile::compile(document.root())
    }

    /// Parses and compiles schema bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Xml`] for malformed XML, otherwise as
    /// [`Schema::from_document`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SchemaError> {
        Self::from_document(&parse_bytes(bytes)?)
    }

    /// Reads, parses, and compiles a schema file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] when the file is missing, unreadable, or
    /// larger than [`MAX_SCHEMA_BYTES`], otherwise as [`Schema::from_bytes`].
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let io_error = |message: String| SchemaError::Io {
            path: path.display().to_string(),
            message,
        };
        let metadata = std::fs::metadata(path).map_err(|err| io_error(err.to_string()))?;
        if metadata.len() > MAX_SCHEMA_BYTES {
            return Err(io_error(format!("schema exceeds {MAX_SCHEMA_BYTES} bytes")));
        }
        let bytes = std::fs::read(path).map_err(|err| io_error(err.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Returns the schema's target namespace.
    #[must_use]
    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// Returns the names of the global element declarations.
    pub fn element_names(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    /// Validates a document, returning every violation found.
    #[must_use]
    pub fn validate(&self, document: &Document) -> Vec<Violation> {
        validate::validate_document(self, document)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
