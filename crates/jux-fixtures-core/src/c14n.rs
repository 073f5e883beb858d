// crates/jux-fixtures-core/src/c14n.rs
// ============================================================================
// Module: XML Canonicalization
// Description: Canonical XML 1.0 and Exclusive XML Canonicalization output.
// Purpose: Produce the exact octets hashed and signed by XML signatures.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Implements the four canonicalization algorithms XML signatures name:
//! inclusive and exclusive C14N, each with or without comments. The output
//! follows the W3C rules: no XML declaration or DOCTYPE, start/end pairs for
//! empty elements, sorted namespace declarations and attributes, fixed
//! escaping, CDATA rendered as text, and superfluous namespace declarations
//! omitted.
//!
//! An optional excluded element is skipped during traversal, which is how
//! the enveloped-signature transform is applied without cloning the tree.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::xml::Document;
use crate::xml::Element;
use crate::xml::Node;
use crate::xml::XML_NAMESPACE;

// ============================================================================
// SECTION: Algorithms
// ============================================================================

/// Canonicalization algorithm identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalizationMethod {
    /// Canonical XML 1.0 without comments.
    #[default]
    Inclusive,
    /// Canonical XML 1.0 with comments.
    InclusiveWithComments,
    /// Exclusive XML Canonicalization 1.0 without comments.
    Exclusive,
    /// Exclusive XML Canonicalization 1.0 with comments.
    ExclusiveWithComments,
}

impl CanonicalizationMethod {
    /// Algorithm URI used in signature markup.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Inclusive => "http://www.w3.org/TR/2001/REC-xml-c14n-20010315",
            Self::InclusiveWithComments => {
                "http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments"
            }
            Self::Exclusive => "http://www.w3.org/2001/10/xml-exc-c14n#",
            Self::ExclusiveWithComments => "http://www.w3.org/2001/10/xml-exc-c14n#WithComments",
        }
    }

    /// Looks up an algorithm by URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        [Self::Inclusive, Self::InclusiveWithComments, Self::Exclusive, Self::ExclusiveWithComments]
            .into_iter()
            .find(|method| method.uri() == uri)
    }

    /// Short label used in configuration and command-line flags.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Inclusive => "c14n",
            Self::InclusiveWithComments => "c14n-with-comments",
            Self::Exclusive => "exc-c14n",
            Self::ExclusiveWithComments => "exc-c14n-with-comments",
        }
    }

    /// Looks up an algorithm by its short label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        [Self::Inclusive, Self::InclusiveWithComments, Self::Exclusive, Self::ExclusiveWithComments]
            .into_iter()
            .find(|method| method.label() == label)
    }

    /// Returns true when comments are part of the output.
    #[must_use]
    pub const fn with_comments(self) -> bool {
        matches!(self, Self::InclusiveWithComments | Self::ExclusiveWithComments)
    }

    /// Returns true for the exclusive variants.
    #[must_use]
    pub const fn is_exclusive(self) -> bool {
        matches!(self, Self::Exclusive | Self::ExclusiveWithComments)
    }

    /// Returns the same algorithm family without comments.
    #[must_use]
    pub const fn without_comments(self) -> Self {
        if self.is_exclusive() { Self::Exclusive } else { Self::Inclusive }
    }
}

impl fmt::Display for CanonicalizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors raised when selecting a canonicalization algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum C14nError {
    /// Label or URI does not name a supported algorithm.
    #[error("unknown canonicalization method '{0}'")]
    UnknownMethod(String),
}

impl FromStr for CanonicalizationMethod {
    type Err = C14nError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [Self::Inclusive, Self::InclusiveWithComments, Self::Exclusive, Self::ExclusiveWithComments]
            .into_iter()
            .find(|method| method.label() == value || method.uri() == value)
            .ok_or_else(|| C14nError::UnknownMethod(value.to_string()))
    }
}

// ============================================================================
// SECTION: Inherited Context
// ============================================================================

/// Namespace bindings and `xml:*` attributes inherited from ancestors.
///
/// Needed when canonicalizing a subtree (such as `SignedInfo`) whose
/// ancestors are outside the node set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InheritedContext {
    /// In-scope namespace bindings keyed by prefix (`""` for default).
    namespaces: BTreeMap<String, String>,
    /// Inherited `xml:*` attributes keyed by local name.
    xml_attributes: BTreeMap<String, String>,
}

impl InheritedContext {
    /// Creates an empty context (document root level).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the context seen by children of `element`.
    #[must_use]
    pub fn descend(&self, element: &Element) -> Self {
        let mut next = self.clone();
        for decl in element.namespace_decls() {
            next.namespaces.insert(decl.prefix.clone().unwrap_or_default(), decl.uri.clone());
        }
        for attr in element.attributes() {
            if attr.namespace.as_deref() == Some(XML_NAMESPACE) {
                next.xml_attributes.insert(attr.local_name().to_string(), attr.value.clone());
            }
        }
        next
    }
}

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Canonicalizes a whole document, optionally skipping one element subtree.
#[must_use]
pub fn canonicalize_document(
    document: &Document,
    method: CanonicalizationMethod,
    excluded: Option<&Element>,
) -> Vec<u8> {
    let mut writer = Canonicalizer::new(method, excluded);
    for node in document.prolog() {
        if writer.write_misc(node) {
            writer.out.push('\n');
        }
    }
    writer.write_element(document.root(), &BTreeMap::new(), &BTreeMap::new(), None);
    for node in document.epilog() {
        let mark = writer.out.len();
        writer.out.push('\n');
        if !writer.write_misc(node) {
            writer.out.truncate(mark);
        }
    }
    writer.out.into_bytes()
}

/// Canonicalizes `element` as the apex of a document subset.
///
/// `context` describes the ancestors of `element`; see
/// [`InheritedContext::descend`].
#[must_use]
pub fn canonicalize_element(
    element: &Element,
    context: &InheritedContext,
    method: CanonicalizationMethod,
) -> Vec<u8> {
    let mut writer = Canonicalizer::new(method, None);
    let inherited = (!method.is_exclusive()).then_some(&context.xml_attributes);
    writer.write_element(element, &context.namespaces, &BTreeMap::new(), inherited);
    writer.out.into_bytes()
}

// ============================================================================
// SECTION: Canonicalizer
// ============================================================================

/// Streaming canonical writer.
struct Canonicalizer<'a> {
    /// Selected algorithm.
    method: CanonicalizationMethod,
    /// Subtree omitted from the output.
    excluded: Option<&'a Element>,
    /// Output buffer.
    out: String,
}

/// Sort key and rendering of one attribute.
struct SortedAttribute<'e> {
    /// Namespace URI (empty for none).
    namespace: &'e str,
    /// Local name.
    local: &'e str,
    /// Qualified name as rendered.
    name: &'e str,
    /// Attribute value.
    value: &'e str,
}

impl<'a> Canonicalizer<'a> {
    /// Creates a writer.
    const fn new(method: CanonicalizationMethod, excluded: Option<&'a Element>) -> Self {
        Self {
            method,
            excluded,
            out: String::new(),
        }
    }

    /// Writes a comment or PI outside the root; returns whether output occurred.
    fn write_misc(&mut self, node: &Node) -> bool {
        match node {
            Node::Comment(text) if self.method.with_comments() => {
                self.write_comment(text);
                true
            }
            Node::ProcessingInstruction(instruction) => {
                self.write_pi(&instruction.target, &instruction.data);
                true
            }
            _ => false,
        }
    }

    /// Writes an element subtree.
    fn write_element(
        &mut self,
        element: &Element,
        parent_scope: &BTreeMap<String, String>,
        parent_rendered: &BTreeMap<String, String>,
        inherited_xml: Option<&BTreeMap<String, String>>,
    ) {
        if self.excluded.is_some_and(|excluded| std::ptr::eq(excluded, element)) {
            return;
        }
        let mut scope = parent_scope.clone();
        for decl in element.namespace_decls() {
            scope.insert(decl.prefix.clone().unwrap_or_default(), decl.uri.clone());
        }
        scope.remove("xml");

        let to_render = if self.method.is_exclusive() {
            exclusive_namespaces(element, &scope, parent_rendered)
        } else {
            inclusive_namespaces(&scope, parent_rendered)
        };
        let mut rendered = parent_rendered.clone();
        rendered.extend(to_render.iter().map(|(prefix, uri)| (prefix.clone(), uri.clone())));

        let mut inherited_names = Vec::new();
        if let Some(inherited) = inherited_xml {
            for (local, value) in inherited {
                let present = element.attributes().iter().any(|attr| {
                    attr.namespace.as_deref() == Some(XML_NAMESPACE) && attr.local_name() == local
                });
                if !present {
                    inherited_names.push((format!("xml:{local}"), local.as_str(), value.as_str()));
                }
            }
        }
        let mut attributes: Vec<SortedAttribute<'_>> = element
            .attributes()
            .iter()
            .map(|attr| SortedAttribute {
                namespace: attr.namespace.as_deref().unwrap_or_default(),
                local: attr.local_name(),
                name: &attr.name,
                value: &attr.value,
            })
            .collect();
        for (name, local, value) in &inherited_names {
            attributes.push(SortedAttribute {
                namespace: XML_NAMESPACE,
                local,
                name,
                value,
            });
        }
        attributes.sort_by(|a, b| (a.namespace, a.local).cmp(&(b.namespace, b.local)));

        self.out.push('<');
        self.out.push_str(element.name());
        for (prefix, uri) in &to_render {
            if prefix.is_empty() {
                self.out.push_str(" xmlns=\"");
            } else {
                self.out.push_str(" xmlns:");
                self.out.push_str(prefix);
                self.out.push_str("=\"");
            }
            push_escaped_attribute(&mut self.out, uri);
            self.out.push('"');
        }
        for attr in &attributes {
            self.out.push(' ');
            self.out.push_str(attr.name);
            self.out.push_str("=\"");
            push_escaped_attribute(&mut self.out, attr.value);
            self.out.push('"');
        }
        self.out.push('>');

        for child in element.children() {
            match child {
                Node::Element(child) => self.write_element(child, &scope, &rendered, None),
                Node::Text(text) | Node::CData(text) => push_escaped_text(&mut self.out, text),
                Node::Comment(text) => {
                    if self.method.with_comments() {
                        self.write_comment(text);
                    }
                }
                Node::ProcessingInstruction(instruction) => {
                    self.write_pi(&instruction.target, &instruction.data);
                }
            }
        }

        self.out.push_str("</");
        self.out.push_str(element.name());
        self.out.push('>');
    }

    /// Writes a comment node.
    fn write_comment(&mut self, text: &str) {
        self.out.push_str("<!--");
        self.out.push_str(text);
        self.out.push_str("-->");
    }

    /// Writes a processing instruction node.
    fn write_pi(&mut self, target: &str, data: &str) {
        self.out.push_str("<?");
        self.out.push_str(target);
        if !data.is_empty() {
            self.out.push(' ');
            self.out.push_str(data);
        }
        self.out.push_str("?>");
    }
}

// ============================================================================
// SECTION: Namespace Selection
// ============================================================================

/// Namespace nodes rendered on an element under inclusive canonicalization.
fn inclusive_namespaces(
    scope: &BTreeMap<String, String>,
    parent_rendered: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (prefix, uri) in scope {
        if prefix.is_empty() && uri.is_empty() {
            if parent_rendered.get("").is_some_and(|parent| !parent.is_empty()) {
                out.insert(String::new(), String::new());
            }
            continue;
        }
        if parent_rendered.get(prefix) != Some(uri) {
            out.insert(prefix.clone(), uri.clone());
        }
    }
    out
}

/// Namespace nodes visibly utilized by an element under exclusive canonicalization.
fn exclusive_namespaces(
    element: &Element,
    scope: &BTreeMap<String, String>,
    parent_rendered: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut utilized = vec![element.prefix().unwrap_or_default()];
    for attr in element.attributes() {
        if let Some(prefix) = attr.prefix()
            && prefix != "xml"
        {
            utilized.push(prefix);
        }
    }
    let mut out = BTreeMap::new();
    for prefix in utilized {
        let uri = scope.get(prefix).map(String::as_str).unwrap_or_default();
        if prefix.is_empty() && uri.is_empty() {
            if parent_rendered.get("").is_some_and(|parent| !parent.is_empty()) {
                out.insert(String::new(), String::new());
            }
            continue;
        }
        if parent_rendered.get(prefix).map(String::as_str) != Some(uri) {
            out.insert(prefix.to_string(), uri.to_string());
        }
    }
    out
}

// ============================================================================
// SECTION: Escaping
// ============================================================================

/// Escapes text content per canonical XML.
fn push_escaped_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
}

/// Escapes attribute values per canonical XML.
fn push_escaped_attribute(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
