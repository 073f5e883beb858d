// crates/jux-fixtures-core/src/xml/mod.rs
// ============================================================================
// Module: XML Document Model
// Description: In-memory XML tree with source-span preservation.
// Purpose: Parse, mutate, and re-serialize fixtures without disturbing bytes.
// Dependencies: quick-xml, thiserror
// ============================================================================

//! ## Overview
//! The fixture tooling needs a mutable XML tree that can be written back with
//! the original formatting intact. Every parsed element remembers the byte
//! span of its start tag and of the whole element inside the document source.
//! Mutation goes through accessor methods that drop the affected spans, so
//! the writer re-emits the original bytes for everything that was not
//! touched and regenerates only what changed.
//!
//! ## Invariants
//! - An element reachable only through `&mut` of its parent invalidates the
//!   parent's span before it can be changed.
//! - Namespace URIs are resolved at parse time and stored on elements and
//!   attributes; constructed nodes carry explicit namespaces.
//! - Text values are stored unescaped, with line endings normalized to `\n`.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod parse;
mod write;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ops::Range;

use serde::Serialize;
use thiserror::Error;

pub use parse::parse_bytes;
pub use parse::parse_str;
pub use write::escape_attribute;
pub use write::escape_text;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

// ============================================================================
// SECTION: Positions
// ============================================================================

/// One-based line and column of a location in a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextPosition {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number in characters, starting at 1.
    pub column: usize,
}

/// Maps byte offsets to line/column positions.
#[derive(Debug, Clone)]
pub(crate) struct LineIndex {
    /// Byte offset of the first character of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Builds the index for `source`.
    pub(crate) fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            line_starts,
        }
    }

    /// Returns the position of `offset` within `source`.
    pub(crate) fn position(&self, source: &str, offset: usize) -> TextPosition {
        let offset = offset.min(source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let start = self.line_starts.get(line).copied().unwrap_or(0);
        let column = source.get(start..offset).map_or(offset - start, |text| text.chars().count());
        TextPosition {
            line: line + 1,
            column: column + 1,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while reading an XML document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum XmlError {
    /// Input is not valid UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    Encoding(String),
    /// Tokenizer or syntax failure.
    #[error("{message}")]
    Syntax {
        /// Description of the failure.
        message: String,
        /// Location of the failure when known.
        position: Option<TextPosition>,
    },
    /// The document ended while elements were still open.
    #[error("unexpected end of document: element <{element}> is not closed")]
    UnclosedElement {
        /// Name of the innermost open element.
        element: String,
        /// Location of the unclosed start tag.
        position: TextPosition,
    },
    /// The document has no root element.
    #[error("document has no root element")]
    MissingRoot,
    /// A second top-level element follows the root.
    #[error("document has more than one root element")]
    MultipleRoots {
        /// Location of the extra element.
        position: TextPosition,
    },
    /// Character data appears outside the root element.
    #[error("text is not allowed outside the root element")]
    TextOutsideRoot {
        /// Location of the stray text.
        position: TextPosition,
    },
    /// An element or attribute uses a prefix with no namespace binding.
    #[error("namespace prefix '{prefix}' is not declared")]
    UndeclaredPrefix {
        /// Undeclared prefix.
        prefix: String,
        /// Location of the offending tag.
        position: TextPosition,
    },
}

impl XmlError {
    /// Returns the source location of the error when one is known.
    #[must_use]
    pub const fn position(&self) -> Option<TextPosition> {
        match self {
            Self::Syntax {
                position, ..
            } => *position,
            Self::UnclosedElement {
                position, ..
            }
            | Self::MultipleRoots {
                position,
            }
            | Self::TextOutsideRoot {
                position,
            }
            | Self::UndeclaredPrefix {
                position, ..
            } => Some(*position),
            Self::Encoding(_) | Self::MissingRoot => None,
        }
    }
}

// ============================================================================
// SECTION: Nodes
// ============================================================================

/// Namespace declaration attached to an element (`xmlns` or `xmlns:p`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// Declared prefix; `None` for the default namespace.
    pub prefix: Option<String>,
    /// Namespace URI; empty for an undeclaration of the default namespace.
    pub uri: String,
}

/// Element attribute with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written.
    pub name: String,
    /// Unescaped value.
    pub value: String,
    /// Namespace of a prefixed attribute; unprefixed attributes have none.
    pub namespace: Option<String>,
}

impl Attribute {
    /// Returns the local part of the attribute name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// Returns the prefix of the attribute name, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        split_qname(&self.name).0
    }
}

/// Processing instruction (`<?target data?>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstruction {
    /// Instruction target.
    pub target: String,
    /// Instruction data (may be empty).
    pub data: String,
}

/// A child node of an element or of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested element.
    Element(Element),
    /// Character data.
    Text(String),
    /// CDATA section content.
    CData(String),
    /// Comment content.
    Comment(String),
    /// Processing instruction.
    ProcessingInstruction(ProcessingInstruction),
}

impl Node {
    /// Returns the element when this node is one.
    #[must_use]
    pub const fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the mutable element when this node is one.
    pub const fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns true for text nodes made only of whitespace.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Self::Text(text) if text.chars().all(char::is_whitespace))
    }

    /// Returns true for whitespace text that contains a line break.
    #[must_use]
    pub fn is_indentation(&self) -> bool {
        matches!(self, Self::Text(text) if text.contains('\n') && text.trim().is_empty())
    }
}

/// Byte ranges of a parsed element inside the document source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SourceSpans {
    /// Span of the start tag (or of the whole empty-element tag).
    start_tag: Option<Range<usize>>,
    /// Span of the entire element including its end tag.
    element: Option<Range<usize>>,
}

/// XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written.
    name: String,
    /// Resolved namespace URI of the element name.
    namespace: Option<String>,
    /// Namespace declarations in source order.
    namespaces: Vec<NamespaceDecl>,
    /// Attributes in source order.
    attributes: Vec<Attribute>,
    /// Child nodes.
    children: Vec<Node>,
    /// Start-tag location in the source document.
    position: Option<TextPosition>,
    /// Whether the element was written as `<name/>`.
    self_closing: bool,
    /// Source byte spans reused by the writer while unmodified.
    spans: SourceSpans,
}

impl Element {
    /// Creates an element with no namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
            position: None,
            self_closing: true,
            spans: SourceSpans::default(),
        }
    }

    /// Creates an element whose name belongs to `namespace`.
    ///
    /// No declaration is added; pair with [`Element::with_namespace_decl`] when
    /// the namespace is not already in scope.
    #[must_use]
    pub fn in_namespace(name: impl Into<String>, namespace: Option<&str>) -> Self {
        let mut element = Self::new(name);
        element.namespace = namespace.map(str::to_string);
        element
    }

    /// Adds a namespace declaration (builder form).
    #[must_use]
    pub fn with_namespace_decl(mut self, prefix: Option<&str>, uri: &str) -> Self {
        self.declare_namespace(prefix, uri);
        self
    }

    /// Adds or replaces an unprefixed attribute (builder form).
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Appends a child element (builder form).
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children_mut().push(Node::Element(child));
        self
    }

    /// Appends a text node (builder form).
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.children_mut().push(Node::Text(text.to_string()));
        self
    }

    /// Returns the qualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the local part of the name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// Returns the prefix of the name, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        split_qname(&self.name).0
    }

    /// Returns the resolved namespace URI.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns true when the element has the given local name and namespace.
    #[must_use]
    pub fn is(&self, namespace: Option<&str>, local_name: &str) -> bool {
        self.local_name() == local_name && self.namespace() == namespace
    }

    /// Returns the namespace declarations.
    #[must_use]
    pub fn namespace_decls(&self) -> &[NamespaceDecl] {
        &self.namespaces
    }

    /// Returns the attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Returns the value of the attribute with the given qualified name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|attr| attr.name == name).map(|attr| attr.value.as_str())
    }

    /// Returns the child nodes.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Iterates over child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Returns the first child element with the given local name and namespace.
    #[must_use]
    pub fn find_child(&self, namespace: Option<&str>, local_name: &str) -> Option<&Self> {
        self.child_elements().find(|child| child.is(namespace, local_name))
    }

    /// Returns the indentation preceding the first child element.
    ///
    /// `None` means child elements do not start on their own lines.
    #[must_use]
    pub fn child_indentation(&self) -> Option<&str> {
        let index = self.children.iter().position(|child| child.as_element().is_some())?;
        let previous = self.children.get(index.checked_sub(1)?)?;
        match previous {
            Node::Text(text) if previous.is_indentation() => text.rsplit('\n').next(),
            _ => None,
        }
    }

    /// Returns the start-tag position in the source document.
    #[must_use]
    pub const fn position(&self) -> Option<TextPosition> {
        self.position
    }

    /// Returns the concatenated text and CDATA content of direct children.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(text) | Node::CData(text) => out.push_str(text),
                _ => {}
            }
        }
        out
    }

    /// Returns the children for mutation, discarding the element source span.
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        self.spans.element = None;
        if self.self_closing {
            self.spans.start_tag = None;
        }
        self.self_closing = false;
        &mut self.children
    }

    /// Returns the first child element with the given name for mutation.
    pub fn find_child_mut(&mut self, namespace: Option<&str>, local_name: &str) -> Option<&mut Self> {
        self.children_mut()
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find(|child| child.is(namespace, local_name))
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        let children = self.children_mut();
        children.clear();
        children.push(Node::Text(text.to_string()));
    }

    /// Sets an unprefixed attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.invalidate_start_tag();
        if let Some(existing) = self.attributes.iter_mut().find(|attr| attr.name == name) {
            value.clone_into(&mut existing.value);
            return;
        }
        self.attributes.push(Attribute {
            name: name.to_string(),
            value: value.to_string(),
            namespace: None,
        });
    }

    /// Adds a namespace declaration.
    pub fn declare_namespace(&mut self, prefix: Option<&str>, uri: &str) {
        self.invalidate_start_tag();
        self.namespaces.push(NamespaceDecl {
            prefix: prefix.map(str::to_string),
            uri: uri.to_string(),
        });
    }

    /// Drops both source spans after a start-tag change.
    fn invalidate_start_tag(&mut self) {
        self.spans.start_tag = None;
        self.spans.element = None;
    }

    /// Returns the source span of the whole element while unmodified.
    pub(crate) fn element_span(&self) -> Option<Range<usize>> {
        self.spans.element.clone()
    }

    /// Returns the source span of the start tag while unmodified.
    pub(crate) fn start_tag_span(&self) -> Option<Range<usize>> {
        self.spans.start_tag.clone()
    }

    /// Returns whether an empty element should be written as `<name/>`.
    pub(crate) const fn is_self_closing(&self) -> bool {
        self.self_closing
    }
}

// ============================================================================
// SECTION: Document
// ============================================================================

/// XML declaration details kept for re-serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    /// Declared `standalone` value, if present.
    pub standalone: Option<String>,
}

/// Parsed or constructed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Normalized source text the element spans index into.
    source: String,
    /// XML declaration, if the source had one.
    declaration: Option<XmlDeclaration>,
    /// Raw `<!DOCTYPE ...>` text, if present.
    doctype: Option<String>,
    /// Comments and processing instructions before the root.
    prolog: Vec<Node>,
    /// Root element.
    root: Element,
    /// Comments and processing instructions after the root.
    epilog: Vec<Node>,
}

impl Document {
    /// Creates a document around a constructed root element.
    #[must_use]
    pub fn new(root: Element) -> Self {
        Self {
            source: String::new(),
            declaration: None,
            doctype: None,
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Returns the root element.
    #[must_use]
    pub const fn root(&self) -> &Element {
        &self.root
    }

    /// Returns the root element for mutation.
    pub const fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Returns the XML declaration, if any.
    #[must_use]
    pub const fn declaration(&self) -> Option<&XmlDeclaration> {
        self.declaration.as_ref()
    }

    /// Returns the nodes that precede the root element.
    #[must_use]
    pub fn prolog(&self) -> &[Node] {
        &self.prolog
    }

    /// Returns the nodes that follow the root element.
    #[must_use]
    pub fn epilog(&self) -> &[Node] {
        &self.epilog
    }

    /// Serializes the document, reusing source bytes for unmodified elements.
    #[must_use]
    pub fn to_xml_string(&self) -> String {
        write::write_document(self)
    }

    /// Returns the normalized source text.
    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    /// Returns the raw doctype text.
    pub(crate) fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Splits a qualified name into prefix and local part.
#[must_use]
pub fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
