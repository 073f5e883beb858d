// crates/jux-fixtures-core/src/xml/write.rs
// ============================================================================
// Module: XML Writer
// Description: Serializes documents, reusing source bytes where possible.
// Purpose: Keep untouched fixture content byte-identical across rewrites.
// Dependencies: none
// ============================================================================

//! ## Overview
//! The writer always emits a UTF-8 XML declaration followed by a newline.
//! Elements that still carry a source span are copied verbatim; modified
//! elements are regenerated, reusing the original start tag when only the
//! children changed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::Document;
use super::Element;
use super::Node;
use super::ProcessingInstruction;

// ============================================================================
// SECTION: Document Output
// ============================================================================

/// Serializes a document to a string.
pub(super) fn write_document(document: &Document) -> String {
    let source = document.source();
    let mut out = String::with_capacity(source.len() + 256);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"");
    if let Some(standalone) = document.declaration().and_then(|decl| decl.standalone.as_deref()) {
        out.push_str(" standalone=\"");
        out.push_str(standalone);
        out.push('"');
    }
    out.push_str("?>\n");
    if let Some(doctype) = document.doctype() {
        out.push_str(doctype);
        out.push('\n');
    }
    for node in document.prolog() {
        write_node(&mut out, node, source);
        out.push('\n');
    }
    write_element(&mut out, document.root(), source);
    out.push('\n');
    for node in document.epilog() {
        write_node(&mut out, node, source);
        out.push('\n');
    }
    out
}

/// Writes one node.
fn write_node(out: &mut String, node: &Node, source: &str) {
    match node {
        Node::Element(element) => write_element(out, element, source),
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::CData(text) => {
            out.push_str("<![CDATA[");
            out.push_str(text);
            out.push_str("]]>");
        }
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::ProcessingInstruction(instruction) => write_instruction(out, instruction),
    }
}

/// Writes an element, copying source bytes when unmodified.
fn write_element(out: &mut String, element: &Element, source: &str) {
    if let Some(raw) = element.element_span().and_then(|span| source.get(span)) {
        out.push_str(raw);
        return;
    }
    let empty = element.children().is_empty() && element.is_self_closing();
    match element.start_tag_span().and_then(|span| source.get(span)) {
        Some(raw) if !empty => out.push_str(raw),
        _ => write_start_tag(out, element, empty),
    }
    if empty {
        return;
    }
    for child in element.children() {
        write_node(out, child, source);
    }
    out.push_str("</");
    out.push_str(element.name());
    out.push('>');
}

/// Writes a regenerated start tag.
fn write_start_tag(out: &mut String, element: &Element, empty: bool) {
    out.push('<');
    out.push_str(element.name());
    for decl in element.namespace_decls() {
        match decl.prefix.as_deref() {
            Some(prefix) => {
                out.push_str(" xmlns:");
                out.push_str(prefix);
            }
            None => out.push_str(" xmlns"),
        }
        out.push_str("=\"");
        out.push_str(&escape_attribute(&decl.uri));
        out.push('"');
    }
    for attr in element.attributes() {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(&attr.value));
        out.push('"');
    }
    out.push_str(if empty { "/>" } else { ">" });
}

/// Writes a processing instruction.
fn write_instruction(out: &mut String, instruction: &ProcessingInstruction) {
    out.push_str("<?");
    out.push_str(&instruction.target);
    if !instruction.data.is_empty() {
        out.push(' ');
        out.push_str(&instruction.data);
    }
    out.push_str("?>");
}

// ============================================================================
// SECTION: Escaping
// ============================================================================

/// Escapes character data for element content.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes a double-quoted attribute value.
///
/// Whitespace characters other than space are written as character
/// references so they survive attribute-value normalization on re-parse.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
    out
}
