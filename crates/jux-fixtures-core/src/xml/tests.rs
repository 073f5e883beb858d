// crates/jux-fixtures-core/src/xml/tests.rs
// ============================================================================
// Module: XML Document Model Tests
// Description: Unit tests for parsing, mutation, and span-preserving output.
// Purpose: Pin well-formedness rules and byte preservation of untouched nodes.
// Dependencies: jux-fixtures-core
// ============================================================================

//! ## Overview
//! Exercises the parser's well-formedness checks and verifies that the writer
//! copies unmodified regions verbatim while regenerating mutated elements.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::Element;
use super::Node;
use super::TextPosition;
use super::XML_NAMESPACE;
use super::XmlError;
use super::parse_bytes;
use super::parse_str;

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn parses_root_attributes_and_children() {
    let doc = parse_str(
        "<?xml version=\"1.0\"?>\n<testsuite name=\"s\" tests=\"2\">\n  <testcase \
         name=\"a\"/>\n  <testcase name=\"b\"><failure message=\"x &amp; y\"/></testcase>\n</testsuite>\n",
    )
    .unwrap();
    let root = doc.root();
    assert_eq!(root.name(), "testsuite");
    assert_eq!(root.attribute("tests"), Some("2"));
    let cases: Vec<&Element> = root.child_elements().collect();
    assert_eq!(cases.len(), 2);
    let failure = cases[1].find_child(None, "failure").unwrap();
    assert_eq!(failure.attribute("message"), Some("x & y"));
    assert_eq!(cases[1].position(), Some(TextPosition { line: 4, column: 3 }));
}

#[test]
fn resolves_namespaces_on_elements_and_attributes() {
    let doc = parse_str(
        "<a xmlns=\"urn:default\" xmlns:p=\"urn:p\"><p:b p:flag=\"1\" xml:lang=\"en\"/><c/></a>",
    )
    .unwrap();
    let root = doc.root();
    assert_eq!(root.namespace(), Some("urn:default"));
    let b = root.find_child(Some("urn:p"), "b").unwrap();
    assert_eq!(b.attributes()[0].namespace.as_deref(), Some("urn:p"));
    assert_eq!(b.attributes()[1].namespace.as_deref(), Some(XML_NAMESPACE));
    assert!(root.find_child(Some("urn:default"), "c").is_some());
}

#[test]
fn rejects_unclosed_root_with_position() {
    let err = parse_str("<testsuite name=\"s\">\n  <testcase name=\"a\"/>\n").unwrap_err();
    match err {
        XmlError::UnclosedElement {
            element,
            position,
        } => {
            assert_eq!(element, "testsuite");
            assert_eq!(position.line, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_mismatched_end_tag() {
    let err = parse_str("<a><b></a></b>").unwrap_err();
    assert!(matches!(err, XmlError::Syntax { .. }), "{err:?}");
    assert!(err.position().is_some());
}

#[test]
fn rejects_multiple_roots_and_stray_text() {
    assert!(matches!(parse_str("<a/><b/>").unwrap_err(), XmlError::MultipleRoots { .. }));
    assert!(matches!(parse_str("<a/>junk").unwrap_err(), XmlError::TextOutsideRoot { .. }));
    assert!(matches!(parse_str("<!-- only -->").unwrap_err(), XmlError::MissingRoot));
}

#[test]
fn rejects_undeclared_prefix() {
    let err = parse_str("<a><x:b/></a>").unwrap_err();
    assert!(matches!(err, XmlError::UndeclaredPrefix { ref prefix, .. } if prefix == "x"));
}

#[test]
fn rejects_non_utf8_input() {
    let err = parse_bytes(&[b'<', b'a', 0xff, b'/', b'>']).unwrap_err();
    assert!(matches!(err, XmlError::Encoding(_)));
}

#[test]
fn rejects_undefined_entity() {
    assert!(parse_str("<a>&nbsp;</a>").is_err());
}

#[test]
fn normalizes_crlf_line_endings() {
    let doc = parse_str("<a>\r\nline\r\n</a>").unwrap();
    assert_eq!(doc.root().text(), "\nline\n");
}

// ============================================================================
// SECTION: Serialization
// ============================================================================

#[test]
fn unmodified_document_round_trips_verbatim() {
    let body = "<testsuite name=\"s\"  tests='1'>\n  <!-- note -->\n  <testcase name=\"a\" \
                time=\"0.1\"><system-out><![CDATA[<raw> & stuff]]></system-out></testcase>\n</testsuite>";
    let doc = parse_str(&format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}\n")).unwrap();
    assert_eq!(doc.to_xml_string(), format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}\n"));
}

#[test]
fn writer_adds_declaration_when_missing() {
    let doc = parse_str("<a/>").unwrap();
    assert_eq!(doc.to_xml_string(), "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a/>\n");
}

#[test]
fn mutation_regenerates_only_the_touched_path() {
    let source = "<testsuite  name='s'>\n  <testcase   name='a' />\n  <testcase name='b'/>\n</testsuite>";
    let mut doc = parse_str(source).unwrap();
    doc.root_mut().children_mut().push(Node::Element(Element::new("extra").with_attribute("k", "<v>")));
    let out = doc.to_xml_string();
    assert!(out.contains("<testsuite  name='s'>"), "{out}");
    assert!(out.contains("<testcase   name='a' />"), "{out}");
    assert!(out.contains("<extra k=\"&lt;v&gt;\"/></testsuite>"), "{out}");
}

#[test]
fn attribute_change_rewrites_start_tag() {
    let mut doc = parse_str("<a x='1'><b/></a>").unwrap();
    doc.root_mut().set_attribute("x", "2\t3");
    let out = doc.to_xml_string();
    assert!(out.contains("<a x=\"2&#9;3\"><b/></a>"), "{out}");
    let reparsed = parse_str(&out).unwrap();
    assert_eq!(reparsed.root().attribute("x"), Some("2\t3"));
}

#[test]
fn adding_children_to_empty_element_expands_it() {
    let mut doc = parse_str("<a><b/></a>").unwrap();
    let b = doc.root_mut().find_child_mut(None, "b").unwrap();
    b.set_text("x < y");
    assert!(doc.to_xml_string().contains("<a><b>x &lt; y</b></a>"));
}

#[test]
fn prolog_and_epilog_nodes_are_kept() {
    let doc = parse_str("<?style href='x'?>\n<!-- head --><a/><!-- tail -->").unwrap();
    let out = doc.to_xml_string();
    assert!(out.contains("<?style href='x'?>\n<!-- head -->\n<a/>\n<!-- tail -->\n"), "{out}");
}
