// crates/jux-fixtures-core/src/schema/tests.rs
// ============================================================================
// Module: Schema Validation Tests
// Description: Unit tests for XSD compilation and instance validation.
// Purpose: Pin supported constructs, violation rules, and locations.
// Dependencies: jux-fixtures-core
// ============================================================================

//! ## Overview
//! Compiles small schemas inline and checks both acceptance and the exact
//! constraint identifiers reported for rejected instances.

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

use super::Schema;
use super::SchemaError;
use super::Violation;
use crate::xml::parse_str;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const JUNIT_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:simpleType name="nonNegativeDecimal">
    <xs:restriction base="xs:decimal">
      <xs:minInclusive value="0"/>
    </xs:restriction>
  </xs:simpleType>

  <xs:attributeGroup name="counts">
    <xs:attribute name="tests" type="xs:nonNegativeInteger"/>
    <xs:attribute name="failures" type="xs:nonNegativeInteger"/>
    <xs:attribute name="errors" type="xs:nonNegativeInteger"/>
    <xs:attribute name="skipped" type="xs:nonNegativeInteger"/>
  </xs:attributeGroup>

  <xs:complexType name="outcome">
    <xs:simpleContent>
      <xs:extension base="xs:string">
        <xs:attribute name="message" type="xs:string"/>
        <xs:attribute name="type" type="xs:string"/>
      </xs:extension>
    </xs:simpleContent>
  </xs:complexType>

  <xs:element name="properties">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="property" minOccurs="0" maxOccurs="unbounded">
          <xs:complexType>
            <xs:attribute name="name" type="xs:string" use="required"/>
            <xs:attribute name="value" type="xs:string" use="required"/>
          </xs:complexType>
        </xs:element>
      </xs:sequence>
    </xs:complexType>
  </xs:element>

  <xs:element name="testcase">
    <xs:complexType>
      <xs:sequence>
        <xs:choice minOccurs="0">
          <xs:element name="skipped" type="outcome"/>
          <xs:element name="error" type="outcome" maxOccurs="unbounded"/>
          <xs:element name="failure" type="outcome" maxOccurs="unbounded"/>
        </xs:choice>
        <xs:element name="system-out" type="xs:string" minOccurs="0"/>
        <xs:element name="system-err" type="xs:string" minOccurs="0"/>
      </xs:sequence>
      <xs:attribute name="name" type="xs:string" use="required"/>
      <xs:attribute name="classname" type="xs:string"/>
      <xs:attribute name="time" type="nonNegativeDecimal"/>
      <xs:anyAttribute processContents="lax"/>
    </xs:complexType>
  </xs:element>

  <xs:element name="testsuite">
    <xs:complexType>
      <xs:sequence>
        <xs:element ref="properties" minOccurs="0"/>
        <xs:element ref="testcase" minOccurs="0" maxOccurs="unbounded"/>
        <xs:element ref="testsuite" minOccurs="0" maxOccurs="unbounded"/>
        <xs:element name="system-out" type="xs:string" minOccurs="0"/>
        <xs:element name="system-err" type="xs:string" minOccurs="0"/>
      </xs:sequence>
      <xs:attribute name="name" type="xs:string"/>
      <xs:attribute name="time" type="nonNegativeDecimal"/>
      <xs:attribute name="timestamp" type="xs:dateTime"/>
      <xs:attributeGroup ref="counts"/>
    </xs:complexType>
  </xs:element>

  <xs:element name="testsuites">
    <xs:complexType>
      <xs:sequence>
        <xs:element ref="properties" minOccurs="0"/>
        <xs:element ref="testsuite" minOccurs="0" maxOccurs="unbounded"/>
      </xs:sequence>
      <xs:attribute name="name" type="xs:string"/>
      <xs:attribute name="time" type="nonNegativeDecimal"/>
      <xs:attributeGroup ref="counts"/>
    </xs:complexType>
  </xs:element>
</xs:schema>
"#;

fn junit_schema() -> Schema {
    Schema::from_bytes(JUNIT_XSD.as_bytes()).unwrap()
}

fn violations(schema: &Schema, instance: &str) -> Vec<Violation> {
    schema.validate(&parse_str(instance).unwrap())
}

fn constraints(schema: &Schema, instance: &str) -> Vec<String> {
    violations(schema, instance).into_iter().map(|violation| violation.constraint).collect()
}

fn compile_error(xsd: &str) -> SchemaError {
    Schema::from_bytes(xsd.as_bytes()).unwrap_err()
}

// ============================================================================
// SECTION: Acceptance
// ============================================================================

#[test]
fn accepts_a_conforming_report() {
    let instance = r#"<testsuites name="all" tests="2">
  <testsuite name="math" tests="2" failures="1" time="0.5" timestamp="2025-01-15T10:30:00Z">
    <properties>
      <property name="jux.hostname" value="build-server-01"/>
    </properties>
    <testcase name="add" classname="math" time="0.001"/>
    <testcase name="sub" classname="math" time="0.002" file="math.py">
      <failure message="expected 1">assert 2 == 1</failure>
      <system-out>log</system-out>
    </testcase>
    <testsuite name="nested"/>
  </testsuite>
</testsuites>"#;
    assert_eq!(violations(&junit_schema(), instance), Vec::new());
}

#[test]
fn lists_global_elements_and_namespace() {
    let schema = junit_schema();
    let names: Vec<&str> = schema.element_names().collect();
    assert_eq!(names, vec!["properties", "testcase", "testsuite", "testsuites"]);
    assert_eq!(schema.target_namespace(), None);
}

// ============================================================================
// SECTION: Violations
// ============================================================================

#[test]
fn reports_undeclared_root() {
    let found = violations(&junit_schema(), "<report/>");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].constraint, "cvc-elt.1.a");
    assert_eq!(found[0].path, "/report");
    assert_eq!((found[0].line, found[0].column), (Some(1), Some(1)));
}

#[test]
fn reports_missing_required_attribute_with_location() {
    let found = violations(&junit_schema(), "<testsuite>\n  <testcase classname=\"a\"/>\n</testsuite>");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].constraint, "cvc-complex-type.4");
    assert_eq!(found[0].path, "/testsuite/testcase[1]");
    assert_eq!((found[0].line, found[0].column), (Some(2), Some(3)));
    assert!(found[0].message.contains("'name'"));
}

#[test]
fn reports_undeclared_attributes_unless_wildcarded() {
    let schema = junit_schema();
    assert_eq!(constraints(&schema, "<testsuite color=\"red\"/>"), vec!["cvc-complex-type.3.2.2"]);
    assert!(constraints(&schema, "<testsuite><testcase name=\"a\" color=\"red\"/></testsuite>").is_empty());
    let xsi = "<testsuite xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
               xsi:noNamespaceSchemaLocation=\"junit.xsd\"/>";
    assert!(constraints(&schema, xsi).is_empty());
}

#[test]
fn reports_datatype_and_facet_failures() {
    let schema = junit_schema();
    assert_eq!(constraints(&schema, "<testsuite tests=\"three\"/>"), vec!["cvc-datatype-valid.1.2.1"]);
    assert_eq!(constraints(&schema, "<testsuite time=\"-1.5\"/>"), vec!["cvc-minInclusive-valid"]);
    assert_eq!(constraints(&schema, "<testsuite timestamp=\"yesterday\"/>"), vec!["cvc-datatype-valid.1.2.1"]);
}

#[test]
fn reports_out_of_order_content_at_the_offending_child() {
    let instance = "<testsuite>\n  <testcase name=\"a\"/>\n  <properties/>\n</testsuite>";
    let found = violations(&junit_schema(), instance);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].constraint, "cvc-complex-type.2.4");
    assert_eq!(found[0].path, "/testsuite/properties[1]");
    assert_eq!(found[0].line, Some(3));
}

#[test]
fn reports_exclusive_choice_violations() {
    let instance = "<testsuite><testcase name=\"a\"><skipped/><failure/></testcase></testsuite>";
    let found = violations(&junit_schema(), instance);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].constraint, "cvc-complex-type.2.4");
    assert!(found[0].message.contains("'failure'"));
}

#[test]
fn reports_character_data_in_element_only_content() {
    let found = constraints(&junit_schema(), "<testsuite>stray<testcase name=\"a\"/></testsuite>");
    assert_eq!(found, vec!["cvc-complex-type.2.3"]);
}

#[test]
fn collects_every_violation() {
    let instance = "<testsuite tests=\"x\"><testcase/><testcase name=\"b\" time=\"slow\"/></testsuite>";
    let found = violations(&junit_schema(), instance);
    let paths: Vec<&str> = found.iter().map(|violation| violation.path.as_str()).collect();
    assert_eq!(paths, vec!["/testsuite", "/testsuite/testcase[1]", "/testsuite/testcase[2]"]);
}

// ============================================================================
// SECTION: Constructs
// ============================================================================

#[test]
fn derives_complex_content_by_extension() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="base">
    <xs:sequence><xs:element name="a" type="xs:string"/></xs:sequence>
    <xs:attribute name="id" type="xs:ID" use="required"/>
  </xs:complexType>
  <xs:complexType name="derived">
    <xs:complexContent>
      <xs:extension base="base">
        <xs:sequence><xs:element name="b" type="xs:int"/></xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:element name="root" type="derived"/>
</xs:schema>"#;
    let schema = Schema::from_bytes(xsd.as_bytes()).unwrap();
    assert!(constraints(&schema, "<root id=\"r1\"><a>x</a><b>7</b></root>").is_empty());
    assert_eq!(constraints(&schema, "<root id=\"r1\"><b>7</b></root>"), vec!["cvc-complex-type.2.4"]);
    assert_eq!(constraints(&schema, "<root><a>x</a><b>7</b></root>"), vec!["cvc-complex-type.4"]);
    assert_eq!(
        constraints(&schema, "<root id=\"r1\"><a>x</a><b>99999999999</b></root>"),
        vec!["cvc-datatype-valid.1.2.1"]
    );
    assert_eq!(constraints(&schema, "<root id=\"r1\"><a>x</a></root>"), vec!["cvc-complex-type.2.4"]);
}

#[test]
fn validates_all_groups_in_any_order() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="root">
    <xs:complexType>
      <xs:all>
        <xs:element name="a"/>
        <xs:element name="b" minOccurs="0"/>
      </xs:all>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;
    let schema = Schema::from_bytes(xsd.as_bytes()).unwrap();
    assert!(constraints(&schema, "<root><b/><a/></root>").is_empty());
    assert!(constraints(&schema, "<root><a/></root>").is_empty());
    assert_eq!(constraints(&schema, "<root><b/></root>"), vec!["cvc-complex-type.2.4"]);
    assert_eq!(constraints(&schema, "<root><a/><a/></root>"), vec!["cvc-complex-type.2.4"]);
}

#[test]
fn applies_enumeration_pattern_list_and_union() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:simpleType name="status">
    <xs:restriction base="xs:token">
      <xs:enumeration value="clean"/>
      <xs:enumeration value="dirty"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:simpleType name="sha">
    <xs:restriction base="xs:string">
      <xs:pattern value="[0-9a-f]{7,40}"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:simpleType name="tags">
    <xs:list itemType="xs:NCName"/>
  </xs:simpleType>
  <xs:simpleType name="limit">
    <xs:union memberTypes="xs:nonNegativeInteger">
      <xs:simpleType>
        <xs:restriction base="xs:string"><xs:enumeration value="none"/></xs:restriction>
      </xs:simpleType>
    </xs:union>
  </xs:simpleType>
  <xs:element name="root">
    <xs:complexType>
      <xs:attribute name="status" type="status"/>
      <xs:attribute name="commit" type="sha"/>
      <xs:attribute name="tags" type="tags"/>
      <xs:attribute name="limit" type="limit"/>
      <xs:attribute name="kind" type="xs:string" fixed="junit"/>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;
    let schema = Schema::from_bytes(xsd.as_bytes()).unwrap();
    let valid = "<root status=\" dirty \" commit=\"abc123d\" tags=\"fast  slow\" limit=\"none\" kind=\"junit\"/>";
    assert!(constraints(&schema, valid).is_empty());
    assert_eq!(constraints(&schema, "<root status=\"messy\"/>"), vec!["cvc-enumeration-valid"]);
    assert_eq!(constraints(&schema, "<root commit=\"ABC123D\"/>"), vec!["cvc-pattern-valid"]);
    assert_eq!(constraints(&schema, "<root tags=\"fast 9lives\"/>"), vec!["cvc-datatype-valid.1.2.1"]);
    assert_eq!(constraints(&schema, "<root limit=\"-1\"/>"), vec!["cvc-datatype-valid.1.2.3"]);
    assert_eq!(constraints(&schema, "<root kind=\"xunit\"/>"), vec!["cvc-attribute.4"]);
}

#[test]
fn translates_name_character_escapes() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="root">
    <xs:simpleType>
      <xs:restriction base="xs:string"><xs:pattern value="\i\c*"/></xs:restriction>
    </xs:simpleType>
  </xs:element>
</xs:schema>"#;
    let schema = Schema::from_bytes(xsd.as_bytes()).unwrap();
    assert!(constraints(&schema, "<root>test_name.v2</root>").is_empty());
    assert_eq!(constraints(&schema, "<root>2fast</root>"), vec!["cvc-pattern-valid"]);
}

#[test]
fn handles_groups_mixed_content_and_wildcards() {
    let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:group name="items">
    <xs:sequence><xs:element name="item" maxOccurs="unbounded"/></xs:sequence>
  </xs:group>
  <xs:element name="root">
    <xs:complexType mixed="true">
      <xs:sequence>
        <xs:group ref="items"/>
        <xs:any minOccurs="0" maxOccurs="unbounded" processContents="skip"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;
    let schema = Schema::from_bytes(xsd.as_bytes()).unwrap();
    assert!(constraints(&schema, "<root>text<item/>more<item/><anything/></root>").is_empty());
    assert_eq!(constraints(&schema, "<root><other/></root>"), vec!["cvc-complex-type.2.4"]);
    assert_eq!(constraints(&schema, "<root/>"), vec!["cvc-complex-type.2.4"]);
}

#[test]
fn wildcard_namespace_constraints_are_enforced() {
    let xsd = r###"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="root">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="item" minOccurs="0"/>
        <xs:any namespace="##other" minOccurs="0" maxOccurs="unbounded"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
  <xs:element name="listed">
    <xs:complexType>
      <xs:sequence>
        <xs:any namespace="##local urn:a" maxOccurs="unbounded"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"###;
    let schema = Schema::from_bytes(xsd.as_bytes()).unwrap();
    let signed = r#"<root><item/><Signature xmlns="http://www.w3.org/2000/09/xmldsig#"/></root>"#;
    assert!(constraints(&schema, signed).is_empty());
    assert_eq!(constraints(&schema, "<root><item/><stray/></root>"), vec!["cvc-complex-type.2.4"]);

    assert!(constraints(&schema, r#"<listed><plain/><a:x xmlns:a="urn:a"/></listed>"#).is_empty());
    assert_eq!(constraints(&schema, r#"<listed><b:x xmlns:b="urn:b"/></listed>"#), vec!["cvc-complex-type.2.4"]);
}

// ============================================================================
// SECTION: Load Errors
// ============================================================================

#[test]
fn rejects_composition_and_unknown_references() {
    let import = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:import namespace="urn:other" schemaLocation="other.xsd"/>
</xs:schema>"#;
    assert!(matches!(compile_error(import), SchemaError::Unsupported(_)));

    let unknown_type = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="root" type="missing"/>
</xs:schema>"#;
    assert_eq!(compile_error(unknown_type), SchemaError::UnknownType("missing".to_string()));

    let unknown_ref = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="root"><xs:complexType><xs:sequence>
    <xs:element ref="ghost"/>
  </xs:sequence></xs:complexType></xs:element>
</xs:schema>"#;
    assert!(matches!(compile_error(unknown_ref), SchemaError::UnknownReference { kind: "element", .. }));
}

#[test]
fn rejects_non_schemas_cycles_and_bad_patterns() {
    assert_eq!(compile_error("<schema/>"), SchemaError::NotASchema("schema".to_string()));

    let cycle = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:simpleType name="a"><xs:restriction base="b"/></xs:simpleType>
  <xs:simpleType name="b"><xs:restriction base="a"/></xs:simpleType>
</xs:schema>"#;
    assert!(matches!(compile_error(cycle), SchemaError::Invalid(_)));

    let pattern = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:simpleType name="p"><xs:restriction base="xs:string"><xs:pattern value="(unclosed"/></xs:restriction></xs:simpleType>
</xs:schema>"#;
    assert!(matches!(compile_error(pattern), SchemaError::Pattern { .. }));

    assert!(matches!(Schema::from_bytes(b"<xs:schema"), Err(SchemaError::Xml(_))));
}
