// crates/jux-fixtures-core/src/junit.rs
// ============================================================================
// Module: JUnit Report View
// Description: Semantic, read-only view of JUnit XML test-suite documents.
// Purpose: Compare fixtures by meaning and summarize their contents.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! JUnit XML comes in several dialects (pytest, Surefire, Jenkins, Cucumber,
//! Polarion). This view captures what they share: suites, their attributes,
//! properties, test cases with results, and captured output. Whitespace-only
//! text and element order among attributes do not affect equality, which
//! makes the view suitable for asserting that a transformation preserved the
//! test-result content of a fixture.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::xml::Document;
use crate::xml::Element;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Root element kind of a JUnit document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RootKind {
    /// Single `<testsuite>` root.
    TestSuite,
    /// Aggregating `<testsuites>` root.
    TestSuites,
}

/// One `<property>` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyEntry {
    /// Property name.
    pub name: String,
    /// Property value (attribute or text content).
    pub value: String,
}

/// Outcome element of a test case (`failure`, `error`, `skipped`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestOutcome {
    /// Element name.
    pub kind: String,
    /// Attributes.
    pub attributes: BTreeMap<String, String>,
    /// Text content.
    pub text: String,
}

/// One `<testcase>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    /// Attributes (`name`, `classname`, `time`, ...).
    pub attributes: BTreeMap<String, String>,
    /// Properties attached to the case.
    pub properties: Vec<PropertyEntry>,
    /// Outcome elements.
    pub outcomes: Vec<TestOutcome>,
    /// Captured standard output.
    pub system_out: Option<String>,
    /// Captured standard error.
    pub system_err: Option<String>,
}

/// One `<testsuite>` or `<testsuites>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestSuite {
    /// Attributes (`name`, `tests`, `failures`, ...).
    pub attributes: BTreeMap<String, String>,
    /// Suite properties.
    pub properties: Vec<PropertyEntry>,
    /// Test cases in document order.
    pub test_cases: Vec<TestCase>,
    /// Nested suites in document order.
    pub suites: Vec<TestSuite>,
    /// Captured standard output.
    pub system_out: Option<String>,
    /// Captured standard error.
    pub system_err: Option<String>,
}

/// Semantic view of a JUnit document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestSuiteDocument {
    /// Root element kind.
    pub kind: RootKind,
    /// Root suite.
    pub root: TestSuite,
}

/// Aggregate counts over a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SuiteSummary {
    /// Number of suites (including the root for `<testsuite>` documents).
    pub suites: usize,
    /// Number of test cases.
    pub test_cases: usize,
    /// Test cases with a `failure` outcome.
    pub failures: usize,
    /// Test cases with an `error` outcome.
    pub errors: usize,
    /// Test cases with a `skipped` outcome.
    pub skipped: usize,
}

/// Errors raised when a document is not JUnit-shaped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JunitError {
    /// Root element is neither `testsuite` nor `testsuites`.
    #[error("unknown root element <{0}>; expected <testsuite> or <testsuites>")]
    UnknownRoot(String),
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Classifies the root element of a document.
///
/// # Errors
///
/// Returns [`JunitError::UnknownRoot`] for any other root.
pub fn root_kind(root: &Element) -> Result<RootKind, JunitError> {
    match root.local_name() {
        "testsuite" => Ok(RootKind::TestSuite),
        "testsuites" => Ok(RootKind::TestSuites),
        other => Err(JunitError::UnknownRoot(other.to_string())),
    }
}

impl TestSuiteDocument {
    /// Builds the view from a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`JunitError::UnknownRoot`] when the root is not a suite.
    pub fn from_document(document: &Document) -> Result<Self, JunitError> {
        let kind = root_kind(document.root())?;
        Ok(Self {
            kind,
            root: read_suite(document.root()),
        })
    }

    /// Returns a copy without properties whose names start with `prefix`.
    #[must_use]
    pub fn without_properties(&self, prefix: &str) -> Self {
        let mut copy = self.clone();
        strip_suite(&mut copy.root, prefix);
        copy
    }

    /// Counts suites, cases, and outcomes.
    #[must_use]
    pub fn summary(&self) -> SuiteSummary {
        let mut summary = SuiteSummary::default();
        match self.kind {
            RootKind::TestSuite => count_suite(&self.root, &mut summary),
            RootKind::TestSuites => {
                for suite in &self.root.suites {
                    count_suite(suite, &mut summary);
                }
                for case in &self.root.test_cases {
                    count_case(case, &mut summary);
                }
            }
        }
        summary
    }
}

/// Reads one suite element.
fn read_suite(element: &Element) -> TestSuite {
    let mut suite = TestSuite {
        attributes: attributes_of(element),
        properties: Vec::new(),
        test_cases: Vec::new(),
        suites: Vec::new(),
        system_out: None,
        system_err: None,
    };
    for child in element.child_elements() {
        match child.local_name() {
            "properties" => suite.properties.extend(read_properties(child)),
            "testcase" => suite.test_cases.push(read_case(child)),
            "testsuite" => suite.suites.push(read_suite(child)),
            "system-out" => suite.system_out = Some(child.text()),
            "system-err" => suite.system_err = Some(child.text()),
            _ => {}
        }
    }
    suite
}

/// Reads one test case element.
fn read_case(element: &Element) -> TestCase {
    let mut case = TestCase {
        attributes: attributes_of(element),
        properties: Vec::new(),
        outcomes: Vec::new(),
        system_out: None,
        system_err: None,
    };
    for child in element.child_elements() {
        match child.local_name() {
            "properties" => case.properties.extend(read_properties(child)),
            "system-out" => case.system_out = Some(child.text()),
            "system-err" => case.system_err = Some(child.text()),
            other => case.outcomes.push(TestOutcome {
                kind: other.to_string(),
                attributes: attributes_of(child),
                text: child.text().trim().to_string(),
            }),
        }
    }
    case
}

/// Reads the `<property>` entries of a container.
pub(crate) fn read_properties(container: &Element) -> Vec<PropertyEntry> {
    container
        .child_elements()
        .filter(|child| child.local_name() == "property")
        .map(|property| PropertyEntry {
            name: property.attribute("name").unwrap_or_default().to_string(),
            value: property.attribute("value").map_or_else(|| property.text(), str::to_string),
        })
        .collect()
}

/// Collects attributes into a sorted map.
fn attributes_of(element: &Element) -> BTreeMap<String, String> {
    element.attributes().iter().map(|attr| (attr.name.clone(), attr.value.clone())).collect()
}

/// Removes prefixed properties recursively.
fn strip_suite(suite: &mut TestSuite, prefix: &str) {
    suite.properties.retain(|property| !property.name.starts_with(prefix));
    for nested in &mut suite.suites {
        strip_suite(nested, prefix);
    }
}

/// Adds one suite subtree to the summary.
fn count_suite(suite: &TestSuite, summary: &mut SuiteSummary) {
    summary.suites += 1;
    for case in &suite.test_cases {
        count_case(case, summary);
    }
    for nested in &suite.suites {
        count_suite(nested, summary);
    }
}

/// Adds one test case to the summary.
fn count_case(case: &TestCase, summary: &mut SuiteSummary) {
    summary.test_cases += 1;
    if case.outcomes.iter().any(|outcome| outcome.kind == "failure") {
        summary.failures += 1;
    }
    if case.outcomes.iter().any(|outcome| outcome.kind == "error") {
        summary.errors += 1;
    }
    if case.outcomes.iter().any(|outcome| outcome.kind == "skipped") {
        summary.skipped += 1;
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap/expect for clarity."
    )]

    use super::JunitError;
    use super::RootKind;
    use super::SuiteSummary;
    use super::TestSuiteDocument;
    use crate::xml::parse_str;

    const NESTED: &str = r#"<testsuites name="all">
  <testsuite name="outer">
    <properties>
      <property name="jux.hostname" value="h"/>
      <property name="env">ci</property>
    </properties>
    <testcase name="a"/>
    <testcase name="b"><failure message="boom">trace</failure></testcase>
    <testsuite name="inner">
      <testcase name="c"><skipped/></testcase>
      <testcase name="d"><error/><system-out>log</system-out></testcase>
    </testsuite>
  </testsuite>
</testsuites>"#;

    #[test]
    fn summary_counts_nested_suites_and_outcomes() {
        let view = TestSuiteDocument::from_document(&parse_str(NESTED).unwrap()).unwrap();

        assert_eq!(view.kind, RootKind::TestSuites);
        assert_eq!(view.summary(), SuiteSummary {
            suites: 2,
            test_cases: 4,
            failures: 1,
            errors: 1,
            skipped: 1,
        });
    }

    #[test]
    fn property_values_fall_back_to_element_text() {
        let view = TestSuiteDocument::from_document(&parse_str(NESTED).unwrap()).unwrap();

        let outer = &view.root.suites[0];
        assert_eq!(outer.properties[1].name, "env");
        assert_eq!(outer.properties[1].value, "ci");
        assert_eq!(outer.suites[0].test_cases[1].system_out.as_deref(), Some("log"));
    }

    #[test]
    fn without_properties_drops_only_prefixed_entries() {
        let view = TestSuiteDocument::from_document(&parse_str(NESTED).unwrap()).unwrap();

        let stripped = view.without_properties("jux.");

        let names: Vec<&str> =
            stripped.root.suites[0].properties.iter().map(|property| property.name.as_str()).collect();
        assert_eq!(names, ["env"]);
        assert_ne!(stripped, view);
    }

    #[test]
    fn non_suite_roots_are_rejected() {
        let err = TestSuiteDocument::from_document(&parse_str("<html/>").unwrap()).unwrap_err();

        assert_eq!(err, JunitError::UnknownRoot("html".to_string()));
    }
}
