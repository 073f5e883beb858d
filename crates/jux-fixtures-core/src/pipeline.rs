// crates/jux-fixtures-core/src/pipeline.rs
// ============================================================================
// Module: Tree Pipeline
// Description: Runs enrich, sign, verify, validate, and strip over a tree.
// Purpose: Apply one operation per fixture and collect a batch report.
// Dependencies: crate::{batch, dsig, enrich, events, schema, tree, xml}
// ============================================================================

//! ## Overview
//! Each `*_tree` function enumerates fixtures in sorted order, processes
//! them one at a time, and records a [`FileReport`] per file. Failures are
//! file-scoped: a malformed or rejected document never stops the batch.
//! Only tree-level problems (missing input root, overlapping roots) are
//! returned as errors, before any file is touched.
//!
//! Transforming operations write to the mirrored path under the output root
//! through [`write_atomic`]; a file that fails is not written.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use crate::batch::BatchReport;
use crate::batch::FailureKind;
use crate::batch::FileFailure;
use crate::batch::FileReport;
use crate::batch::Operation;
use crate::dsig;
use crate::dsig::FixtureSigner;
use crate::dsig::FixtureVerifier;
use crate::enrich::EnrichError;
use crate::enrich::Enricher;
use crate::enrich::strip_tool_properties;
use crate::events::EventSink;
use crate::events::FileEvent;
use crate::junit::SuiteSummary;
use crate::junit::TestSuiteDocument;
use crate::schema::Schema;
use crate::tree::FixtureFile;
use crate::tree::MAX_FIXTURE_BYTES;
use crate::tree::TreeError;
use crate::tree::discover_fixtures;
use crate::tree::ensure_disjoint_roots;
use crate::tree::read_bytes_with_limit;
use crate::tree::write_atomic;
use crate::xml::Document;
use crate::xml::parse_bytes;

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Well-formedness and optional schema checks for one run.
#[derive(Debug, Clone, Default)]
pub struct FixtureValidator {
    /// Schema every document must conform to.
    schema: Option<Schema>,
    /// Whether files under `malformed/` directories are skipped.
    skip_malformed: bool,
}

impl FixtureValidator {
    /// Creates a validator.
    #[must_use]
    pub const fn new(schema: Option<Schema>, skip_malformed: bool) -> Self {
        Self {
            schema,
            skip_malformed,
        }
    }

    /// Returns true when `fixture` takes part in the run.
    #[must_use]
    pub fn includes(&self, fixture: &FixtureFile) -> bool {
        !(self.skip_malformed && fixture.is_malformed_fixture())
    }

    /// Checks a parsed document against the schema, if any.
    #[must_use]
    pub fn check(&self, document: &Document) -> Vec<FileFailure> {
        self.schema.as_ref().map_or_else(Vec::new, |schema| {
            schema.validate(document).iter().map(FileFailure::nonconforming).collect()
        })
    }
}

// ============================================================================
// SECTION: Transforming Operations
// ============================================================================

/// Per-document step of a transforming operation.
type Transform<'a> = dyn FnMut(&mut Document, &mut FileReport) -> Result<(), FileFailure> + 'a;

/// Enriches every fixture under `input` into the mirrored `output` tree.
///
/// # Errors
///
/// Returns [`TreeError`] when the roots are unusable.
pub fn enrich_tree(
    input: &Path,
    output: &Path,
    enricher: &Enricher,
    sink: &dyn EventSink,
) -> Result<BatchReport, TreeError> {
    transform_tree(Operation::Enrich, input, output, sink, &mut |document, file| {
        let outcome = enricher.enrich(document).map_err(|err| rejected(&err))?;
        file.enrichment = Some(outcome);
        file.suite = suite_summary(document);
        Ok(())
    })
}

/// Removes tool properties from every fixture under `input`.
///
/// # Errors
///
/// Returns [`TreeError`] when the roots are unusable.
pub fn strip_tree(input: &Path, output: &Path, sink: &dyn EventSink) -> Result<BatchReport, TreeError> {
    transform_tree(Operation::Strip, input, output, sink, &mut |document, file| {
        if dsig::is_signed(document.root()) {
            return Err(rejected(&EnrichError::Signed));
        }
        let removed = strip_tool_properties(document).map_err(|err| rejected(&err))?;
        file.removed = Some(removed);
        file.suite = suite_summary(document);
        Ok(())
    })
}

/// Signs every fixture under `input` into the mirrored `output` tree.
///
/// # Errors
///
/// Returns [`TreeError`] when the roots are unusable.
pub fn sign_tree(
    input: &Path,
    output: &Path,
    signer: &FixtureSigner,
    sink: &dyn EventSink,
) -> Result<BatchReport, TreeError> {
    transform_tree(Operation::Sign, input, output, sink, &mut |document, file| {
        let summary = signer.sign_document(document).map_err(|err| rejected(&err))?;
        file.signature = Some(summary);
        file.suite = suite_summary(document);
        Ok(())
    })
}

/// Shared driver for operations that write a mirrored tree.
fn transform_tree(
    operation: Operation,
    input: &Path,
    output: &Path,
    sink: &dyn EventSink,
    transform: &mut Transform<'_>,
) -> Result<BatchReport, TreeError> {
    ensure_disjoint_roots(input, output)?;
    let fixtures = discover_fixtures(input, Some(output))?;
    fs::create_dir_all(output).map_err(|err| TreeError::Io {
        path: output.display().to_string(),
        message: err.to_string(),
    })?;

    let mut report = BatchReport::new(operation, input, Some(output));
    for fixture in &fixtures {
        let destination = fixture.mirrored(output);
        let mut file = FileReport::new(fixture.display_path(), None);
        match transform_file(fixture, &destination, &mut file, transform) {
            Ok(()) => file.output = Some(destination.display().to_string()),
            Err(failure) => file.fail(failure),
        }
        sink.record(&FileEvent::from_report(operation, &file));
        report.push(file);
    }
    Ok(report)
}

/// Reads, transforms, and writes one fixture.
fn transform_file(
    fixture: &FixtureFile,
    destination: &Path,
    file: &mut FileReport,
    transform: &mut Transform<'_>,
) -> Result<(), FileFailure> {
    let mut document = read_document(fixture.path())?;
    transform(&mut document, file)?;
    write_atomic(destination, document.to_xml_string().as_bytes()).map_err(|err| {
        FileFailure::new(FailureKind::Io, format!("failed to write {}: {err}", destination.display()))
    })
}

// ============================================================================
// SECTION: Checking Operations
// ============================================================================

/// Verifies the signature of every fixture under `input`.
///
/// # Errors
///
/// Returns [`TreeError`] when the input root is unusable.
pub fn verify_tree(
    input: &Path,
    verifier: &FixtureVerifier,
    sink: &dyn EventSink,
) -> Result<BatchReport, TreeError> {
    let fixtures = discover_fixtures(input, None)?;
    let mut report = BatchReport::new(Operation::Verify, input, None);
    for fixture in &fixtures {
        let mut file = FileReport::new(fixture.display_path(), None);
        match read_document(fixture.path()) {
            Ok(document) => {
                let outcome = verifier.verify_document(&document);
                file.algorithm = outcome.algorithm;
                file.suite = suite_summary(&document);
                if !outcome.valid {
                    let message = outcome
                        .reason
                        .map_or_else(|| "signature did not verify".to_string(), |reason| reason.to_string());
                    file.fail(FileFailure::new(FailureKind::Invalid, message));
                }
            }
            Err(failure) => file.fail(failure),
        }
        sink.record(&FileEvent::from_report(Operation::Verify, &file));
        report.push(file);
    }
    Ok(report)
}

/// Checks well-formedness (and schema conformance) of every fixture.
///
/// # Errors
///
/// Returns [`TreeError`] when the input root is unusable.
pub fn validate_tree(
    input: &Path,
    validator: &FixtureValidator,
    sink: &dyn EventSink,
) -> Result<BatchReport, TreeError> {
    let fixtures = discover_fixtures(input, None)?;
    let mut report = BatchReport::new(Operation::Validate, input, None);
    for fixture in fixtures.iter().filter(|fixture| validator.includes(fixture)) {
        let mut file = FileReport::new(fixture.display_path(), None);
        match read_document(fixture.path()) {
            Ok(document) => {
                file.suite = suite_summary(&document);
                for failure in validator.check(&document) {
                    file.fail(failure);
                }
            }
            Err(failure) => file.fail(failure),
        }
        sink.record(&FileEvent::from_report(Operation::Validate, &file));
        report.push(file);
    }
    Ok(report)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads and parses one fixture.
fn read_document(path: &Path) -> Result<Document, FileFailure> {
    let bytes = read_bytes_with_limit(path, MAX_FIXTURE_BYTES).map_err(|err| {
        FileFailure::new(FailureKind::Io, format!("failed to read {}: {err}", path.display()))
    })?;
    parse_bytes(&bytes).map_err(|err| FileFailure::malformed(&err))
}

/// Returns test counts for JUnit-shaped documents.
fn suite_summary(document: &Document) -> Option<SuiteSummary> {
    TestSuiteDocument::from_document(document).ok().map(|view| view.summary())
}

/// Maps an operation error to a rejection.
fn rejected(err: &dyn std::error::Error) -> FileFailure {
    FileFailure::new(FailureKind::Rejected, err.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
