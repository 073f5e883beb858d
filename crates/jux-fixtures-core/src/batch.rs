// crates/jux-fixtures-core/src/batch.rs
// ============================================================================
// Module: Batch Reports
// Description: Per-file results and run summaries for tree operations.
// Purpose: Collect file-scoped failures without aborting the batch.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every tree operation produces a [`BatchReport`]: one [`FileReport`] per
//! discovered fixture in discovery order, plus a summary. A file fails when
//! it has at least one [`FileFailure`]; the report's overall success drives
//! the process exit status.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::dsig::SignatureAlgorithm;
use crate::dsig::SignatureSummary;
use crate::enrich::EnrichOutcome;
use crate::junit::SuiteSummary;
use crate::schema::Violation;
use crate::xml::XmlError;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Tree operation that produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Metadata insertion.
    Enrich,
    /// Enveloped signing.
    Sign,
    /// Signature verification.
    Verify,
    /// Well-formedness and schema validation.
    Validate,
    /// Tool-property removal.
    Strip,
}

impl Operation {
    /// Returns the lowercase label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Enrich => "enrich",
            Self::Sign => "sign",
            Self::Verify => "verify",
            Self::Validate => "validate",
            Self::Strip => "strip",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: File Results
// ============================================================================

/// Outcome of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Operation completed.
    Ok,
    /// At least one failure was recorded.
    Failed,
}

/// Failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Input is not well-formed XML.
    Malformed,
    /// Reading or writing failed.
    Io,
    /// Document is well-formed but not acceptable for the operation.
    Rejected,
    /// Signature did not verify.
    Invalid,
    /// Document violates the schema.
    Nonconforming,
}

impl FailureKind {
    /// Returns the snake-case label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::Io => "io",
            Self::Rejected => "rejected",
            Self::Invalid => "invalid",
            Self::Nonconforming => "nonconforming",
        }
    }
}

/// One failure recorded for a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// Failure category.
    pub kind: FailureKind,
    /// Human-readable description.
    pub message: String,
    /// One-based line, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// One-based column, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// Violated schema rule, for nonconforming documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    /// Element path of a schema violation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

impl FileFailure {
    /// Creates a failure without a location.
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
            column: None,
            constraint: None,
            element: None,
        }
    }

    /// Creates a well-formedness failure from a parse error.
    #[must_use]
    pub fn malformed(err: &XmlError) -> Self {
        let position = err.position();
        Self {
            line: position.map(|position| position.line),
            column: position.map(|position| position.column),
            ..Self::new(FailureKind::Malformed, err.to_string())
        }
    }

    /// Creates a conformance failure from a schema violation.
    #[must_use]
    pub fn nonconforming(violation: &Violation) -> Self {
        Self {
            kind: FailureKind::Nonconforming,
            message: violation.message.clone(),
            line: violation.line,
            column: violation.column,
            constraint: Some(violation.constraint.clone()),
            element: Some(violation.path.clone()),
        }
    }
}

/// Result for one fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Relative input path with `/` separators.
    pub path: String,
    /// Output path written, for transforming operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Overall file status.
    pub status: FileStatus,
    /// Failures in the order they were found.
    pub failures: Vec<FileFailure>,
    /// Test counts of the document, when it is JUnit-shaped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite: Option<SuiteSummary>,
    /// Enrichment changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<EnrichOutcome>,
    /// Signature produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureSummary>,
    /// Algorithm of a verified signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<SignatureAlgorithm>,
    /// Number of tool properties removed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<usize>,
}

impl FileReport {
    /// Creates a passing report for `path`.
    #[must_use]
    pub fn new(path: impl Into<String>, output: Option<&Path>) -> Self {
        Self {
            path: path.into(),
            output: output.map(|output| output.display().to_string()),
            status: FileStatus::Ok,
            failures: Vec::new(),
            suite: None,
            enrichment: None,
            signature: None,
            algorithm: None,
            removed: None,
        }
    }

    /// Records a failure and marks the file failed.
    pub fn fail(&mut self, failure: FileFailure) {
        self.status = FileStatus::Failed;
        self.failures.push(failure);
    }

    /// Returns true when no failure was recorded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == FileStatus::Ok
    }

    /// Returns the first failure, if any.
    #[must_use]
    pub fn first_failure(&self) -> Option<&FileFailure> {
        self.failures.first()
    }
}

// ============================================================================
// SECTION: Batch Results
// ============================================================================

/// File counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Files processed.
    pub total: usize,
    /// Files that completed.
    pub succeeded: usize,
    /// Files with failures.
    pub failed: usize,
}

/// Report of one tree operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Operation performed.
    pub operation: Operation,
    /// Input root as given.
    pub input_root: String,
    /// Output root as given, for transforming operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_root: Option<String>,
    /// Per-file results in discovery order.
    pub files: Vec<FileReport>,
    /// File counts.
    pub summary: BatchSummary,
}

impl BatchReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(operation: Operation, input_root: &Path, output_root: Option<&Path>) -> Self {
        Self {
            operation,
            input_root: input_root.display().to_string(),
            output_root: output_root.map(|root| root.display().to_string()),
            files: Vec::new(),
            summary: BatchSummary::default(),
        }
    }

    /// Appends a file result and updates the summary.
    pub fn push(&mut self, file: FileReport) {
        self.summary.total += 1;
        if file.is_ok() {
            self.summary.succeeded += 1;
        } else {
            self.summary.failed += 1;
        }
        self.files.push(file);
    }

    /// Returns true when every file succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.summary.failed == 0
    }

    /// Returns the failed file reports.
    pub fn failed_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|file| !file.is_ok())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
