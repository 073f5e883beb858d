// crates/jux-fixtures-core/src/events.rs
// ============================================================================
// Module: Processing Events
// Description: Structured per-file events and the sinks that record them.
// Purpose: Emit JSON-lines processing logs without a logging framework.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! One [`FileEvent`] is recorded per processed fixture. Sinks serialize
//! events as single JSON lines; recording never fails the batch, so write
//! errors are dropped. The default sink records nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::batch::FailureKind;
use crate::batch::FileReport;
use crate::batch::FileStatus;
use crate::batch::Operation;

/// `--event-log` value that selects stderr.
pub const STDERR_TARGET: &str = "-";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Event recorded after one fixture has been processed.
#[derive(Debug, Clone, Serialize)]
pub struct FileEvent<'a> {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Operation performed.
    pub operation: Operation,
    /// Relative input path.
    pub path: &'a str,
    /// Output path, for transforming operations.
    pub output: Option<&'a str>,
    /// File outcome.
    pub status: FileStatus,
    /// Category of the first failure.
    pub error_kind: Option<FailureKind>,
    /// Message of the first failure.
    pub error: Option<&'a str>,
    /// Number of failures recorded.
    pub failures: usize,
}

impl<'a> FileEvent<'a> {
    /// Builds the event for a finished file report.
    #[must_use]
    pub fn from_report(operation: Operation, report: &'a FileReport) -> Self {
        let timestamp_ms = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        let first = report.first_failure();
        Self {
            event: "fixture_processed",
            timestamp_ms,
            operation,
            path: &report.path,
            output: report.output.as_deref(),
            status: report.status,
            error_kind: first.map(|failure| failure.kind),
            error: first.map(|failure| failure.message.as_str()),
            failures: report.failures.len(),
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for processing events.
pub trait EventSink: Send + Sync {
    /// Records one event.
    fn record(&self, event: &FileEvent<'_>);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record(&self, _event: &FileEvent<'_>) {}
}

/// Sink that writes JSON lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrEventSink;

impl EventSink for StderrEventSink {
    fn record(&self, event: &FileEvent<'_>) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
#[derive(Debug)]
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileEventSink {
    /// Opens the event log in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl EventSink for FileEventSink {
    fn record(&self, event: &FileEvent<'_>) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Opens the sink named by an `--event-log` value (`-` is stderr).
///
/// # Errors
///
/// Returns an error when the log file cannot be opened.
pub fn open_event_sink(target: Option<&str>) -> io::Result<Box<dyn EventSink>> {
    Ok(match target {
        None => Box::new(NoopEventSink),
        Some(STDERR_TARGET) => Box::new(StderrEventSink),
        Some(path) => Box::new(FileEventSink::new(Path::new(path))?),
    })
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

    use std::fs;

    use serde_json::Value;

    use super::EventSink;
    use super::FileEvent;
    use super::open_event_sink;
    use crate::batch::FailureKind;
    use crate::batch::FileFailure;
    use crate::batch::FileReport;
    use crate::batch::Operation;

    #[test]
    fn file_sink_appends_one_json_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("events.jsonl");
        let sink = open_event_sink(Some(log.to_str().unwrap())).unwrap();

        let ok = FileReport::new("a.xml", None);
        let mut failed = FileReport::new("b.xml", None);
        failed.fail(FileFailure::new(FailureKind::Malformed, "unexpected end of document"));
        sink.record(&FileEvent::from_report(Operation::Validate, &ok));
        sink.record(&FileEvent::from_report(Operation::Validate, &failed));

        let text = fs::read_to_string(&log).unwrap();
        let lines: Vec<Value> = text.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "fixture_processed");
        assert_eq!(lines[0]["operation"], "validate");
        assert_eq!(lines[0]["status"], "ok");
        assert_eq!(lines[0]["error_kind"], Value::Null);
        assert_eq!(lines[1]["path"], "b.xml");
        assert_eq!(lines[1]["error_kind"], "malformed");
        assert_eq!(lines[1]["failures"], 1);
    }
}
