// crates/jux-fixtures-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! Every line the `jux-fixtures` binary prints goes through the
//! [`t!`](crate::t) macro and this catalog, so wording stays consistent
//! across commands.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself.
//! - Placeholder substitutions happen in argument order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries.
const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "jux-fixtures {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.serialize_failed", "Failed to serialize report: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("input.read_failed", "Failed to read {kind} at {path}: {error}"),
    ("input.kind.private_key", "private key"),
    ("input.kind.public_key", "verification key"),
    ("input.kind.certificate", "certificate"),
    ("input.kind.metadata", "metadata file"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("events.open_failed", "Failed to open event log {path}: {error}"),
    ("tree.failed", "Cannot process {path}: {error}"),
    ("enrich.timestamp_invalid", "Invalid timestamp: {error}"),
    ("enrich.metadata.parse_failed", "Failed to parse metadata file {path}: {error}"),
    ("enrich.metadata.not_object", "Metadata file {path} must contain a JSON object."),
    ("enrich.metadata.invalid", "Invalid metadata: {error}"),
    ("enrich.ok", "Enriched: {input} -> {output}"),
    ("sign.key_failed", "Error loading private key from {path}: {error}"),
    ("sign.key_loaded", "Loaded private key from {path} ({algorithm})"),
    ("sign.cert_failed", "Error loading certificate from {path}: {error}"),
    ("sign.cert_loaded", "Loaded certificate from {path}"),
    ("sign.ok", "Signed: {input} -> {output}"),
    ("verify.key_failed", "Error loading verification key from {path}: {error}"),
    ("verify.ok", "VALID:   {path} ({algorithm})"),
    ("strip.ok", "Stripped: {input} -> {output} ({removed} removed)"),
    ("validate.schema_failed", "Error loading schema: {error}"),
    ("validate.schema_loaded", "Loaded schema: {path}"),
    ("validate.found", "Found {count} XML files to validate"),
    ("validate.ok", "VALID:   {path}"),
    ("file.error", "Error processing {path}:"),
    ("file.invalid", "INVALID: {path}"),
    ("file.failure", "    {kind}: {message}"),
    ("file.failure_at", "    {kind} at {line}:{column}: {message}"),
    ("file.failure_constraint", "    {kind} at {line}:{column} [{constraint}]: {message}"),
    ("summary.processed", "Processed {total} files:"),
    ("summary.success", "  Success: {count}"),
    ("summary.errors", "  Errors: {count}"),
    ("summary.validation.header", "Validation Results:"),
    ("summary.validation.valid", "  Valid:   {count}"),
    ("summary.validation.invalid", "  Invalid: {count}"),
    ("summary.validation.total", "  Total:   {count}"),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the English catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

/// Returns the static catalog.
pub(crate) fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
