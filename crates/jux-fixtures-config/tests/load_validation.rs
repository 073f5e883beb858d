// crates/jux-fixtures-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards and section parsing.
// Purpose: Ensure config input handling is strict and fails closed.
// ============================================================================

//! ## Overview
//! Loads configuration files from scratch directories and checks the path,
//! size, and encoding guards plus per-section validation.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use jux_fixtures_config::ConfigError;
use jux_fixtures_config::FixturesConfig;
use jux_fixtures_config::OutputFormat;
use jux_fixtures_core::CanonicalizationMethod;
use jux_fixtures_core::ExistingPolicy;
use jux_fixtures_core::MetadataSource;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<FixturesConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file
}

// ============================================================================
// SECTION: Load Guards
// ============================================================================

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(FixturesConfig::load(Some(Path::new(&long_path))), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_invalid(
        FixturesConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}

#[test]
fn load_rejects_missing_explicit_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let missing = dir.path().join("absent.toml");
    assert_invalid(FixturesConfig::load(Some(&missing)), "config io error")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'#'; 1_048_577]);
    assert_invalid(FixturesConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF]);
    assert_invalid(FixturesConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_rejects_unknown_keys() -> TestResult {
    let file = write_config(b"[sign]\nkey = \"private.pem\"\n");
    assert_invalid(FixturesConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn load_rejects_unknown_sections() -> TestResult {
    let file = write_config(b"[server]\nport = 1\n");
    assert_invalid(FixturesConfig::load(Some(file.path())), "config parse error")
}

// ============================================================================
// SECTION: Sections
// ============================================================================

#[test]
fn load_reads_every_section() {
    let file = write_config(
        br#"
[enrich]
source = "environment"
timestamp = "2025-01-15T10:30:00Z"
project_name = "fixtures"
metadata_file = "metadata.json"
on_existing = "refuse"

[enrich.metadata]
"jux.ci_provider" = "gitlab"
"custom.flag" = "on"

[sign]
canonicalization = "exc-c14n"
certificate = "keys/cert.pem"

[validate]
schema = "fixtures/schemas/junit-10.xsd"
skip_malformed = true

[output]
format = "json"
event_log = "-"
"#,
    );

    let config = FixturesConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.source.as_deref(), Some(file.path()));
    assert_eq!(config.enrich.source, Some(MetadataSource::Environment));
    assert_eq!(config.enrich.on_existing, Some(ExistingPolicy::Refuse));
    assert_eq!(config.enrich.project_name.as_deref(), Some("fixtures"));
    assert_eq!(config.enrich.metadata_file, Some(PathBuf::from("metadata.json")));
    assert_eq!(config.enrich.metadata.get("jux.ci_provider").map(String::as_str), Some("gitlab"));
    assert_eq!(config.sign.canonicalization_method(), Some(CanonicalizationMethod::Exclusive));
    assert_eq!(config.sign.certificate, Some(PathBuf::from("keys/cert.pem")));
    assert_eq!(config.validate.skip_malformed, Some(true));
    assert_eq!(config.output.format, Some(OutputFormat::Json));
    assert_eq!(config.output.event_log.as_deref(), Some("-"));
}

#[test]
fn empty_file_yields_defaults() {
    let file = write_config(b"");
    let mut config = FixturesConfig::load(Some(file.path())).unwrap();
    config.source = None;
    assert_eq!(config, FixturesConfig::default());
}

#[test]
fn rejects_unknown_metadata_source() -> TestResult {
    assert_invalid(FixturesConfig::from_toml_str("[enrich]\nsource = \"network\"\n"), "config parse error")
}

#[test]
fn rejects_unknown_existing_policy() -> TestResult {
    assert_invalid(FixturesConfig::from_toml_str("[enrich]\non_existing = \"skip\"\n"), "config parse error")
}

#[test]
fn rejects_invalid_timestamp() -> TestResult {
    assert_invalid(FixturesConfig::from_toml_str("[enrich]\ntimestamp = \"yesterday\"\n"), "enrich.timestamp")
}

#[test]
fn rejects_blank_project_name() -> TestResult {
    assert_invalid(
        FixturesConfig::from_toml_str("[enrich]\nproject_name = \"  \"\n"),
        "enrich.project_name must be non-empty",
    )
}

#[test]
fn rejects_whitespace_metadata_keys() -> TestResult {
    assert_invalid(
        FixturesConfig::from_toml_str("[enrich.metadata]\n\"bad key\" = \"x\"\n"),
        "enrich.metadata key 'bad key'",
    )
}

#[test]
fn rejects_unknown_canonicalization() -> TestResult {
    assert_invalid(
        FixturesConfig::from_toml_str("[sign]\ncanonicalization = \"c14n11\"\n"),
        "sign.canonicalization 'c14n11'",
    )
}

#[test]
fn rejects_empty_schema_path() -> TestResult {
    assert_invalid(
        FixturesConfig::from_toml_str("[validate]\nschema = \"\"\n"),
        "validate.schema must be non-empty",
    )
}

#[test]
fn rejects_unknown_output_format() -> TestResult {
    assert_invalid(FixturesConfig::from_toml_str("[output]\nformat = \"yaml\"\n"), "config parse error")
}
