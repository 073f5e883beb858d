// crates/jux-fixtures-config/src/config.rs
// ============================================================================
// Module: Fixture Tool Configuration
// Description: Configuration loading and validation for the fixture tooling.
// Purpose: Provide strict config parsing with hard limits.
// Dependencies: jux-fixtures-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is an optional TOML file with strict size and path limits.
//! The file is looked up from an explicit path, then the
//! `JUX_FIXTURES_CONFIG` environment variable, then `jux-fixtures.toml` in
//! the working directory. Only the last of these may be absent; an explicit
//! or environment-supplied path that cannot be read is an error.
//!
//! Unknown keys are rejected. Signing keys are never read from
//! configuration and must be passed on the command line.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use jux_fixtures_core::CanonicalizationMethod;
use jux_fixtures_core::ExistingPolicy;
use jux_fixtures_core::MetadataSource;
use jux_fixtures_core::enrich::normalize_timestamp;
use jux_fixtures_core::events::STDERR_TARGET;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "jux-fixtures.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "JUX_FIXTURES_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of `[enrich.metadata]` overrides.
pub(crate) const MAX_METADATA_OVERRIDES: usize = 256;
/// Maximum length of a project name.
pub(crate) const MAX_PROJECT_NAME_LENGTH: usize = 256;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading config.
    #[error("config io error: {0}")]
    Io(String),
    /// Parsing error for config contents.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Top-Level Config
// ============================================================================

/// Fixture tool configuration loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixturesConfig {
    /// Enrichment defaults.
    #[serde(default)]
    pub enrich: EnrichConfig,
    /// Signing defaults.
    #[serde(default)]
    pub sign: SignConfig,
    /// Validation defaults.
    #[serde(default)]
    pub validate: ValidateConfig,
    /// Output defaults.
    #[serde(default)]
    pub output: OutputConfig,
    /// Path the configuration was loaded from, when a file was found.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl FixturesConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// Returns the built-in defaults when no path is given, the environment
    /// variable is unset, and `jux-fixtures.toml` does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path, env::var(CONFIG_ENV_VAR).ok())?;
        validate_path(&resolved.path)?;
        if !resolved.required && !resolved.path.exists() {
            return Ok(Self::default());
        }
        let mut config = Self::load_file(&resolved.path)?;
        config.source = Some(resolved.path);
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// Timestamps are normalized to `YYYY-MM-DDTHH:MM:SSZ` in place.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.enrich.validate()?;
        self.sign.validate()?;
        self.validate.validate()?;
        self.output.validate()?;
        Ok(())
    }

    /// Reads one config file with size and encoding checks.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }
}

// ============================================================================
// SECTION: Enrich Config
// ============================================================================

/// `[enrich]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnrichConfig {
    /// Metadata source.
    #[serde(default)]
    pub source: Option<MetadataSource>,
    /// Pinned `jux.timestamp` value.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Pinned `jux.project_name` value.
    #[serde(default)]
    pub project_name: Option<String>,
    /// JSON object file with extra or overriding metadata.
    #[serde(default)]
    pub metadata_file: Option<PathBuf>,
    /// Policy for documents that already carry tool properties.
    #[serde(default)]
    pub on_existing: Option<ExistingPolicy>,
    /// Inline metadata overrides, applied after `metadata_file`.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl EnrichConfig {
    /// Validates the enrichment section.
    fn validate(&mut self) -> Result<(), ConfigError> {
        if let Some(timestamp) = &self.timestamp {
            let normalized = normalize_timestamp(timestamp)
                .map_err(|err| ConfigError::Invalid(format!("enrich.timestamp: {err}")))?;
            self.timestamp = Some(normalized);
        }
        if let Some(name) = &self.project_name {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("enrich.project_name must be non-empty".to_string()));
            }
            if name.len() > MAX_PROJECT_NAME_LENGTH {
                return Err(ConfigError::Invalid("enrich.project_name exceeds max length".to_string()));
            }
        }
        if let Some(path) = &self.metadata_file {
            validate_path_string("enrich.metadata_file", &path.to_string_lossy())?;
        }
        if self.metadata.len() > MAX_METADATA_OVERRIDES {
            return Err(ConfigError::Invalid("enrich.metadata has too many entries".to_string()));
        }
        for name in self.metadata.keys() {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid(format!(
                    "enrich.metadata key '{name}' must be non-empty and contain no whitespace"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Sign Config
// ============================================================================

/// `[sign]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignConfig {
    /// Canonicalization label (`c14n`, `c14n-with-comments`, `exc-c14n`,
    /// `exc-c14n-with-comments`).
    #[serde(default)]
    pub canonicalization: Option<String>,
    /// PEM certificate embedded in every signature.
    #[serde(default)]
    pub certificate: Option<PathBuf>,
}

impl SignConfig {
    /// Returns the configured canonicalization, if any.
    ///
    /// Labels are checked by [`FixturesConfig::validate`]; an unknown label
    /// yields `None` here.
    #[must_use]
    pub fn canonicalization_method(&self) -> Option<CanonicalizationMethod> {
        self.canonicalization.as_deref().and_then(CanonicalizationMethod::from_label)
    }

    /// Validates the signing section.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(label) = &self.canonicalization
            && CanonicalizationMethod::from_label(label).is_none()
        {
            return Err(ConfigError::Invalid(format!(
                "sign.canonicalization '{label}' is not one of c14n, c14n-with-comments, \
                 exc-c14n, exc-c14n-with-comments"
            )));
        }
        if let Some(path) = &self.certificate {
            validate_path_string("sign.certificate", &path.to_string_lossy())?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Validate Config
// ============================================================================

/// `[validate]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidateConfig {
    /// XSD schema applied to every file.
    #[serde(default)]
    pub schema: Option<PathBuf>,
    /// Excludes files under `malformed` directories.
    #[serde(default)]
    pub skip_malformed: Option<bool>,
}

impl ValidateConfig {
    /// Validates the validation section.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.schema {
            validate_path_string("validate.schema", &path.to_string_lossy())?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Output Config
// ============================================================================

/// Report rendering format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable progress lines.
    #[default]
    Text,
    /// Canonical JSON batch report.
    Json,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Report format.
    #[serde(default)]
    pub format: Option<OutputFormat>,
    /// Event log target: a file path, or `-` for stderr.
    #[serde(default)]
    pub event_log: Option<String>,
}

impl OutputConfig {
    /// Validates the output section.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(target) = &self.event_log
            && target != STDERR_TARGET
        {
            validate_path_string("output.event_log", target)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Path Resolution
// ============================================================================

/// A config path plus whether it must exist.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedPath {
    /// Path to read.
    path: PathBuf,
    /// True when the caller or environment named the file explicitly.
    required: bool,
}

/// Resolves the config path from an explicit path, env value, or default.
fn resolve_path(path: Option<&Path>, env_value: Option<String>) -> Result<ResolvedPath, ConfigError> {
    if let Some(path) = path {
        return Ok(ResolvedPath {
            path: path.to_path_buf(),
            required: true,
        });
    }
    if let Some(env_path) = env_value.filter(|value| !value.is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ResolvedPath {
            path: PathBuf::from(env_path),
            required: true,
        });
    }
    Ok(ResolvedPath {
        path: PathBuf::from(DEFAULT_CONFIG_NAME),
        required: false,
    })
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
