// crates/jux-fixtures-cli/src/main.rs
// ============================================================================
// Module: JUX Fixtures CLI Entry Point
// Description: Command dispatcher for fixture enrichment, signing, and checks.
// Purpose: Provide the `jux-fixtures` binary over the fixture tree pipeline.
// Dependencies: clap, jux-fixtures-config, jux-fixtures-core, serde_jcs.
// ============================================================================

//! ## Overview
//! The `jux-fixtures` binary runs one tree operation per invocation:
//! `enrich`, `sign`, `verify`, `validate`, or `strip`. Settings come from
//! command-line flags first, then the optional config file, then built-in
//! defaults. Configuration problems (bad keys, schemas, config files,
//! overlapping roots) stop the run before any file is touched; per-file
//! problems are reported and the batch continues. The exit status is zero
//! only when every file succeeded.
//!
//! All user-facing strings are routed through the message catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use jux_fixtures_cli::t;
use jux_fixtures_config::EnrichConfig;
use jux_fixtures_config::FixturesConfig;
use jux_fixtures_config::OutputFormat;
use jux_fixtures_core::BatchReport;
use jux_fixtures_core::CanonicalizationMethod;
use jux_fixtures_core::Enricher;
use jux_fixtures_core::EventSink;
use jux_fixtures_core::ExistingPolicy;
use jux_fixtures_core::FileFailure;
use jux_fixtures_core::FileReport;
use jux_fixtures_core::FixtureSigner;
use jux_fixtures_core::FixtureValidator;
use jux_fixtures_core::FixtureVerifier;
use jux_fixtures_core::Metadata;
use jux_fixtures_core::MetadataSource;
use jux_fixtures_core::Operation;
use jux_fixtures_core::Schema;
use jux_fixtures_core::SignOptions;
use jux_fixtures_core::SystemProbe;
use jux_fixtures_core::TreeError;
use jux_fixtures_core::collect_facts;
use jux_fixtures_core::enrich::MetadataKey;
use jux_fixtures_core::enrich::current_timestamp;
use jux_fixtures_core::enrich::normalize_timestamp;
use jux_fixtures_core::enrich_tree;
use jux_fixtures_core::load_certificate_pem;
use jux_fixtures_core::load_signing_key_pem;
use jux_fixtures_core::load_verifying_key_pem;
use jux_fixtures_core::open_event_sink;
use jux_fixtures_core::sign_tree;
use jux_fixtures_core::strip_tree;
use jux_fixtures_core::tree::ReadLimitError;
use jux_fixtures_core::tree::read_bytes_with_limit;
use jux_fixtures_core::validate_tree;
use jux_fixtures_core::verify_tree;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a PEM key or certificate file.
const MAX_PEM_BYTES: usize = 64 * 1024;
/// Maximum size of a `--metadata-file` JSON document.
const MAX_METADATA_FILE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "jux-fixtures", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Config file path (defaults to jux-fixtures.toml or `JUX_FIXTURES_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Report format.
    #[arg(long, value_enum, value_name = "FORMAT", global = true)]
    format: Option<FormatArg>,
    /// Structured event log: a file path, or `-` for stderr.
    #[arg(long, value_name = "PATH", global = true)]
    event_log: Option<String>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert `jux.*` metadata properties into every fixture.
    Enrich(EnrichCommand),
    /// Append an enveloped XML signature to every fixture.
    Sign(SignCommand),
    /// Verify the enveloped signature of every fixture.
    Verify(VerifyCommand),
    /// Check fixtures for well-formedness and schema conformance.
    Validate(ValidateCommand),
    /// Remove `jux.*` metadata properties from every fixture.
    Strip(StripCommand),
}

/// Arguments for `enrich`.
#[derive(Args, Debug)]
struct EnrichCommand {
    /// Directory containing raw fixtures.
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Output directory for enriched fixtures.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
    /// Where metadata values come from.
    #[arg(long, value_enum)]
    source: Option<SourceArg>,
    /// Pin `jux.timestamp` (RFC 3339).
    #[arg(long, value_name = "ISO")]
    timestamp: Option<String>,
    /// Pin `jux.project_name`.
    #[arg(long, value_name = "NAME")]
    project_name: Option<String>,
    /// JSON object with extra or overriding metadata values.
    #[arg(long, value_name = "JSON")]
    metadata_file: Option<PathBuf>,
    /// Handling of documents that already carry `jux.*` properties.
    #[arg(long, value_enum)]
    on_existing: Option<PolicyArg>,
}

/// Arguments for `sign`.
#[derive(Args, Debug)]
struct SignCommand {
    /// Directory containing enriched fixtures.
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Output directory for signed fixtures.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
    /// PEM private key (RSA or ECDSA P-256).
    #[arg(long, value_name = "PEM")]
    key: PathBuf,
    /// PEM certificate to embed as `X509Data`.
    #[arg(long = "cert", value_name = "PEM")]
    certificate: Option<PathBuf>,
    /// Canonicalization applied to `SignedInfo`.
    #[arg(long, value_enum)]
    canonicalization: Option<CanonicalizationArg>,
}

/// Arguments for `verify`.
#[derive(Args, Debug)]
struct VerifyCommand {
    /// Directory containing signed fixtures.
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// PEM public key (or private key) to verify with.
    #[arg(long, value_name = "PEM")]
    key: PathBuf,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Directory containing fixtures to check.
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// XSD schema to validate against.
    #[arg(long, value_name = "XSD")]
    schema: Option<PathBuf>,
    /// Skip files under directories named `malformed`.
    #[arg(long, action = ArgAction::SetTrue)]
    skip_malformed: bool,
}

/// Arguments for `strip`.
#[derive(Args, Debug)]
struct StripCommand {
    /// Directory containing enriched fixtures.
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Output directory for stripped fixtures.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
}

/// Report formats.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum FormatArg {
    /// Progress lines and summaries.
    Text,
    /// Canonical JSON batch report.
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Metadata sources.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum SourceArg {
    /// Fixed reproducible values.
    Static,
    /// Values discovered on this machine.
    Environment,
}

impl From<SourceArg> for MetadataSource {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::Static => Self::Static,
            SourceArg::Environment => Self::Environment,
        }
    }
}

/// Existing-property policies.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum PolicyArg {
    /// Rewrite existing values in place.
    Update,
    /// Reject documents that already carry tool properties.
    Refuse,
}

impl From<PolicyArg> for ExistingPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Update => Self::Update,
            PolicyArg::Refuse => Self::Refuse,
        }
    }
}

/// Canonicalization algorithms.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum CanonicalizationArg {
    /// Canonical XML 1.0.
    #[value(name = "c14n")]
    C14n,
    /// Canonical XML 1.0 with comments.
    #[value(name = "c14n-with-comments")]
    C14nWithComments,
    /// Exclusive canonicalization.
    #[value(name = "exc-c14n")]
    ExcC14n,
    /// Exclusive canonicalization with comments.
    #[value(name = "exc-c14n-with-comments")]
    ExcC14nWithComments,
}

impl From<CanonicalizationArg> for CanonicalizationMethod {
    fn from(value: CanonicalizationArg) -> Self {
        match value {
            CanonicalizationArg::C14n => Self::Inclusive,
            CanonicalizationArg::C14nWithComments => Self::InclusiveWithComments,
            CanonicalizationArg::ExcC14n => Self::Exclusive,
            CanonicalizationArg::ExcC14nWithComments => Self::ExclusiveWithComments,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config = FixturesConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let format = cli.format.map(OutputFormat::from).or(config.output.format).unwrap_or_default();
    let event_log = cli.event_log.as_deref().or(config.output.event_log.as_deref());
    let sink = open_event_sink(event_log).map_err(|err| {
        CliError::new(t!("events.open_failed", path = event_log.unwrap_or_default(), error = err))
    })?;
    let mut output = Output::new(format);

    let report = match command {
        Commands::Enrich(command) => command_enrich(&command, &config, sink.as_ref())?,
        Commands::Sign(command) => command_sign(&command, &config, sink.as_ref(), &mut output)?,
        Commands::Verify(command) => command_verify(&command, sink.as_ref())?,
        Commands::Validate(command) => {
            command_validate(&command, &config, sink.as_ref(), &mut output)?
        }
        Commands::Strip(command) => command_strip(&command, sink.as_ref())?,
    };

    output.report(&report)?;
    output.flush()?;
    Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Prints the top-level help text.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Enrich Command
// ============================================================================

/// Executes the `enrich` command.
fn command_enrich(
    command: &EnrichCommand,
    config: &FixturesConfig,
    sink: &dyn EventSink,
) -> CliResult<BatchReport> {
    let metadata = build_metadata(command, &config.enrich)?;
    let policy = command.on_existing.map(ExistingPolicy::from).or(config.enrich.on_existing).unwrap_or_default();
    let enricher = Enricher::new(metadata, policy);
    enrich_tree(&command.input, &command.output, &enricher, sink)
        .map_err(|err| tree_error(&command.input, &err))
}

/// Builds the metadata set for `enrich` from flags, config, and defaults.
///
/// Layers apply in order: the source's base values, the metadata file,
/// inline `[enrich.metadata]` overrides, then pinned project name and
/// timestamp.
fn build_metadata(command: &EnrichCommand, config: &EnrichConfig) -> CliResult<Metadata> {
    let pinned_timestamp = command.timestamp.as_deref().or(config.timestamp.as_deref());
    let timestamp = match pinned_timestamp {
        Some(value) => normalize_timestamp(value),
        None => current_timestamp(),
    }
    .map_err(|err| CliError::new(t!("enrich.timestamp_invalid", error = err)))?;

    let source = command.source.map(MetadataSource::from).or(config.source).unwrap_or_default();
    let mut metadata = match source {
        MetadataSource::Static => Metadata::from_static(&timestamp),
        MetadataSource::Environment => Metadata::from_environment(&collect_facts(&SystemProbe), &timestamp),
    };

    let mut overrides = Vec::new();
    if let Some(path) = command.metadata_file.as_deref().or(config.metadata_file.as_deref()) {
        overrides.extend(read_metadata_file(path)?);
    }
    overrides.extend(config.metadata.iter().map(|(name, value)| (name.clone(), value.clone())));
    if let Some(name) = command.project_name.as_deref().or(config.project_name.as_deref()) {
        overrides.push((MetadataKey::ProjectName.property_name().to_string(), name.to_string()));
    }
    if pinned_timestamp.is_some() {
        overrides.push((MetadataKey::Timestamp.property_name().to_string(), timestamp));
    }
    for (name, value) in overrides {
        metadata
            .set(&name, &value)
            .map_err(|err| CliError::new(t!("enrich.metadata.invalid", error = err)))?;
    }
    Ok(metadata)
}

/// Reads a JSON object of metadata overrides.
///
/// String values are used as-is; other JSON values are rendered as JSON.
fn read_metadata_file(path: &Path) -> CliResult<Vec<(String, String)>> {
    let bytes = read_input(path, &t!("input.kind.metadata"), MAX_METADATA_FILE_BYTES)?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|err| {
        CliError::new(t!("enrich.metadata.parse_failed", path = path.display(), error = err))
    })?;
    let Value::Object(entries) = value else {
        return Err(CliError::new(t!("enrich.metadata.not_object", path = path.display())));
    };
    Ok(entries
        .into_iter()
        .map(|(name, value)| {
            let text = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            (name, text)
        })
        .collect())
}

// ============================================================================
// SECTION: Sign and Verify Commands
// ============================================================================

/// Executes the `sign` command.
fn command_sign(
    command: &SignCommand,
    config: &FixturesConfig,
    sink: &dyn EventSink,
    output: &mut Output,
) -> CliResult<BatchReport> {
    let pem = read_pem(&command.key, &t!("input.kind.private_key"))?;
    let key = load_signing_key_pem(&pem).map_err(|err| {
        CliError::new(t!("sign.key_failed", path = command.key.display(), error = err))
    })?;
    output.note(&t!("sign.key_loaded", path = command.key.display(), algorithm = key.algorithm().label()));

    let certificate = match command.certificate.as_deref().or(config.sign.certificate.as_deref()) {
        Some(path) => {
            let pem = read_pem(path, &t!("input.kind.certificate"))?;
            let der = load_certificate_pem(&pem).map_err(|err| {
                CliError::new(t!("sign.cert_failed", path = path.display(), error = err))
            })?;
            output.note(&t!("sign.cert_loaded", path = path.display()));
            Some(der)
        }
        None => None,
    };
    let canonicalization = command
        .canonicalization
        .map(CanonicalizationMethod::from)
        .or_else(|| config.sign.canonicalization_method())
        .unwrap_or_default();

    let signer = FixtureSigner::new(key, SignOptions {
        canonicalization,
        certificate,
    });
    sign_tree(&command.input, &command.output, &signer, sink).map_err(|err| tree_error(&command.input, &err))
}

/// Executes the `verify` command.
fn command_verify(command: &VerifyCommand, sink: &dyn EventSink) -> CliResult<BatchReport> {
    let pem = read_pem(&command.key, &t!("input.kind.public_key"))?;
    let key = load_verifying_key_pem(&pem).map_err(|err| {
        CliError::new(t!("verify.key_failed", path = command.key.display(), error = err))
    })?;
    verify_tree(&command.input, &FixtureVerifier::new(key), sink).map_err(|err| tree_error(&command.input, &err))
}

// ============================================================================
// SECTION: Validate and Strip Commands
// ============================================================================

/// Executes the `validate` command.
fn command_validate(
    command: &ValidateCommand,
    config: &FixturesConfig,
    sink: &dyn EventSink,
    output: &mut Output,
) -> CliResult<BatchReport> {
    let schema = match command.schema.as_deref().or(config.validate.schema.as_deref()) {
        Some(path) => {
            let schema = Schema::load(path)
                .map_err(|err| CliError::new(t!("validate.schema_failed", error = err)))?;
            output.note(&t!("validate.schema_loaded", path = path.display()));
            Some(schema)
        }
        None => None,
    };
    let skip_malformed = command.skip_malformed || config.validate.skip_malformed.unwrap_or(false);
    let validator = FixtureValidator::new(schema, skip_malformed);
    validate_tree(&command.input, &validator, sink).map_err(|err| tree_error(&command.input, &err))
}

/// Executes the `strip` command.
fn command_strip(command: &StripCommand, sink: &dyn EventSink) -> CliResult<BatchReport> {
    strip_tree(&command.input, &command.output, sink).map_err(|err| tree_error(&command.input, &err))
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Reads a PEM file as UTF-8 text.
fn read_pem(path: &Path, kind: &str) -> CliResult<String> {
    let bytes = read_input(path, kind, MAX_PEM_BYTES)?;
    String::from_utf8(bytes).map_err(|err| {
        CliError::new(t!("input.read_failed", kind = kind, path = path.display(), error = err))
    })
}

/// Reads an input file with a size limit.
fn read_input(path: &Path, kind: &str, max_bytes: usize) -> CliResult<Vec<u8>> {
    read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(t!("input.read_failed", kind = kind, path = path.display(), error = err))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )),
    })
}

/// Formats a fatal tree error.
fn tree_error(input: &Path, error: &TreeError) -> CliError {
    CliError::new(t!("tree.failed", path = input.display(), error = error))
}

// ============================================================================
// SECTION: Report Rendering
// ============================================================================

/// Buffered stdout rendering for one run.
struct Output {
    /// Selected report format.
    format: OutputFormat,
    /// Pending text.
    buffer: String,
}

impl Output {
    /// Creates an empty output buffer.
    const fn new(format: OutputFormat) -> Self {
        Self {
            format,
            buffer: String::new(),
        }
    }

    /// Adds an informational line; JSON output carries only the report.
    fn note(&mut self, line: &str) {
        if self.format == OutputFormat::Text {
            self.push_line(line);
        }
    }

    /// Renders the batch report in the selected format.
    fn report(&mut self, report: &BatchReport) -> CliResult<()> {
        match self.format {
            OutputFormat::Text => {
                self.buffer.push_str(&render_text(report));
                Ok(())
            }
            OutputFormat::Json => {
                let json = serde_jcs::to_string(report)
                    .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
                self.push_line(&json);
                Ok(())
            }
        }
    }

    /// Writes everything buffered to stdout.
    fn flush(&mut self) -> CliResult<()> {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(self.buffer.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        self.buffer.clear();
        Ok(())
    }

    /// Appends one line.
    fn push_line(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }
}

/// Renders a batch report as progress lines plus a summary.
fn render_text(report: &BatchReport) -> String {
    let mut lines = Vec::new();
    let checking = matches!(report.operation, Operation::Verify | Operation::Validate);
    if report.operation == Operation::Validate {
        lines.push(t!("validate.found", count = report.summary.total));
        lines.push(String::new());
    }
    for file in &report.files {
        if file.is_ok() {
            lines.push(success_line(report, file));
            continue;
        }
        if checking {
            lines.push(t!("file.invalid", path = file.path));
        } else {
            lines.push(t!("file.error", path = input_path(report, file)));
        }
        lines.extend(file.failures.iter().map(failure_line));
    }
    lines.push(String::new());
    if checking {
        lines.push(t!("summary.validation.header"));
        lines.push(t!("summary.validation.valid", count = report.summary.succeeded));
        lines.push(t!("summary.validation.invalid", count = report.summary.failed));
        lines.push(t!("summary.validation.total", count = report.summary.total));
    } else {
        lines.push(t!("summary.processed", total = report.summary.total));
        lines.push(t!("summary.success", count = report.summary.succeeded));
        lines.push(t!("summary.errors", count = report.summary.failed));
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Formats the progress line of a successful file.
fn success_line(report: &BatchReport, file: &FileReport) -> String {
    let input = input_path(report, file);
    let output = file.output.as_deref().unwrap_or_default();
    match report.operation {
        Operation::Enrich => t!("enrich.ok", input = input, output = output),
        Operation::Sign => t!("sign.ok", input = input, output = output),
        Operation::Strip => {
            t!("strip.ok", input = input, output = output, removed = file.removed.unwrap_or_default())
        }
        Operation::Verify => t!(
            "verify.ok",
            path = file.path,
            algorithm = file.algorithm.map_or("unknown", |algorithm| algorithm.label())
        ),
        Operation::Validate => t!("validate.ok", path = file.path),
    }
}

/// Formats one failure detail line.
fn failure_line(failure: &FileFailure) -> String {
    let kind = failure.kind.label();
    match (failure.line, failure.column, failure.constraint.as_deref()) {
        (Some(line), Some(column), Some(constraint)) => t!(
            "file.failure_constraint",
            kind = kind,
            line = line,
            column = column,
            constraint = constraint,
            message = failure.message
        ),
        (Some(line), Some(column), None) => {
            t!("file.failure_at", kind = kind, line = line, column = column, message = failure.message)
        }
        _ => t!("file.failure", kind = kind, message = failure.message),
    }
}

/// Returns the input path of a file as displayed to users.
fn input_path(report: &BatchReport, file: &FileReport) -> String {
    Path::new(&report.input_root).join(&file.path).display().to_string()
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
