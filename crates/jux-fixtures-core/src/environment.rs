// crates/jux-fixtures-core/src/environment.rs
// ============================================================================
// Module: Environment Probe
// Description: Collects host, VCS, and CI facts for environment metadata.
// Purpose: Fill enrichment properties from the machine running the tool.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment-sourced metadata reads variables, files, and the output of a
//! few commands (`git`, `python3`). All access goes through the
//! [`EnvironmentProbe`] trait so tests can supply deterministic facts.
//! Missing facts stay `None`; callers fall back to static defaults.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;

// ============================================================================
// SECTION: Probe Trait
// ============================================================================

/// Read-only access to the host environment.
pub trait EnvironmentProbe {
    /// Returns a non-empty environment variable.
    fn var(&self, name: &str) -> Option<String>;

    /// Runs a command and returns its trimmed standard output on success.
    fn command_output(&self, program: &str, args: &[&str]) -> Option<String>;

    /// Reads a small text file and returns its trimmed contents.
    fn read_file(&self, path: &Path) -> Option<String>;

    /// Returns the current working directory.
    fn current_dir(&self) -> Option<PathBuf>;

    /// Returns the operating system family (as `std::env::consts::OS`).
    fn os(&self) -> String {
        std::env::consts::OS.to_string()
    }

    /// Returns the CPU architecture (as `std::env::consts::ARCH`).
    fn arch(&self) -> String {
        std::env::consts::ARCH.to_string()
    }
}

/// Probe backed by the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl EnvironmentProbe for SystemProbe {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|value| !value.trim().is_empty())
    }

    fn command_output(&self, program: &str, args: &[&str]) -> Option<String> {
        let output =
            Command::new(program).args(args).stdin(Stdio::null()).stderr(Stdio::null()).output().ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8(output.stdout).ok().map(|text| text.trim().to_string())
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok().map(|text| text.trim().to_string())
    }

    fn current_dir(&self) -> Option<PathBuf> {
        std::env::current_dir().ok()
    }
}

// ============================================================================
// SECTION: Facts
// ============================================================================

/// Facts gathered from the environment; absent entries were not discoverable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentFacts {
    /// Host name.
    pub hostname: Option<String>,
    /// Login name of the invoking user.
    pub username: Option<String>,
    /// Platform string (`<OS>-<release>-<arch>`).
    pub platform: Option<String>,
    /// Python interpreter version.
    pub python_version: Option<String>,
    /// Project name (repository directory name).
    pub project_name: Option<String>,
    /// Current commit hash.
    pub git_commit: Option<String>,
    /// Current branch name.
    pub git_branch: Option<String>,
    /// Working tree state (`clean` or `dirty`).
    pub git_status: Option<String>,
    /// CI provider identifier.
    pub ci_provider: Option<String>,
    /// CI build identifier.
    pub ci_build_id: Option<String>,
}

/// CI provider detection table: marker variable, provider, build-id variables.
const CI_PROVIDERS: &[(&str, &str, &[&str])] = &[
    ("GITHUB_ACTIONS", "github", &["GITHUB_RUN_ID"]),
    ("GITLAB_CI", "gitlab", &["CI_PIPELINE_ID", "CI_JOB_ID"]),
    ("JENKINS_URL", "jenkins", &["BUILD_NUMBER", "BUILD_ID"]),
    ("CIRCLECI", "circleci", &["CIRCLE_BUILD_NUM"]),
    ("TRAVIS", "travis", &["TRAVIS_BUILD_ID"]),
    ("BUILDKITE", "buildkite", &["BUILDKITE_BUILD_NUMBER"]),
    ("TF_BUILD", "azure-pipelines", &["BUILD_BUILDID"]),
];

/// Provider reported when no CI system is detected.
pub const LOCAL_CI_PROVIDER: &str = "local";
/// Build identifier reported when no CI system is detected.
pub const LOCAL_CI_BUILD_ID: &str = "none";

/// Gathers environment facts through `probe`.
#[must_use]
pub fn collect_facts(probe: &dyn EnvironmentProbe) -> EnvironmentFacts {
    let (ci_provider, ci_build_id) = detect_ci(probe);
    EnvironmentFacts {
        hostname: hostname(probe),
        username: first_var(probe, &["USER", "USERNAME", "LOGNAME"]),
        platform: platform(probe),
        python_version: python_version(probe),
        project_name: project_name(probe),
        git_commit: probe.command_output("git", &["rev-parse", "HEAD"]),
        git_branch: probe
            .command_output("git", &["rev-parse", "--abbrev-ref", "HEAD"])
            .filter(|branch| !branch.is_empty()),
        git_status: probe
            .command_output("git", &["status", "--porcelain"])
            .map(|status| if status.is_empty() { "clean" } else { "dirty" }.to_string()),
        ci_provider: Some(ci_provider),
        ci_build_id: Some(ci_build_id),
    }
}

/// Returns the first set variable among `names`.
fn first_var(probe: &dyn EnvironmentProbe, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| probe.var(name))
}

/// Resolves the host name.
fn hostname(probe: &dyn EnvironmentProbe) -> Option<String> {
    first_var(probe, &["HOSTNAME", "COMPUTERNAME"])
        .or_else(|| probe.read_file(Path::new("/etc/hostname")).filter(|name| !name.is_empty()))
        .or_else(|| probe.command_output("hostname", &[]).filter(|name| !name.is_empty()))
}

/// Builds `<OS>-<release>-<arch>`.
fn platform(probe: &dyn EnvironmentProbe) -> Option<String> {
    let os = match probe.os().as_str() {
        "linux" => "Linux".to_string(),
        "macos" => "Darwin".to_string(),
        "windows" => "Windows".to_string(),
        other => other.to_string(),
    };
    let release = probe
        .read_file(Path::new("/proc/sys/kernel/osrelease"))
        .or_else(|| probe.command_output("uname", &["-r"]))
        .filter(|release| !release.is_empty());
    let arch = probe.arch();
    Some(match release {
        Some(release) => format!("{os}-{release}-{arch}"),
        None => format!("{os}-{arch}"),
    })
}

/// Reads the Python version from `python3 --version`.
fn python_version(probe: &dyn EnvironmentProbe) -> Option<String> {
    probe
        .command_output("python3", &["--version"])
        .or_else(|| probe.command_output("python", &["--version"]))
        .and_then(|output| output.strip_prefix("Python ").map(|version| version.trim().to_string()))
}

/// Uses the repository (or working directory) name as project name.
fn project_name(probe: &dyn EnvironmentProbe) -> Option<String> {
    probe
        .command_output("git", &["rev-parse", "--show-toplevel"])
        .map(PathBuf::from)
        .or_else(|| probe.current_dir())
        .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
}

/// Detects the CI provider and build identifier.
fn detect_ci(probe: &dyn EnvironmentProbe) -> (String, String) {
    for (marker, provider, build_vars) in CI_PROVIDERS {
        if probe.var(marker).is_some() {
            let build_id = first_var(probe, build_vars).unwrap_or_else(|| LOCAL_CI_BUILD_ID.to_string());
            return ((*provider).to_string(), build_id);
        }
    }
    (LOCAL_CI_PROVIDER.to_string(), LOCAL_CI_BUILD_ID.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
