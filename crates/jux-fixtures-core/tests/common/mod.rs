// crates/jux-fixtures-core/tests/common/mod.rs
// ============================================================================
// Module: Shared Test Helpers
// Description: Paths to the checked-in fixture tree and test keys.
// Purpose: Keep integration tests independent of the working directory.
// ============================================================================

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers.")]
#![allow(clippy::unwrap_used, reason = "Tests use unwrap on checked-in fixtures.")]

use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Returns the repository `fixtures/` directory.
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}

/// Returns the raw fixture tree.
pub fn raw_dir() -> PathBuf {
    fixtures_dir().join("raw")
}

/// Returns the malformed fixture directory.
pub fn malformed_dir() -> PathBuf {
    fixtures_dir().join("malformed")
}

/// Returns the JUnit schema path.
pub fn schema_path() -> PathBuf {
    fixtures_dir().join("schemas/junit-10.xsd")
}

/// Reads a PEM file from `fixtures/keys`.
pub fn key(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join("keys").join(name)).unwrap()
}

/// Reads a raw fixture by relative path.
pub fn raw(relative: &str) -> String {
    fs::read_to_string(raw_dir().join(relative)).unwrap()
}

/// Lists `*.xml` paths under `root`, relative and sorted.
pub fn xml_files(root: &Path) -> Vec<String> {
    let mut found = Vec::new();
    collect(root, root, &mut found);
    found.sort();
    found
}

fn collect(root: &Path, dir: &Path, found: &mut Vec<String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, found);
        } else if path.extension().is_some_and(|extension| extension == "xml") {
            let relative = path.strip_prefix(root).unwrap();
            let parts: Vec<String> =
                relative.components().map(|part| part.as_os_str().to_string_lossy().into_owned()).collect();
            found.push(parts.join("/"));
        }
    }
}
