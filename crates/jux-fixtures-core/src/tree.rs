// crates/jux-fixtures-core/src/tree.rs
// ============================================================================
// Module: Fixture Trees
// Description: Discovery, bounded reads, and atomic writes of fixture files.
// Purpose: Keep raw, enriched, and signed trees isomorphic by relative path.
// Dependencies: tempfile, thiserror
// ============================================================================

//! ## Overview
//! A fixture tree is every `*.xml` file below a root directory, discovered
//! in sorted order so batch reports are deterministic. Symlinked entries are
//! skipped and each directory is visited once. Output paths mirror the input
//! relative path under the output root.
//!
//! Writes go through a temporary file in the destination directory that is
//! renamed into place, so an output file is either absent, the previous
//! version, or complete.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::fs::File;
use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a single fixture file.
pub const MAX_FIXTURE_BYTES: usize = 16 * 1024 * 1024;

/// File extension of fixture files.
pub const FIXTURE_EXTENSION: &str = "xml";

/// Directory name holding intentionally malformed fixtures.
pub const MALFORMED_DIR: &str = "malformed";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while preparing a fixture tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    /// Input root is missing or not a directory.
    #[error("input root {0} is not a directory")]
    NotADirectory(String),
    /// Directory listing failed.
    #[error("failed to read {path}: {message}")]
    Io {
        /// Path being read.
        path: String,
        /// Underlying error text.
        message: String,
    },
    /// Input and output roots overlap in a way that would clobber inputs.
    #[error("output root {output} overlaps input root {input}")]
    OverlappingRoots {
        /// Input root.
        input: String,
        /// Output root.
        output: String,
    },
}

/// Errors raised by [`read_bytes_with_limit`].
#[derive(Debug, Error)]
pub enum ReadLimitError {
    /// File I/O failure.
    #[error("{0}")]
    Io(#[from] io::Error),
    /// File size exceeds the limit.
    #[error("file is {size} bytes, which exceeds the {limit} byte limit")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Fixture Files
// ============================================================================

/// One discovered fixture file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FixtureFile {
    /// Path relative to the tree root.
    relative: PathBuf,
    /// Path as reachable from the working directory.
    absolute: PathBuf,
}

impl FixtureFile {
    /// Creates an entry from its root and relative path.
    #[must_use]
    pub fn new(root: &Path, relative: PathBuf) -> Self {
        Self {
            absolute: root.join(&relative),
            relative,
        }
    }

    /// Returns the path to read.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.absolute
    }

    /// Returns the path relative to the tree root.
    #[must_use]
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Returns the relative path with `/` separators for reports.
    #[must_use]
    pub fn display_path(&self) -> String {
        self.relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Returns the mirrored path under `output_root`.
    #[must_use]
    pub fn mirrored(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.relative)
    }

    /// Returns true when any directory of the relative path is `malformed`.
    #[must_use]
    pub fn is_malformed_fixture(&self) -> bool {
        self.relative
            .parent()
            .is_some_and(|parent| parent.components().any(|component| component.as_os_str() == MALFORMED_DIR))
    }
}

// ============================================================================
// SECTION: Discovery
// ============================================================================

/// Lists `*.xml` files under `root` in sorted relative-path order.
///
/// Entries under `exclude` (typically an output root nested in the input)
/// are skipped, as are symlinks.
///
/// # Errors
///
/// Returns [`TreeError::NotADirectory`] when `root` is not a directory and
/// [`TreeError::Io`] when a directory cannot be listed.
pub fn discover_fixtures(root: &Path, exclude: Option<&Path>) -> Result<Vec<FixtureFile>, TreeError> {
    if !root.is_dir() {
        return Err(TreeError::NotADirectory(root.display().to_string()));
    }
    let excluded = exclude.and_then(|path| path.canonicalize().ok());
    let mut walk = Walk {
        root,
        excluded,
        visited: BTreeSet::new(),
        files: Vec::new(),
    };
    walk.directory(root)?;
    let mut files = walk.files;
    files.sort();
    Ok(files)
}

/// Recursive directory walk state.
struct Walk<'a> {
    /// Tree root.
    root: &'a Path,
    /// Canonical subtree to skip.
    excluded: Option<PathBuf>,
    /// Canonical directories already visited.
    visited: BTreeSet<PathBuf>,
    /// Files found so far.
    files: Vec<FixtureFile>,
}

impl Walk<'_> {
    /// Collects fixtures from `dir` and its subdirectories.
    fn directory(&mut self, dir: &Path) -> Result<(), TreeError> {
        let io_error = |err: io::Error| TreeError::Io {
            path: dir.display().to_string(),
            message: err.to_string(),
        };
        let canonical = dir.canonicalize().map_err(io_error)?;
        if self.excluded.as_ref() == Some(&canonical) || !self.visited.insert(canonical) {
            return Ok(());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            let file_type = entry.file_type().map_err(io_error)?;
            entries.push((entry.path(), file_type));
        }
        entries.sort_by(|(left, _), (right, _)| left.cmp(right));

        for (path, file_type) in entries {
            if file_type.is_symlink() {
                continue;
            }
            if file_type.is_dir() {
                self.directory(&path)?;
                continue;
            }
            let is_fixture = path.extension().is_some_and(|extension| extension == FIXTURE_EXTENSION);
            if !file_type.is_file() || !is_fixture {
                continue;
            }
            if let Ok(relative) = path.strip_prefix(self.root) {
                self.files.push(FixtureFile::new(self.root, relative.to_path_buf()));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Root Checks
// ============================================================================

/// Rejects output roots that equal or contain the input root.
///
/// An output root nested inside the input root is allowed; discovery
/// excludes it so reruns do not pick up their own outputs.
///
/// # Errors
///
/// Returns [`TreeError::OverlappingRoots`] when the roots are the same
/// directory or the input lies inside the output, and [`TreeError::Io`] when
/// the input root cannot be resolved.
pub fn ensure_disjoint_roots(input: &Path, output: &Path) -> Result<(), TreeError> {
    let input_abs = input.canonicalize().map_err(|err| TreeError::Io {
        path: input.display().to_string(),
        message: err.to_string(),
    })?;
    let output_abs = resolve_lexically(output);
    if input_abs.starts_with(&output_abs) {
        return Err(TreeError::OverlappingRoots {
            input: input.display().to_string(),
            output: output.display().to_string(),
        });
    }
    Ok(())
}

/// Resolves a possibly nonexistent path through its deepest existing ancestor.
fn resolve_lexically(path: &Path) -> PathBuf {
    let mut existing = path.to_path_buf();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            let mut resolved = canonical;
            for component in missing.iter().rev() {
                resolved.push(component);
            }
            return resolved;
        }
        match (existing.file_name().map(ToOwned::to_owned), existing.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name);
                existing = if parent.as_os_str().is_empty() { PathBuf::from(".") } else { parent.to_path_buf() };
            }
            _ => break,
        }
    }
    let mut fallback = std::env::current_dir().unwrap_or_default();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                fallback.pop();
            }
            Component::CurDir => {}
            other => fallback.push(other.as_os_str()),
        }
    }
    fallback
}

// ============================================================================
// SECTION: File I/O
// ============================================================================

/// Reads a file from disk while enforcing a hard size limit.
///
/// # Errors
///
/// Returns [`ReadLimitError::Io`] on I/O failure and
/// [`ReadLimitError::TooLarge`] when the file exceeds `max_bytes`.
pub fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Writes `bytes` to `path` through a renamed temporary file.
///
/// Parent directories are created as needed.
///
/// # Errors
///
/// Returns the underlying I/O error, including when `path` is a directory.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    if path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::IsADirectory,
            format!("{} is a directory", path.display()),
        ));
    }
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
