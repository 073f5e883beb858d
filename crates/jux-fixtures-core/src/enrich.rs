// crates/jux-fixtures-core/src/enrich.rs
// ============================================================================
// Module: Fixture Enrichment
// Description: Inserts the ordered `jux.*` metadata properties into fixtures.
// Purpose: Derive enriched fixtures from raw ones without touching test data.
// Dependencies: time, jux-fixtures-core::{xml, junit, environment}
// ============================================================================

//! ## Overview
//! Enrichment locates (or creates, as the first element child of the root)
//! the root's `properties` container and appends one `property` element per
//! metadata entry, in order. Inserted nodes follow the indentation the
//! document already uses; everything else keeps its original bytes.
//!
//! ## Invariants
//! - The 11 tool keys are always present, in [`MetadataKey::ALL`] order,
//!   followed by caller-supplied extra keys.
//! - Under [`ExistingPolicy::Update`] a property that already exists is
//!   rewritten in place and never duplicated.
//! - Stripping tool properties restores a document that is semantically
//!   equal to the raw fixture.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::UtcOffset;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::dsig;
use crate::environment::EnvironmentFacts;
use crate::junit::JunitError;
use crate::junit::PropertyEntry;
use crate::junit::root_kind;
use crate::xml::Document;
use crate::xml::Element;
use crate::xml::Node;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Name prefix shared by every tool-owned property.
pub const TOOL_PROPERTY_PREFIX: &str = "jux.";

/// Timestamp layout written to `jux.timestamp`.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while enriching or stripping a document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnrichError {
    /// Root element is not a test suite.
    #[error(transparent)]
    Junit(#[from] JunitError),
    /// The document is already signed.
    #[error("document is signed; enrich the unsigned fixture instead")]
    Signed,
    /// A tool property exists and the policy forbids rewriting it.
    #[error("document already carries tool property '{0}'")]
    AlreadyEnriched(String),
    /// A timestamp could not be parsed or formatted.
    #[error("invalid timestamp '{value}': {message}")]
    InvalidTimestamp {
        /// Offending input.
        value: String,
        /// Parser message.
        message: String,
    },
    /// A metadata entry is unusable.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),
    /// Unknown metadata source label.
    #[error("unknown metadata source '{0}'; expected static or environment")]
    UnknownSource(String),
    /// Unknown existing-property policy label.
    #[error("unknown existing-property policy '{0}'; expected update or refuse")]
    UnknownPolicy(String),
}

// ============================================================================
// SECTION: Metadata Keys
// ============================================================================

/// The tool-owned metadata keys, in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKey {
    /// Host name.
    Hostname,
    /// User name.
    Username,
    /// Platform string.
    Platform,
    /// Language runtime version.
    PythonVersion,
    /// Generation timestamp.
    Timestamp,
    /// Project name.
    ProjectName,
    /// VCS commit.
    GitCommit,
    /// VCS branch.
    GitBranch,
    /// Working-tree state.
    GitStatus,
    /// CI provider.
    CiProvider,
    /// CI build identifier.
    CiBuildId,
}

impl MetadataKey {
    /// Every key, in insertion order.
    pub const ALL: [Self; 11] = [
        Self::Hostname,
        Self::Username,
        Self::Platform,
        Self::PythonVersion,
        Self::Timestamp,
        Self::ProjectName,
        Self::GitCommit,
        Self::GitBranch,
        Self::GitStatus,
        Self::CiProvider,
        Self::CiBuildId,
    ];

    /// Property name written to the document.
    #[must_use]
    pub const fn property_name(self) -> &'static str {
        match self {
            Self::Hostname => "jux.hostname",
            Self::Username => "jux.username",
            Self::Platform => "jux.platform",
            Self::PythonVersion => "jux.python_version",
            Self::Timestamp => "jux.timestamp",
            Self::ProjectName => "jux.project_name",
            Self::GitCommit => "jux.git_commit",
            Self::GitBranch => "jux.git_branch",
            Self::GitStatus => "jux.git_status",
            Self::CiProvider => "jux.ci_provider",
            Self::CiBuildId => "jux.ci_build_id",
        }
    }

    /// Reproducible value used by the static source; the timestamp has none.
    #[must_use]
    pub const fn static_value(self) -> Option<&'static str> {
        match self {
            Self::Hostname => Some("build-server-01"),
            Self::Username => Some("ci-user"),
            Self::Platform => Some("Linux-6.1.0-x86_64"),
            Self::PythonVersion => Some("3.12.1"),
            Self::Timestamp => None,
            Self::ProjectName => Some("sample-project"),
            Self::GitCommit => Some("abc123def456789012345678901234567890abcd"),
            Self::GitBranch => Some("main"),
            Self::GitStatus => Some("clean"),
            Self::CiProvider => Some("github"),
            Self::CiBuildId => Some("12345"),
        }
    }
}

// ============================================================================
// SECTION: Metadata
// ============================================================================

/// Where environment metadata values come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataSource {
    /// Fixed reproducible literals.
    #[default]
    Static,
    /// The machine running the tool, with static fallbacks.
    Environment,
}

impl FromStr for MetadataSource {
    type Err = EnrichError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "static" => Ok(Self::Static),
            "environment" => Ok(Self::Environment),
            other => Err(EnrichError::UnknownSource(other.to_string())),
        }
    }
}

/// Ordered metadata entries to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Entries in insertion order.
    entries: Vec<PropertyEntry>,
}

impl Metadata {
    /// Builds the static metadata set with the given timestamp.
    #[must_use]
    pub fn from_static(timestamp: &str) -> Self {
        let entries = MetadataKey::ALL
            .iter()
            .map(|key| PropertyEntry {
                name: key.property_name().to_string(),
                value: key.static_value().unwrap_or(timestamp).to_string(),
            })
            .collect();
        Self {
            entries,
        }
    }

    /// Builds metadata from environment facts, falling back to static values.
    #[must_use]
    pub fn from_environment(facts: &EnvironmentFacts, timestamp: &str) -> Self {
        let mut metadata = Self::from_static(timestamp);
        let discovered = [
            (MetadataKey::Hostname, &facts.hostname),
            (MetadataKey::Username, &facts.username),
            (MetadataKey::Platform, &facts.platform),
            (MetadataKey::PythonVersion, &facts.python_version),
            (MetadataKey::ProjectName, &facts.project_name),
            (MetadataKey::GitCommit, &facts.git_commit),
            (MetadataKey::GitBranch, &facts.git_branch),
            (MetadataKey::GitStatus, &facts.git_status),
            (MetadataKey::CiProvider, &facts.ci_provider),
            (MetadataKey::CiBuildId, &facts.ci_build_id),
        ];
        for (key, value) in discovered {
            if let Some(value) = value {
                metadata.upsert(key.property_name(), value);
            }
        }
        metadata
    }

    /// Overrides a value, or appends an extra entry after the existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::InvalidMetadata`] for an empty or
    /// whitespace-containing name.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), EnrichError> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(EnrichError::InvalidMetadata(format!(
                "property name '{name}' must be non-empty and contain no whitespace"
            )));
        }
        self.upsert(name, value);
        Ok(())
    }

    /// Returns the value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|entry| entry.name == name).map(|entry| entry.value.as_str())
    }

    /// Returns the entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[PropertyEntry] {
        &self.entries
    }

    /// Replaces or appends an entry.
    fn upsert(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.name == name) {
            value.clone_into(&mut entry.value);
        } else {
            self.entries.push(PropertyEntry {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
    }
}

// ============================================================================
// SECTION: Timestamps
// ============================================================================

/// Returns the current UTC time in `YYYY-MM-DDTHH:MM:SSZ` form.
///
/// # Errors
///
/// Returns [`EnrichError::InvalidTimestamp`] if formatting fails.
pub fn current_timestamp() -> Result<String, EnrichError> {
    format_timestamp(OffsetDateTime::now_utc())
}

/// Parses an RFC 3339 timestamp and re-renders it in UTC `...Z` form.
///
/// # Errors
///
/// Returns [`EnrichError::InvalidTimestamp`] for unparseable input.
pub fn normalize_timestamp(value: &str) -> Result<String, EnrichError> {
    let parsed = OffsetDateTime::parse(value, &Rfc3339).map_err(|err| EnrichError::InvalidTimestamp {
        value: value.to_string(),
        message: err.to_string(),
    })?;
    format_timestamp(parsed)
}

/// Formats a timestamp in UTC with whole seconds.
fn format_timestamp(moment: OffsetDateTime) -> Result<String, EnrichError> {
    moment.to_offset(UtcOffset::UTC).format(TIMESTAMP_FORMAT).map_err(|err| {
        EnrichError::InvalidTimestamp {
            value: moment.to_string(),
            message: err.to_string(),
        }
    })
}

// ============================================================================
// SECTION: Enricher
// ============================================================================

/// Handling of properties that already exist in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingPolicy {
    /// Rewrite existing values in place.
    #[default]
    Update,
    /// Reject documents that already carry tool properties.
    Refuse,
}

impl FromStr for ExistingPolicy {
    type Err = EnrichError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "update" => Ok(Self::Update),
            "refuse" => Ok(Self::Refuse),
            other => Err(EnrichError::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for ExistingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Update => "update",
            Self::Refuse => "refuse",
        })
    }
}

/// What enrichment changed in one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichOutcome {
    /// Properties appended.
    pub inserted: usize,
    /// Existing properties rewritten.
    pub updated: usize,
    /// Whether the `properties` container was created.
    pub created_container: bool,
}

/// Applies one metadata set to documents.
#[derive(Debug, Clone)]
pub struct Enricher {
    /// Entries to insert.
    metadata: Metadata,
    /// Existing-property policy.
    policy: ExistingPolicy,
}

/// Indentation used for inserted nodes.
struct Indent {
    /// Indentation of root children; `None` for compact documents.
    child: Option<String>,
    /// One indentation step.
    unit: String,
}

impl Enricher {
    /// Creates an enricher.
    #[must_use]
    pub const fn new(metadata: Metadata, policy: ExistingPolicy) -> Self {
        Self {
            metadata,
            policy,
        }
    }

    /// Returns the metadata being inserted.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Inserts the metadata into `document`.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError`] when the root is not a test suite, the
    /// document is signed, or the policy refuses existing tool properties.
    pub fn enrich(&self, document: &mut Document) -> Result<EnrichOutcome, EnrichError> {
        let root = document.root_mut();
        root_kind(root)?;
        if dsig::is_signed(root) {
            return Err(EnrichError::Signed);
        }
        let namespace = root.namespace().map(str::to_string);
        let prefix = root.prefix().map(str::to_string);
        if self.policy == ExistingPolicy::Refuse
            && let Some(container) = find_container(root, namespace.as_deref())
            && let Some(name) = tool_property_names(container).next()
        {
            return Err(EnrichError::AlreadyEnriched(name.to_string()));
        }

        let indent = Indent::of(root);
        let property_indent = indent.child.as_ref().map(|child| format!("{child}{}", indent.unit));
        let names = Names {
            namespace: namespace.as_deref(),
            prefix: prefix.as_deref(),
        };
        let mut outcome = EnrichOutcome::default();

        let existing = root
            .children_mut()
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find(|child| child.is(names.namespace, "properties"));
        if let Some(container) = existing {
            let inner = container.child_indentation().map(str::to_string).or(property_indent);
            self.fill(container, &names, inner.as_deref(), indent.child.as_deref(), &mut outcome);
            return Ok(outcome);
        }

        let mut container = names.element("properties");
        self.fill(&mut container, &names, property_indent.as_deref(), indent.child.as_deref(), &mut outcome);
        insert_container(root, container, indent.child.as_deref());
        outcome.created_container = true;
        Ok(outcome)
    }

    /// Upserts every metadata entry into a container.
    fn fill(
        &self,
        container: &mut Element,
        names: &Names<'_>,
        property_indent: Option<&str>,
        closing_indent: Option<&str>,
        outcome: &mut EnrichOutcome,
    ) {
        for entry in self.metadata.entries() {
            let existing = container
                .children_mut()
                .iter_mut()
                .filter_map(Node::as_element_mut)
                .find(|child| {
                    child.is(names.namespace, "property") && child.attribute("name") == Some(entry.name.as_str())
                });
            if let Some(property) = existing {
                if property.attribute("value") != Some(entry.value.as_str()) {
                    property.set_attribute("value", &entry.value);
                }
                outcome.updated += 1;
                continue;
            }
            let property =
                names.element("property").with_attribute("name", &entry.name).with_attribute("value", &entry.value);
            append_indented(container, property, property_indent, closing_indent);
            outcome.inserted += 1;
        }
    }
}

/// Name and namespace for inserted elements, following the root's own.
struct Names<'a> {
    /// Root namespace.
    namespace: Option<&'a str>,
    /// Root prefix.
    prefix: Option<&'a str>,
}

impl Names<'_> {
    /// Creates an element named like the root's siblings would be.
    fn element(&self, local: &str) -> Element {
        let name = match self.prefix {
            Some(prefix) => format!("{prefix}:{local}"),
            None => local.to_string(),
        };
        Element::in_namespace(name, self.namespace)
    }
}

impl Indent {
    /// Infers indentation from the root's children.
    fn of(root: &Element) -> Self {
        let child = match root.child_indentation() {
            Some(child) => Some(child.to_string()),
            None if root.child_elements().next().is_none()
                && root.children().iter().any(Node::is_indentation) =>
            {
                Some("  ".to_string())
            }
            None => None,
        };
        let unit = match child.as_deref() {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => "  ".to_string(),
        };
        Self {
            child,
            unit,
        }
    }
}

/// Appends `child`, keeping any trailing line-break whitespace last.
fn append_indented(parent: &mut Element, child: Element, indent: Option<&str>, closing: Option<&str>) {
    let children = parent.children_mut();
    let Some(indent) = indent else {
        children.push(Node::Element(child));
        return;
    };
    let trailing = children.last().is_some_and(Node::is_indentation);
    let at = if trailing { children.len() - 1 } else { children.len() };
    children.insert(at, Node::Text(format!("\n{indent}")));
    children.insert(at + 1, Node::Element(child));
    if !trailing {
        children.push(Node::Text(format!("\n{}", closing.unwrap_or_default())));
    }
}

/// Inserts a new container before the root's first child element.
fn insert_container(root: &mut Element, container: Element, indent: Option<&str>) {
    let children = root.children_mut();
    match children.iter().position(|child| child.as_element().is_some()) {
        Some(index) => {
            children.insert(index, Node::Element(container));
            if let Some(indent) = indent {
                children.insert(index + 1, Node::Text(format!("\n{indent}")));
            }
        }
        None => append_indented(root, container, indent, Some("")),
    }
}

/// Finds the root's `properties` container.
fn find_container<'a>(root: &'a Element, namespace: Option<&str>) -> Option<&'a Element> {
    root.find_child(namespace, "properties")
}

/// Names of tool-owned properties in a container.
fn tool_property_names(container: &Element) -> impl Iterator<Item = &str> {
    container
        .child_elements()
        .filter(|child| child.local_name() == "property")
        .filter_map(|child| child.attribute("name"))
        .filter(|name| name.starts_with(TOOL_PROPERTY_PREFIX))
}

// ============================================================================
// SECTION: Strip
// ============================================================================

/// Removes every `jux.*` property and a container left empty.
///
/// Returns the number of properties removed.
///
/// # Errors
///
/// Returns [`EnrichError::Junit`] when the root is not a test suite.
pub fn strip_tool_properties(document: &mut Document) -> Result<usize, EnrichError> {
    let root = document.root_mut();
    root_kind(root)?;
    let namespace = root.namespace().map(str::to_string);
    let Some(index) = root
        .children()
        .iter()
        .position(|child| child.as_element().is_some_and(|element| element.is(namespace.as_deref(), "properties")))
    else {
        return Ok(0);
    };
    let has_tool_properties = root
        .children()
        .get(index)
        .and_then(Node::as_element)
        .is_some_and(|container| tool_property_names(container).next().is_some());
    if !has_tool_properties {
        return Ok(0);
    }

    let children = root.children_mut();
    let Some(container) = children.get_mut(index).and_then(Node::as_element_mut) else {
        return Ok(0);
    };
    let removed = remove_tool_properties(container);
    if container.child_elements().next().is_none() {
        children.remove(index);
        if index > 0 && children.get(index - 1).is_some_and(Node::is_indentation) {
            children.remove(index - 1);
        }
    }
    Ok(removed)
}

/// Drops tool properties and their leading indentation from a container.
fn remove_tool_properties(container: &mut Element) -> usize {
    let children = std::mem::take(container.children_mut());
    let mut kept: Vec<Node> = Vec::with_capacity(children.len());
    let mut removed = 0;
    for node in children {
        let is_tool = node.as_element().is_some_and(|element| {
            element.local_name() == "property"
                && element.attribute("name").is_some_and(|name| name.starts_with(TOOL_PROPERTY_PREFIX))
        });
        if is_tool {
            if kept.last().is_some_and(Node::is_indentation) {
                kept.pop();
            }
            removed += 1;
            continue;
        }
        kept.push(node);
    }
    *container.children_mut() = kept;
    removed
}

// ============================================================================
// SECTION: Tests
// ============================================================================
