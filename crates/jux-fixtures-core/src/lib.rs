// crates/jux-fixtures-core/src/lib.rs
// ============================================================================
// Module: JUX Fixtures Core Library
// Description: Public API surface for fixture enrichment, signing, and checks.
// Purpose: Expose the XML model, signature, schema, and tree pipeline APIs.
// Dependencies: crate::{xml, c14n, dsig, junit, enrich, schema, pipeline}
// ============================================================================

//! ## Overview
//! JUX fixtures core turns a directory of JUnit XML samples into enriched
//! and signed mirror trees, verifies enveloped XML signatures, and checks
//! documents for well-formedness and XSD conformance. Everything runs
//! single-threaded over one file at a time; per-file problems land in a
//! [`BatchReport`] rather than aborting the run.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod batch;
pub mod c14n;
pub mod dsig;
pub mod enrich;
pub mod environment;
pub mod events;
pub mod junit;
pub mod pipeline;
pub mod schema;
pub mod tree;
pub mod xml;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use batch::BatchReport;
pub use batch::BatchSummary;
pub use batch::FailureKind;
pub use batch::FileFailure;
pub use batch::FileReport;
pub use batch::FileStatus;
pub use batch::Operation;
pub use c14n::CanonicalizationMethod;
pub use dsig::FixtureSigner;
pub use dsig::FixtureVerifier;
pub use dsig::KeyError;
pub use dsig::SignOptions;
pub use dsig::SignatureAlgorithm;
pub use dsig::SignatureError;
pub use dsig::load_certificate_pem;
pub use dsig::load_signing_key_pem;
pub use dsig::load_verifying_key_pem;
pub use enrich::EnrichError;
pub use enrich::Enricher;
pub use enrich::ExistingPolicy;
pub use enrich::Metadata;
pub use enrich::MetadataSource;
pub use environment::SystemProbe;
pub use environment::collect_facts;
pub use events::EventSink;
pub use events::open_event_sink;
pub use pipeline::FixtureValidator;
pub use pipeline::enrich_tree;
pub use pipeline::sign_tree;
pub use pipeline::strip_tree;
pub use pipeline::validate_tree;
pub use pipeline::verify_tree;
pub use schema::Schema;
pub use schema::SchemaError;
pub use tree::TreeError;
pub use xml::Document;
pub use xml::XmlError;
