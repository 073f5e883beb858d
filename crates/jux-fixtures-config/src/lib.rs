// crates/jux-fixtures-config/src/lib.rs
// ============================================================================
// Module: JUX Fixtures Config Library
// Description: Configuration model for the fixture tooling.
// Purpose: Expose config loading and validation to the CLI.
// Dependencies: jux-fixtures-core, serde, toml
// ============================================================================

//! ## Overview
//! Loads the optional `jux-fixtures.toml` file that supplies defaults for the
//! `enrich`, `sign`, `validate`, and output settings. Command-line flags take
//! precedence over anything loaded here.

pub mod config;

pub use config::*;
