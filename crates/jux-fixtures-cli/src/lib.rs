// crates/jux-fixtures-cli/src/lib.rs
// ============================================================================
// Module: JUX Fixtures CLI Library
// Description: Shared helpers for the `jux-fixtures` command-line interface.
// Purpose: Provide the message catalog to the CLI binary and tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! This library module houses the CLI message catalog. The binary entry
//! point (`src/main.rs`) imports it so all user-facing output is consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Message catalog and the `t!` macro.
pub mod i18n;

#[cfg(test)]
mod tests;
