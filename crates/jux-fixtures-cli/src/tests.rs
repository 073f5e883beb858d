// crates/jux-fixtures-cli/src/tests.rs
// ============================================================================
// Module: CLI Test Lint Configuration
// Description: Shared test-only lint relaxations for CLI unit tests.
// Purpose: Allow panic-based assertions in tests.
// Dependencies: jux-fixtures-cli
// ============================================================================

//! ## Overview
//! Provides test-only lint relaxations for CLI library unit tests.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Modules
// ============================================================================
