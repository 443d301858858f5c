// catalog-sync-cli/src/lib.rs
// ============================================================================
// Module: Catalog Sync CLI Library
// Description: Shared helpers for the catalog sync command-line interface.
// Purpose: Provide the message catalog to the binary and its tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! Houses the message catalog used by the `catalog-sync` binary
//! (`src/main.rs`) so every command prints consistent text.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Message catalog and the `t!` macro.
pub mod messages;
