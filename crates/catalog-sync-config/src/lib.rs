// catalog-sync-config/src/lib.rs
// ============================================================================
// Module: Catalog Sync Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for catalog-sync.toml semantics.
// Dependencies: catalog-sync-core, catalog-sync-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `catalog-sync-config` defines the configuration model for the catalog
//! sync service and validates it strictly. Invalid or oversized input fails
//! closed; nothing is silently defaulted past validation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
