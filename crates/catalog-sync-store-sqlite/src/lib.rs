// catalog-sync-store-sqlite/src/lib.rs
// ============================================================================
// Module: Catalog Sync SQLite Store
// Description: SQLite-backed catalog persistence and product query.
// Purpose: Provide a durable backend for the catalog sync service.
// Dependencies: catalog-sync-core, rusqlite
// ============================================================================

//! ## Overview
//! Durable implementation of [`catalog_sync_core::CatalogStore`] and
//! [`catalog_sync_core::ProductQuery`] on a single `SQLite` database file.

pub mod store;

pub use store::MAX_CATALOG_BYTES;
pub use store::MAX_PRODUCT_BYTES;
pub use store::SqliteCatalogStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
