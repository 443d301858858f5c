// catalog-sync-core/src/runtime/mod.rs
// ============================================================================
// Module: Catalog Sync Runtime
// Description: Validation, compilation, lifecycle, and pagination services.
// Purpose: Execute catalog operations against the collaborator interfaces.
// Dependencies: crate::{core, interfaces}, jsonschema, base64
// ============================================================================

//! ## Overview
//! Runtime modules validate criteria and mappings, compile selections into
//! predicates, manage catalog lifecycles and reconciliation, and serve
//! paginated product UUIDs. The HTTP layer and the CLI call into the same
//! functions so that every surface applies identical rules.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod cache;
pub mod criterion;
pub mod lifecycle;
pub mod mapping;
pub mod pagination;
pub mod schema;
pub mod selection;
pub mod store;
pub mod sync;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache::CachedReferenceData;
pub use criterion::attribute_operators;
pub use criterion::validate_criteria;
pub use lifecycle::CatalogLifecycle;
pub use lifecycle::LifecycleError;
pub use lifecycle::ReconcileReport;
pub use lifecycle::catalog_violations;
pub use mapping::validate_attribute_source;
pub use mapping::validate_mapping;
pub use pagination::PageRequest;
pub use pagination::PaginationLimits;
pub use pagination::UuidPage;
pub use pagination::decode_cursor;
pub use pagination::encode_cursor;
pub use pagination::fetch_page;
pub use schema::MetaSchemaVersion;
pub use schema::validate_mapping_schema;
pub use selection::CompilationError;
pub use selection::compile_selection;
pub use selection::expand_descendants;
pub use store::InMemoryCatalogStore;
pub use store::InMemoryProductStore;
pub use store::InMemoryReferenceData;
pub use store::ReferenceSeed;
pub use store::SharedCatalogStore;
pub use store::SharedLifecycleAuditSink;
pub use store::SharedPermissionProvider;
pub use store::SharedProductQuery;
pub use store::SharedReferenceData;
pub use store::StaticPermissionProvider;
pub use sync::KNOWN_SCOPES;
pub use sync::MANAGE_REFERENCE_DATA_SCOPE;
pub use sync::READ_CATALOGS_SCOPE;
pub use sync::READ_PRODUCTS_SCOPE;
pub use sync::WRITE_CATALOGS_SCOPE;
pub use sync::SyncCaller;
pub use sync::SyncError;
pub use sync::SyncHandler;
pub use sync::SyncOutcome;
pub use validation::ValidationError;
