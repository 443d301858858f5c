// catalog-sync-core/src/lib.rs
// ============================================================================
// Module: Catalog Sync Core Library
// Description: Public API surface for the catalog selection and mapping engine.
// Purpose: Expose core types, interfaces, and runtime services.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Catalog sync core compiles integrator-defined product selections into
//! executable predicates, validates product mappings against versioned
//! meta-schemas and live reference data, manages catalog lifecycles, and
//! serves cursor-paginated product UUID pages. It is backend-agnostic and
//! reaches storage and the PIM only through [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::CatalogStore;
pub use interfaces::LifecycleAuditSink;
pub use interfaces::NoopLifecycleAuditSink;
pub use interfaces::PermissionProvider;
pub use interfaces::ProductQuery;
pub use interfaces::ReferenceData;
pub use interfaces::ReferenceError;
pub use interfaces::StoreError;
pub use runtime::CachedReferenceData;
pub use runtime::CatalogLifecycle;
pub use runtime::CompilationError;
pub use runtime::InMemoryCatalogStore;
pub use runtime::InMemoryProductStore;
pub use runtime::InMemoryReferenceData;
pub use runtime::KNOWN_SCOPES;
pub use runtime::LifecycleError;
pub use runtime::MANAGE_REFERENCE_DATA_SCOPE;
pub use runtime::MetaSchemaVersion;
pub use runtime::PageRequest;
pub use runtime::PaginationLimits;
pub use runtime::READ_CATALOGS_SCOPE;
pub use runtime::READ_PRODUCTS_SCOPE;
pub use runtime::ReconcileReport;
pub use runtime::ReferenceSeed;
pub use runtime::SharedCatalogStore;
pub use runtime::SharedLifecycleAuditSink;
pub use runtime::SharedPermissionProvider;
pub use runtime::SharedProductQuery;
pub use runtime::SharedReferenceData;
pub use runtime::StaticPermissionProvider;
pub use runtime::SyncCaller;
pub use runtime::SyncError;
pub use runtime::SyncHandler;
pub use runtime::SyncOutcome;
pub use runtime::UuidPage;
pub use runtime::ValidationError;
pub use runtime::WRITE_CATALOGS_SCOPE;
pub use runtime::catalog_violations;
pub use runtime::compile_selection;
pub use runtime::validate_attribute_source;
pub use runtime::validate_criteria;
pub use runtime::validate_mapping;
pub use runtime::validate_mapping_schema;
