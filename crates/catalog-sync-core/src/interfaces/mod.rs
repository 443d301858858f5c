// catalog-sync-core/src/interfaces/mod.rs
// ============================================================================
// Module: Catalog Sync Interfaces
// Description: Backend-agnostic interfaces for storage, reference data, and audit.
// Purpose: Define the contract surfaces consumed by the catalog runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the catalog engine reaches the PIM without embedding
//! backend details: catalogs and products live behind [`CatalogStore`] and
//! [`ProductQuery`], attribute/channel/locale metadata behind
//! [`ReferenceData`], and category grants behind [`PermissionProvider`].
//! Implementations fail closed: lookups that cannot be answered return an
//! error, never a guessed value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Attribute;
use crate::core::AttributeCode;
use crate::core::Catalog;
use crate::core::CatalogId;
use crate::core::Category;
use crate::core::CategoryCode;
use crate::core::Channel;
use crate::core::ChannelCode;
use crate::core::DisableCause;
use crate::core::Family;
use crate::core::FamilyCode;
use crate::core::LifecycleEvent;
use crate::core::Locale;
use crate::core::LocaleCode;
use crate::core::OwnerCode;
use crate::core::PermissionScope;
use crate::core::ProductPredicate;
use crate::core::ProductUuid;
use crate::core::ReferenceKey;

// ============================================================================
// SECTION: Catalog Store
// ============================================================================

/// Catalog and product store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store I/O error.
    #[error("catalog store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("catalog store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("catalog store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("catalog store invalid data: {0}")]
    Invalid(String),
    /// Record already exists.
    #[error("catalog store conflict: {0}")]
    Conflict(String),
    /// Record does not exist.
    #[error("catalog store missing record: {0}")]
    NotFound(String),
    /// Store reported an error.
    #[error("catalog store error: {0}")]
    Store(String),
}

/// Catalog persistence.
///
/// Every write keeps the catalog's reverse reference index in step with its
/// criteria and mapping.
pub trait CatalogStore {
    /// Inserts a new catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the identifier is taken.
    fn create(&self, catalog: &Catalog) -> Result<(), StoreError>;

    /// Loads a catalog by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get(&self, id: &CatalogId) -> Result<Option<Catalog>, StoreError>;

    /// Lists the catalogs of an owner in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_by_owner(&self, owner: &OwnerCode) -> Result<Vec<Catalog>, StoreError>;

    /// Replaces the criteria, mapping schema and mapping of an existing
    /// catalog atomically.
    ///
    /// The stored enabled flag and disable cause are kept; only
    /// [`CatalogStore::set_enabled`] changes them.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the catalog does not exist.
    fn save(&self, catalog: &Catalog) -> Result<(), StoreError>;

    /// Sets the enabled flag of several catalogs; unknown ids are skipped.
    ///
    /// Enabling clears the disable cause; disabling records `cause`. Returns
    /// the ids whose flag actually changed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn set_enabled(
        &self,
        ids: &[CatalogId],
        enabled: bool,
        cause: Option<DisableCause>,
    ) -> Result<Vec<CatalogId>, StoreError>;

    /// Returns enabled catalogs whose criteria or mapping reference `key`,
    /// in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn find_enabled_referencing(&self, key: &ReferenceKey) -> Result<Vec<CatalogId>, StoreError>;

    /// Reports store readiness.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Product Query
// ============================================================================

/// Ordered product UUID lookup.
pub trait ProductQuery {
    /// Returns up to `limit` UUIDs of matching products, strictly greater
    /// than `after`, in ascending UUID order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn query_uuids(
        &self,
        predicate: &ProductPredicate,
        after: Option<&ProductUuid>,
        limit: usize,
    ) -> Result<Vec<ProductUuid>, StoreError>;
}

// ============================================================================
// SECTION: Reference Data
// ============================================================================

/// Reference data lookup errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// Reference source is unavailable.
    #[error("reference data unavailable: {0}")]
    Unavailable(String),
    /// Reference source returned malformed data.
    #[error("reference data invalid: {0}")]
    Invalid(String),
}

/// Read-only PIM reference data.
///
/// Missing entities are `Ok(None)`; deleted channels are returned with
/// `deleted = true` or not at all.
pub trait ReferenceData {
    /// Looks up an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] when the lookup fails.
    fn attribute(&self, code: &AttributeCode) -> Result<Option<Attribute>, ReferenceError>;

    /// Looks up a channel.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] when the lookup fails.
    fn channel(&self, code: &ChannelCode) -> Result<Option<Channel>, ReferenceError>;

    /// Lists all non-deleted channels.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] when the lookup fails.
    fn channels(&self) -> Result<Vec<Channel>, ReferenceError>;

    /// Looks up a locale.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] when the lookup fails.
    fn locale(&self, code: &LocaleCode) -> Result<Option<Locale>, ReferenceError>;

    /// Looks up a family.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] when the lookup fails.
    fn family(&self, code: &FamilyCode) -> Result<Option<Family>, ReferenceError>;

    /// Looks up a category.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] when the lookup fails.
    fn category(&self, code: &CategoryCode) -> Result<Option<Category>, ReferenceError>;

    /// Lists the direct children of a category.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] when the lookup fails.
    fn category_children(&self, code: &CategoryCode) -> Result<Vec<CategoryCode>, ReferenceError>;
}

// ============================================================================
// SECTION: Permissions
// ============================================================================

/// Category permission lookup for catalog owners.
pub trait PermissionProvider {
    /// Returns the categories an owner may see.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] when permissions cannot be resolved.
    fn permission_scope(&self, owner: &OwnerCode) -> Result<PermissionScope, ReferenceError>;
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink for catalog lifecycle events.
pub trait LifecycleAuditSink: Send + Sync {
    /// Record a lifecycle event.
    fn record_lifecycle(&self, event: &LifecycleEvent);
}

/// Lifecycle audit sink that drops every event.
pub struct NoopLifecycleAuditSink;

impl LifecycleAuditSink for NoopLifecycleAuditSink {
    fn record_lifecycle(&self, _event: &LifecycleEvent) {}
}
