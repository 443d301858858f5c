// catalog-sync-core/src/runtime/sync.rs
// ============================================================================
// Module: Product Sync Handler
// Description: Serves product UUID pages for a catalog to its owner.
// Purpose: Enforce scope, ownership, and catalog state before querying.
// Dependencies: crate::{core, interfaces, runtime}, thiserror
// ============================================================================

//! ## Overview
//! The sync handler answers "which products does this catalog select?" one
//! page at a time. Checks run in a fixed order: caller scopes, pagination
//! parameters, catalog visibility, catalog state. A disabled catalog is not
//! an error: it yields [`SyncOutcome::Unavailable`] with the fixed disabled
//! message. An enabled catalog whose stored criteria or mapping no longer
//! validate is disabled with [`DisableCause::InvalidOnSync`] and reported the
//! same way.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::CatalogId;
use crate::core::DisableCause;
use crate::core::OwnerCode;
use crate::core::disabled_catalog_message;
use crate::core::violation::Violation;
use crate::interfaces::CatalogStore;
use crate::interfaces::LifecycleAuditSink;
use crate::interfaces::PermissionProvider;
use crate::interfaces::ProductQuery;
use crate::interfaces::ReferenceData;
use crate::interfaces::ReferenceError;
use crate::interfaces::StoreError;
use crate::runtime::lifecycle::CatalogLifecycle;
use crate::runtime::lifecycle::LifecycleError;
use crate::runtime::mapping::validate_mapping;
use crate::runtime::pagination::PageRequest;
use crate::runtime::pagination::PaginationLimits;
use crate::runtime::pagination::UuidPage;
use crate::runtime::pagination::fetch_page;
use crate::runtime::selection::CompilationError;
use crate::runtime::selection::compile_selection;
use crate::runtime::validation::ValidationError;

// ============================================================================
// SECTION: Scopes
// ============================================================================

/// Scope required to read catalogs.
pub const READ_CATALOGS_SCOPE: &str = "read_catalogs";

/// Scope required to read products.
pub const READ_PRODUCTS_SCOPE: &str = "read_products";

/// Scope required to create and update catalogs.
pub const WRITE_CATALOGS_SCOPE: &str = "write_catalogs";

/// Scope required to submit reference-data deletion notices.
pub const MANAGE_REFERENCE_DATA_SCOPE: &str = "manage_reference_data";

/// Every scope a caller may be granted.
pub const KNOWN_SCOPES: [&str; 4] = [
    READ_CATALOGS_SCOPE,
    READ_PRODUCTS_SCOPE,
    WRITE_CATALOGS_SCOPE,
    MANAGE_REFERENCE_DATA_SCOPE,
];

/// Authenticated caller of the sync API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCaller {
    /// Owning connection code.
    pub owner: OwnerCode,
    /// Granted scopes.
    pub scopes: BTreeSet<String>,
}

impl SyncCaller {
    /// Creates a caller.
    #[must_use]
    pub fn new<I, S>(owner: impl Into<OwnerCode>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owner: owner.into(),
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true when the caller holds every scope.
    #[must_use]
    pub fn has_scopes(&self, required: &[&str]) -> bool {
        required.iter().all(|scope| self.scopes.contains(*scope))
    }
}

// ============================================================================
// SECTION: Errors and Outcomes
// ============================================================================

/// Sync request errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Caller lacks a required scope.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Pagination parameters rejected.
    #[error("invalid pagination: {} violation(s)", .0.len())]
    Validation(Vec<Violation>),
    /// Catalog unknown to the caller.
    #[error("catalog not found: {0}")]
    NotFound(String),
    /// Reference data could not be consulted.
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    /// Store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<LifecycleError> for SyncError {
    fn from(error: LifecycleError) -> Self {
        match error {
            LifecycleError::NotFound(message) => Self::NotFound(message),
            LifecycleError::Validation(violations) => Self::Validation(violations),
            LifecycleError::Reference(error) => Self::Reference(error),
            LifecycleError::Store(error) => Self::Store(error),
            LifecycleError::Conflict(message) => Self::Store(StoreError::Conflict(message)),
        }
    }
}

/// Successful sync responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Page of matching product UUIDs.
    Page(UuidPage),
    /// Catalog yields no products right now; carries the error message.
    Unavailable(String),
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Product UUID sync handler.
pub struct SyncHandler<S, R, A, Q, P> {
    /// Catalog lifecycle, used for loading and automatic disables.
    lifecycle: CatalogLifecycle<S, R, A>,
    /// Product query backend.
    products: Q,
    /// Category permission provider.
    permissions: P,
    /// Page size bounds.
    limits: PaginationLimits,
}

impl<S, R, A, Q, P> SyncHandler<S, R, A, Q, P>
where
    S: CatalogStore,
    R: ReferenceData,
    A: LifecycleAuditSink,
    Q: ProductQuery,
    P: PermissionProvider,
{
    /// Creates a sync handler.
    #[must_use]
    pub const fn new(
        lifecycle: CatalogLifecycle<S, R, A>,
        products: Q,
        permissions: P,
        limits: PaginationLimits,
    ) -> Self {
        Self {
            lifecycle,
            products,
            permissions,
            limits,
        }
    }

    /// Returns the catalog lifecycle manager.
    #[must_use]
    pub const fn lifecycle(&self) -> &CatalogLifecycle<S, R, A> {
        &self.lifecycle
    }

    /// Returns the page size bounds.
    #[must_use]
    pub const fn limits(&self) -> PaginationLimits {
        self.limits
    }

    /// Serves one page of product UUIDs for a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Forbidden`] for missing scopes,
    /// [`SyncError::Validation`] for bad pagination parameters,
    /// [`SyncError::NotFound`] for catalogs the caller cannot see, and
    /// storage or reference failures as-is.
    pub fn product_uuids(
        &self,
        caller: &SyncCaller,
        id: &CatalogId,
        limit: Option<&str>,
        search_after: Option<&str>,
    ) -> Result<SyncOutcome, SyncError> {
        if !caller.has_scopes(&[READ_CATALOGS_SCOPE, READ_PRODUCTS_SCOPE]) {
            return Err(SyncError::Forbidden(format!(
                "scopes {READ_CATALOGS_SCOPE} and {READ_PRODUCTS_SCOPE} are required"
            )));
        }
        let request =
            PageRequest::parse(limit, search_after, self.limits).map_err(SyncError::Validation)?;
        let catalog = self.lifecycle.get(&caller.owner, id)?;
        if !catalog.enabled {
            return Ok(SyncOutcome::Unavailable(disabled_catalog_message(id)));
        }

        let reference = self.lifecycle.reference();
        let permissions = self.permissions.permission_scope(&caller.owner)?;
        let predicate =
            match compile_selection(&catalog.product_selection_criteria, reference, &permissions) {
                Ok(predicate) => predicate,
                Err(CompilationError::Invalid(_)) => return self.invalidate(id),
                Err(CompilationError::Reference(error)) => return Err(error.into()),
            };
        match validate_mapping(
            catalog.product_mapping_schema.as_ref(),
            &catalog.product_mapping.to_value(),
            reference,
        ) {
            Ok(_) => {}
            Err(ValidationError::Violations(_)) => return self.invalidate(id),
            Err(ValidationError::Reference(error)) => return Err(error.into()),
        }

        let page = fetch_page(&self.products, &predicate, &request)?;
        Ok(SyncOutcome::Page(page))
    }

    /// Disables an invalid catalog and reports it unavailable.
    fn invalidate(&self, id: &CatalogId) -> Result<SyncOutcome, SyncError> {
        self.lifecycle.disable(&[*id], Some(DisableCause::InvalidOnSync))?;
        Ok(SyncOutcome::Unavailable(disabled_catalog_message(id)))
    }
}
