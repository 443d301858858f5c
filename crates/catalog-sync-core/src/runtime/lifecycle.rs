// catalog-sync-core/src/runtime/lifecycle.rs
// ============================================================================
// Module: Catalog Lifecycle Manager
// Description: Creates, toggles, updates, and reconciles catalogs.
// Purpose: Keep every catalog transition validated, atomic, and audited.
// Dependencies: crate::{core, interfaces, runtime}, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`CatalogLifecycle`] is the only writer of catalogs. Updates validate the
//! new criteria, schema, or mapping first and persist nothing on failure, so
//! the previous value is kept. Reconciliation consumes reference deletions:
//! candidates come from the store's reverse reference index, each candidate
//! is re-validated, and only catalogs with an actual dangling reference are
//! disabled. A failure on one candidate is audited and the sweep continues.
//!
//! Security posture: owners only ever see and mutate their own catalogs; a
//! catalog owned by someone else is reported as not found.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::Catalog;
use crate::core::CatalogId;
use crate::core::DisableCause;
use crate::core::LifecycleEvent;
use crate::core::LifecycleEventKind;
use crate::core::NewCatalog;
use crate::core::OwnerCode;
use crate::core::ProductMapping;
use crate::core::ReferenceDeletion;
use crate::core::mapping::UUID_TARGET;
use crate::core::mapping::schema_targets;
use crate::core::violation::Violation;
use crate::core::violation::messages;
use crate::interfaces::CatalogStore;
use crate::interfaces::LifecycleAuditSink;
use crate::interfaces::ReferenceData;
use crate::interfaces::ReferenceError;
use crate::interfaces::StoreError;
use crate::runtime::criterion::validate_criteria;
use crate::runtime::mapping::validate_mapping;
use crate::runtime::schema::validate_mapping_schema;
use crate::runtime::validation::ValidationError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum catalog name length in characters.
pub const MAX_CATALOG_NAME_LENGTH: usize = 255;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Lifecycle operation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Catalog does not exist for the caller.
    #[error("catalog not found: {0}")]
    NotFound(String),
    /// Catalog identifier already taken.
    #[error("catalog conflict: {0}")]
    Conflict(String),
    /// Input rejected with field-scoped violations.
    #[error("catalog update rejected: {} violation(s)", .0.len())]
    Validation(Vec<Violation>),
    /// Reference data could not be consulted.
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    /// Catalog store failed.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for LifecycleError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(message) => Self::Conflict(message),
            StoreError::NotFound(message) => Self::NotFound(message),
            other => Self::Store(other),
        }
    }
}

impl From<ValidationError> for LifecycleError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::Violations(violations) => Self::Validation(violations),
            ValidationError::Reference(error) => Self::Reference(error),
        }
    }
}

// ============================================================================
// SECTION: Reconciliation Report
// ============================================================================

/// Outcome of one reconciliation sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Candidates returned by the reverse index.
    pub examined: Vec<CatalogId>,
    /// Catalogs disabled by this sweep.
    pub disabled: Vec<CatalogId>,
    /// Candidates that could not be processed, with the error.
    pub failures: Vec<(CatalogId, String)>,
}

// ============================================================================
// SECTION: Validity
// ============================================================================

/// Re-validates a stored catalog against current reference data.
///
/// Returns the violations of the criteria, schema, and mapping; an empty
/// list means the catalog is still valid.
///
/// # Errors
///
/// Returns [`ReferenceError`] when reference data is unavailable.
pub fn catalog_violations<R: ReferenceData + ?Sized>(
    catalog: &Catalog,
    reference: &R,
) -> Result<Vec<Violation>, ReferenceError> {
    let mut violations = Vec::new();
    let criteria = serde_json::to_value(&catalog.product_selection_criteria)
        .map_err(|err| ReferenceError::Invalid(format!("criteria serialization: {err}")))?;
    collect(validate_criteria(&criteria, reference).map(|_| ()), &mut violations)?;
    collect(
        validate_mapping(
            catalog.product_mapping_schema.as_ref(),
            &catalog.product_mapping.to_value(),
            reference,
        )
        .map(|_| ()),
        &mut violations,
    )?;
    Ok(violations)
}

/// Appends validation violations, propagating reference failures.
fn collect(
    outcome: Result<(), ValidationError>,
    out: &mut Vec<Violation>,
) -> Result<(), ReferenceError> {
    match outcome {
        Ok(()) => Ok(()),
        Err(ValidationError::Violations(violations)) => {
            out.extend(violations);
            Ok(())
        }
        Err(ValidationError::Reference(error)) => Err(error),
    }
}

// ============================================================================
// SECTION: Lifecycle Manager
// ============================================================================

/// Catalog lifecycle manager.
pub struct CatalogLifecycle<S, R, A> {
    /// Catalog persistence.
    store: S,
    /// Reference data used for validation.
    reference: R,
    /// Lifecycle audit sink.
    audit: A,
}

impl<S, R, A> CatalogLifecycle<S, R, A>
where
    S: CatalogStore,
    R: ReferenceData,
    A: LifecycleAuditSink,
{
    /// Creates a lifecycle manager.
    #[must_use]
    pub const fn new(store: S, reference: R, audit: A) -> Self {
        Self {
            store,
            reference,
            audit,
        }
    }

    /// Returns the catalog store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the reference data source.
    #[must_use]
    pub const fn reference(&self) -> &R {
        &self.reference
    }

    /// Creates a disabled catalog for an owner.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Validation`] for a blank or overlong name
    /// and [`LifecycleError::Conflict`] when the identifier is taken.
    pub fn create(&self, owner: &OwnerCode, request: NewCatalog) -> Result<Catalog, LifecycleError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(LifecycleError::Validation(vec![Violation::new(
                "[name]",
                messages::NOT_BLANK,
            )]));
        }
        if name.chars().count() > MAX_CATALOG_NAME_LENGTH {
            return Err(LifecycleError::Validation(vec![Violation::new(
                "[name]",
                messages::NAME_TOO_LONG,
            )]));
        }
        let id = request.id.unwrap_or_else(CatalogId::generate);
        let catalog = Catalog::new(id, name, owner.clone());
        self.store.create(&catalog)?;
        self.record(LifecycleEvent::new(LifecycleEventKind::CatalogCreated, id).with_owner(owner));
        Ok(catalog)
    }

    /// Loads a catalog owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotFound`] when the catalog is missing or
    /// owned by someone else.
    pub fn get(&self, owner: &OwnerCode, id: &CatalogId) -> Result<Catalog, LifecycleError> {
        match self.store.get(id)? {
            Some(catalog) if &catalog.owner == owner => Ok(catalog),
            _ => Err(LifecycleError::NotFound(id.to_string())),
        }
    }

    /// Lists an owner's catalogs in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when listing fails.
    pub fn list(&self, owner: &OwnerCode) -> Result<Vec<Catalog>, LifecycleError> {
        Ok(self.store.list_by_owner(owner)?)
    }

    /// Enables catalogs; already-enabled and unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the update fails.
    pub fn enable(&self, ids: &[CatalogId]) -> Result<Vec<CatalogId>, LifecycleError> {
        let changed = self.store.set_enabled(ids, true, None)?;
        for id in &changed {
            self.record(LifecycleEvent::new(LifecycleEventKind::CatalogEnabled, *id));
        }
        Ok(changed)
    }

    /// Disables catalogs; already-disabled and unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the update fails.
    pub fn disable(
        &self,
        ids: &[CatalogId],
        cause: Option<DisableCause>,
    ) -> Result<Vec<CatalogId>, LifecycleError> {
        let changed = self.store.set_enabled(ids, false, cause)?;
        for id in &changed {
            self.record(
                LifecycleEvent::new(LifecycleEventKind::CatalogDisabled, *id).with_cause(cause),
            );
        }
        Ok(changed)
    }

    /// Enables or disables one catalog owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotFound`] when the catalog is not visible.
    pub fn set_enabled(
        &self,
        owner: &OwnerCode,
        id: &CatalogId,
        enabled: bool,
    ) -> Result<Catalog, LifecycleError> {
        self.get(owner, id)?;
        if enabled {
            self.enable(&[*id])?;
        } else {
            self.disable(&[*id], None)?;
        }
        self.get(owner, id)
    }

    /// Replaces the selection criteria of a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Validation`] when the criteria are invalid;
    /// the stored criteria are left untouched.
    pub fn update_product_selection(
        &self,
        owner: &OwnerCode,
        id: &CatalogId,
        raw: &Value,
    ) -> Result<Catalog, LifecycleError> {
        let mut catalog = self.get(owner, id)?;
        let criteria = self.validated(
            validate_criteria(raw, &self.reference),
            LifecycleEventKind::CriteriaRejected,
            &catalog,
        )?;
        catalog.product_selection_criteria = criteria;
        self.store.save(&catalog)?;
        self.record(
            LifecycleEvent::new(LifecycleEventKind::CriteriaUpdated, *id).with_owner(owner),
        );
        self.get(owner, id)
    }

    /// Replaces the product mapping schema of a catalog.
    ///
    /// Targets kept by the new schema keep their sources; new targets start
    /// unmapped and removed targets are dropped from the mapping.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Validation`] with the single schema
    /// violation when the schema is rejected.
    pub fn update_mapping_schema(
        &self,
        owner: &OwnerCode,
        id: &CatalogId,
        schema: Value,
    ) -> Result<Catalog, LifecycleError> {
        let mut catalog = self.get(owner, id)?;
        self.validated(
            validate_mapping_schema(&schema)
                .map_err(|violation| ValidationError::Violations(vec![violation])),
            LifecycleEventKind::MappingSchemaRejected,
            &catalog,
        )?;
        let previous = std::mem::take(&mut catalog.product_mapping.0);
        let mapping = schema_targets(&schema)
            .into_iter()
            .map(|target| {
                let source = if target.name == UUID_TARGET {
                    None
                } else {
                    previous.get(&target.name).cloned().flatten()
                };
                (target.name, source)
            })
            .collect();
        catalog.product_mapping = ProductMapping(mapping);
        catalog.product_mapping_schema = Some(schema);
        self.store.save(&catalog)?;
        self.record(
            LifecycleEvent::new(LifecycleEventKind::MappingSchemaUpdated, *id).with_owner(owner),
        );
        self.get(owner, id)
    }

    /// Replaces the product mapping of a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Validation`] when the mapping is invalid;
    /// the stored mapping is left untouched.
    pub fn update_mapping(
        &self,
        owner: &OwnerCode,
        id: &CatalogId,
        raw: &Value,
    ) -> Result<Catalog, LifecycleError> {
        let mut catalog = self.get(owner, id)?;
        let mapping = self.validated(
            validate_mapping(catalog.product_mapping_schema.as_ref(), raw, &self.reference),
            LifecycleEventKind::MappingRejected,
            &catalog,
        )?;
        catalog.product_mapping = mapping;
        self.store.save(&catalog)?;
        self.record(
            LifecycleEvent::new(LifecycleEventKind::MappingUpdated, *id).with_owner(owner),
        );
        self.get(owner, id)
    }

    /// Disables every enabled catalog left with a dangling reference by a
    /// deletion. Safe to run repeatedly.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] only when the reverse index lookup
    /// itself fails; per-catalog failures land in the report.
    pub fn reconcile(&self, deletion: &ReferenceDeletion) -> Result<ReconcileReport, LifecycleError> {
        let candidates = self.store.find_enabled_referencing(deletion.key())?;
        let mut report = ReconcileReport {
            examined: candidates.clone(),
            ..ReconcileReport::default()
        };
        for id in candidates {
            match self.reconcile_one(&id, deletion) {
                Ok(true) => report.disabled.push(id),
                Ok(false) => {}
                Err(err) => {
                    self.record(
                        LifecycleEvent::new(LifecycleEventKind::ReconciliationFailed, id)
                            .with_detail(format!("{}: {err}", deletion.key())),
                    );
                    report.failures.push((id, err.to_string()));
                }
            }
        }
        Ok(report)
    }

    /// Re-validates one candidate, disabling it when invalid.
    fn reconcile_one(
        &self,
        id: &CatalogId,
        deletion: &ReferenceDeletion,
    ) -> Result<bool, LifecycleError> {
        let Some(catalog) = self.store.get(id)? else {
            return Ok(false);
        };
        if !catalog.enabled {
            return Ok(false);
        }
        let violations = catalog_violations(&catalog, &self.reference)?;
        if violations.is_empty() {
            return Ok(false);
        }
        let cause = Some(DisableCause::ReferenceDeleted);
        let changed = self.store.set_enabled(&[*id], false, cause)?;
        if changed.is_empty() {
            return Ok(false);
        }
        self.record(
            LifecycleEvent::new(LifecycleEventKind::CatalogDisabled, *id)
                .with_owner(&catalog.owner)
                .with_cause(cause)
                .with_detail(deletion.key().to_string()),
        );
        Ok(true)
    }

    /// Converts a validation outcome, auditing rejections.
    fn validated<T>(
        &self,
        outcome: Result<T, ValidationError>,
        rejected: LifecycleEventKind,
        catalog: &Catalog,
    ) -> Result<T, LifecycleError> {
        outcome.map_err(|err| {
            if let ValidationError::Violations(violations) = &err {
                self.record(
                    LifecycleEvent::new(rejected, catalog.id)
                        .with_owner(&catalog.owner)
                        .with_detail(format!("{} violation(s)", violations.len())),
                );
            }
            LifecycleError::from(err)
        })
    }

    /// Emits a lifecycle audit event.
    fn record(&self, event: LifecycleEvent) {
        self.audit.record_lifecycle(&event);
    }
}
