// catalog-sync-core/src/core/audit.rs
// ============================================================================
// Module: Lifecycle Audit Events
// Description: Structured audit payloads for catalog lifecycle changes.
// Purpose: Record lifecycle transitions without a logging dependency.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Lifecycle events are emitted by the lifecycle manager and the sync handler
//! through [`crate::interfaces::LifecycleAuditSink`]. Payloads never embed
//! selection values or mapping documents; rejections carry a short detail.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::catalog::DisableCause;
use crate::core::identifiers::CatalogId;
use crate::core::identifiers::OwnerCode;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Lifecycle event classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEventKind {
    /// Catalog created.
    CatalogCreated,
    /// Catalog enabled.
    CatalogEnabled,
    /// Catalog disabled, by a caller or automatically.
    CatalogDisabled,
    /// Selection criteria replaced.
    CriteriaUpdated,
    /// Selection criteria rejected; previous criteria kept.
    CriteriaRejected,
    /// Product mapping schema replaced.
    MappingSchemaUpdated,
    /// Product mapping schema rejected; previous schema kept.
    MappingSchemaRejected,
    /// Product mapping replaced.
    MappingUpdated,
    /// Product mapping rejected; previous mapping kept.
    MappingRejected,
    /// Reconciliation of one catalog failed.
    ReconciliationFailed,
}

/// Lifecycle audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Event classification.
    pub kind: LifecycleEventKind,
    /// Catalog concerned.
    pub catalog_id: CatalogId,
    /// Catalog owner when known.
    pub owner: Option<OwnerCode>,
    /// Disable cause for automatic disables.
    pub cause: Option<DisableCause>,
    /// Short detail (violation count, deleted reference, error).
    pub detail: Option<String>,
}

impl LifecycleEvent {
    /// Creates a lifecycle event with a consistent timestamp.
    #[must_use]
    pub fn new(kind: LifecycleEventKind, catalog_id: CatalogId) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "catalog_lifecycle",
            timestamp_ms,
            kind,
            catalog_id,
            owner: None,
            cause: None,
            detail: None,
        }
    }

    /// Returns a copy with the owner set.
    #[must_use]
    pub fn with_owner(mut self, owner: &OwnerCode) -> Self {
        self.owner = Some(owner.clone());
        self
    }

    /// Returns a copy with the disable cause set.
    #[must_use]
    pub const fn with_cause(mut self, cause: Option<DisableCause>) -> Self {
        self.cause = cause;
        self
    }

    /// Returns a copy with a detail message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
