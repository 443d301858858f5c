// catalog-sync-core/src/core/catalog.rs
// ============================================================================
// Module: Catalog Model
// Description: Catalog aggregate with selection criteria and product mapping.
// Purpose: Hold the persisted state of one integrator-defined catalog.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A catalog belongs to one owner (the connection it was created for), is
//! disabled on creation, and is never hard-deleted. When the engine disables
//! a catalog on its own, the [`DisableCause`] is recorded next to `enabled`.
//!
//! Invariants:
//! - A disabled catalog never yields products.
//! - Re-enabling a catalog clears its disable cause.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::criterion::ReferenceKey;
use crate::core::criterion::SelectionCriterion;
use crate::core::identifiers::CatalogId;
use crate::core::identifiers::OwnerCode;
use crate::core::mapping::ProductMapping;

// ============================================================================
// SECTION: Disable Cause
// ============================================================================

/// Reason an enabled catalog was disabled automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisableCause {
    /// A referenced attribute, option, channel, locale, family, or category was deleted.
    ReferenceDeleted,
    /// The catalog was found invalid while serving a sync request.
    InvalidOnSync,
}

impl DisableCause {
    /// Returns the stable label of the cause.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReferenceDeleted => "reference_deleted",
            Self::InvalidOnSync => "invalid_on_sync",
        }
    }

    /// Parses a stable label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "reference_deleted" => Some(Self::ReferenceDeleted),
            "invalid_on_sync" => Some(Self::InvalidOnSync),
            _ => None,
        }
    }
}

impl fmt::Display for DisableCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the message served to integrators syncing a disabled catalog.
#[must_use]
pub fn disabled_catalog_message(id: &CatalogId) -> String {
    format!(
        "No products to synchronize. The catalog {id} has been disabled on the PIM side. Note \
         that you can get catalogs status with the GET /api/rest/v1/catalogs endpoint."
    )
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Catalog aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalog identifier.
    pub id: CatalogId,
    /// Display name.
    pub name: String,
    /// Owning connection.
    pub owner: OwnerCode,
    /// Enabled flag.
    pub enabled: bool,
    /// Cause of the last automatic disable, cleared on enable.
    #[serde(default)]
    pub disable_cause: Option<DisableCause>,
    /// Ordered selection criteria, ANDed together.
    #[serde(default)]
    pub product_selection_criteria: Vec<SelectionCriterion>,
    /// Product mapping schema document, including its `$schema` key.
    #[serde(default)]
    pub product_mapping_schema: Option<Value>,
    /// Product mapping.
    #[serde(default)]
    pub product_mapping: ProductMapping,
}

impl Catalog {
    /// Builds a new disabled catalog with no criteria and no mapping.
    #[must_use]
    pub fn new(id: CatalogId, name: impl Into<String>, owner: OwnerCode) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            enabled: false,
            disable_cause: None,
            product_selection_criteria: Vec::new(),
            product_mapping_schema: None,
            product_mapping: ProductMapping::default(),
        }
    }

    /// Collects every reference-data key the catalog depends on.
    #[must_use]
    pub fn references(&self) -> BTreeSet<ReferenceKey> {
        let mut keys = BTreeSet::new();
        for criterion in &self.product_selection_criteria {
            criterion.collect_references(&mut keys);
        }
        self.product_mapping.collect_references(&mut keys);
        keys
    }
}

/// Catalog creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCatalog {
    /// Optional caller-chosen identifier; generated when absent.
    #[serde(default)]
    pub id: Option<CatalogId>,
    /// Display name.
    pub name: String,
}
