// catalog-sync-core/src/core/product.rs
// ============================================================================
// Module: Product Model
// Description: Product snapshots evaluated by selection predicates.
// Purpose: Provide the minimal product shape needed for catalog selection.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Products are read-only snapshots owned by the PIM. Attribute values are
//! stored per `(scope, locale)` context; non-scopable and non-localizable
//! values use `None` for the corresponding axis.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::AttributeCode;
use crate::core::identifiers::CategoryCode;
use crate::core::identifiers::ChannelCode;
use crate::core::identifiers::FamilyCode;
use crate::core::identifiers::LocaleCode;
use crate::core::identifiers::ProductUuid;

// ============================================================================
// SECTION: Values
// ============================================================================

/// One attribute value in a given context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductValue {
    /// Channel, for scopable attributes.
    #[serde(default)]
    pub scope: Option<ChannelCode>,
    /// Locale, for localizable attributes.
    #[serde(default)]
    pub locale: Option<LocaleCode>,
    /// Raw value data.
    pub data: Value,
}

/// Completeness ratio for one channel and locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessEntry {
    /// Channel.
    pub channel: ChannelCode,
    /// Locale.
    pub locale: LocaleCode,
    /// Percentage in `0..=100`.
    pub ratio: u8,
}

// ============================================================================
// SECTION: Product
// ============================================================================

/// Product snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product UUID.
    pub uuid: ProductUuid,
    /// Human identifier (SKU).
    #[serde(default)]
    pub identifier: String,
    /// Enabled flag.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Optional family.
    #[serde(default)]
    pub family: Option<FamilyCode>,
    /// Categories the product is classified in.
    #[serde(default)]
    pub categories: BTreeSet<CategoryCode>,
    /// Attribute values.
    #[serde(default)]
    pub values: BTreeMap<AttributeCode, Vec<ProductValue>>,
    /// Completeness per channel and locale.
    #[serde(default)]
    pub completeness: Vec<CompletenessEntry>,
}

/// Products are enabled unless stated otherwise.
const fn default_enabled() -> bool {
    true
}

impl Product {
    /// Builds an enabled, unclassified product without values.
    #[must_use]
    pub fn new(uuid: ProductUuid, identifier: impl Into<String>) -> Self {
        Self {
            uuid,
            identifier: identifier.into(),
            enabled: true,
            family: None,
            categories: BTreeSet::new(),
            values: BTreeMap::new(),
            completeness: Vec::new(),
        }
    }

    /// Returns a copy with an additional value.
    #[must_use]
    pub fn with_value(
        mut self,
        attribute: &str,
        scope: Option<&str>,
        locale: Option<&str>,
        data: Value,
    ) -> Self {
        self.values.entry(AttributeCode::new(attribute)).or_default().push(ProductValue {
            scope: scope.map(ChannelCode::new),
            locale: locale.map(LocaleCode::new),
            data,
        });
        self
    }

    /// Returns the value data for an attribute in a context, if any.
    ///
    /// Null data counts as no value.
    #[must_use]
    pub fn value(
        &self,
        attribute: &AttributeCode,
        scope: Option<&ChannelCode>,
        locale: Option<&LocaleCode>,
    ) -> Option<&Value> {
        self.values
            .get(attribute)?
            .iter()
            .find(|value| value.scope.as_ref() == scope && value.locale.as_ref() == locale)
            .map(|value| &value.data)
            .filter(|data| !data.is_null())
    }

    /// Returns the completeness ratio for a channel and locale, if computed.
    #[must_use]
    pub fn completeness_for(&self, channel: &ChannelCode, locale: &LocaleCode) -> Option<u8> {
        self.completeness
            .iter()
            .find(|entry| &entry.channel == channel && &entry.locale == locale)
            .map(|entry| entry.ratio)
    }

    /// Returns true when the product is in no category.
    #[must_use]
    pub fn is_unclassified(&self) -> bool {
        self.categories.is_empty()
    }
}
