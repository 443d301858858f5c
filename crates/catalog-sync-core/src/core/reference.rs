// catalog-sync-core/src/core/reference.rs
// ============================================================================
// Module: Reference Data Model
// Description: Attribute, channel, locale, family, and category metadata.
// Purpose: Provide the read-only ground truth used by validation and compilation.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Reference data is owned by the PIM and consumed read-only by the catalog
//! engine. Attributes carry the scopable/localizable flags that drive
//! criterion and mapping validation; channels carry their activated locales
//! and currencies. A category is a root exactly when it has no parent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AttributeCode;
use crate::core::identifiers::CategoryCode;
use crate::core::identifiers::ChannelCode;
use crate::core::identifiers::CurrencyCode;
use crate::core::identifiers::FamilyCode;
use crate::core::identifiers::LocaleCode;
use crate::core::identifiers::OptionCode;
use crate::core::identifiers::UnitCode;

// ============================================================================
// SECTION: Attributes
// ============================================================================

/// PIM attribute types understood by the catalog engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    /// Product identifier (SKU).
    #[serde(rename = "pim_catalog_identifier")]
    Identifier,
    /// Single-line text.
    #[serde(rename = "pim_catalog_text")]
    Text,
    /// Multi-line text.
    #[serde(rename = "pim_catalog_textarea")]
    Textarea,
    /// Number.
    #[serde(rename = "pim_catalog_number")]
    Number,
    /// Yes/No.
    #[serde(rename = "pim_catalog_boolean")]
    Boolean,
    /// Date (`YYYY-MM-DD`).
    #[serde(rename = "pim_catalog_date")]
    Date,
    /// Single option select.
    #[serde(rename = "pim_catalog_simpleselect")]
    SimpleSelect,
    /// Multiple options select.
    #[serde(rename = "pim_catalog_multiselect")]
    MultiSelect,
    /// Measurement (amount + unit).
    #[serde(rename = "pim_catalog_metric")]
    Metric,
    /// Price collection (amount per currency).
    #[serde(rename = "pim_catalog_price_collection")]
    PriceCollection,
    /// Image media file.
    #[serde(rename = "pim_catalog_image")]
    Image,
    /// Generic media file.
    #[serde(rename = "pim_catalog_file")]
    File,
}

impl AttributeType {
    /// Returns the stable wire label of the attribute type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Identifier => "pim_catalog_identifier",
            Self::Text => "pim_catalog_text",
            Self::Textarea => "pim_catalog_textarea",
            Self::Number => "pim_catalog_number",
            Self::Boolean => "pim_catalog_boolean",
            Self::Date => "pim_catalog_date",
            Self::SimpleSelect => "pim_catalog_simpleselect",
            Self::MultiSelect => "pim_catalog_multiselect",
            Self::Metric => "pim_catalog_metric",
            Self::PriceCollection => "pim_catalog_price_collection",
            Self::Image => "pim_catalog_image",
            Self::File => "pim_catalog_file",
        }
    }

    /// Returns true when values of this type are option codes.
    #[must_use]
    pub const fn has_options(self) -> bool {
        matches!(self, Self::SimpleSelect | Self::MultiSelect)
    }
}

/// Attribute metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute code.
    pub code: AttributeCode,
    /// Attribute type.
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    /// Values vary per channel.
    #[serde(default)]
    pub scopable: bool,
    /// Values vary per locale.
    #[serde(default)]
    pub localizable: bool,
    /// Option codes for select attributes.
    #[serde(default)]
    pub options: BTreeSet<OptionCode>,
    /// Units of the measurement family for metric attributes.
    #[serde(default)]
    pub units: BTreeSet<UnitCode>,
}

impl Attribute {
    /// Builds a non-scopable, non-localizable attribute without options.
    #[must_use]
    pub fn new(code: impl Into<AttributeCode>, attribute_type: AttributeType) -> Self {
        Self {
            code: code.into(),
            attribute_type,
            scopable: false,
            localizable: false,
            options: BTreeSet::new(),
            units: BTreeSet::new(),
        }
    }

    /// Returns a copy with the scopable/localizable flags set.
    #[must_use]
    pub const fn with_flags(mut self, scopable: bool, localizable: bool) -> Self {
        self.scopable = scopable;
        self.localizable = localizable;
        self
    }

    /// Returns a copy with the given option codes.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OptionCode>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Returns a copy with the given measurement units.
    #[must_use]
    pub fn with_units<I, S>(mut self, units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<UnitCode>,
    {
        self.units = units.into_iter().map(Into::into).collect();
        self
    }
}

// ============================================================================
// SECTION: Channels and Locales
// ============================================================================

/// Channel metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel code.
    pub code: ChannelCode,
    /// Locales activated for the channel.
    #[serde(default)]
    pub locales: BTreeSet<LocaleCode>,
    /// Currencies activated for the channel.
    #[serde(default)]
    pub currencies: BTreeSet<CurrencyCode>,
    /// Soft-deletion marker; deleted channels are treated as unknown.
    #[serde(default)]
    pub deleted: bool,
}

impl Channel {
    /// Builds a channel with the given activated locales.
    #[must_use]
    pub fn new<I, S>(code: impl Into<ChannelCode>, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<LocaleCode>,
    {
        Self {
            code: code.into(),
            locales: locales.into_iter().map(Into::into).collect(),
            currencies: BTreeSet::new(),
            deleted: false,
        }
    }

    /// Returns a copy with the given activated currencies.
    #[must_use]
    pub fn with_currencies<I, S>(mut self, currencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CurrencyCode>,
    {
        self.currencies = currencies.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true when the locale is activated for this channel.
    #[must_use]
    pub fn has_locale(&self, locale: &LocaleCode) -> bool {
        self.locales.contains(locale)
    }
}

/// Locale metadata. A locale is enabled when at least one channel activates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    /// Locale code.
    pub code: LocaleCode,
    /// Whether the locale is enabled.
    pub enabled: bool,
}

// ============================================================================
// SECTION: Families and Categories
// ============================================================================

/// Family metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    /// Family code.
    pub code: FamilyCode,
}

/// Category tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category code.
    pub code: CategoryCode,
    /// Parent category, `None` for tree roots.
    #[serde(default)]
    pub parent: Option<CategoryCode>,
}

impl Category {
    /// Returns true when this category is the root of a tree.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
