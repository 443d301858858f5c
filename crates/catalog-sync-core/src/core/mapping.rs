// catalog-sync-core/src/core/mapping.rs
// ============================================================================
// Module: Product Mapping Model
// Description: Attribute sources and product mapping schema targets.
// Purpose: Describe how external schema fields are fed from PIM attributes.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A product mapping associates every target property of the catalog's
//! product mapping schema with an [`AttributeSource`]. The wire form of a
//! source does not carry its kind; the kind is derived from the attribute
//! type through [`SourceKind`], and the kind's [`SourceRules`] decide which
//! parameters are accepted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::criterion::ReferenceKey;
use crate::core::identifiers::AttributeCode;
use crate::core::identifiers::ChannelCode;
use crate::core::identifiers::CurrencyCode;
use crate::core::identifiers::LocaleCode;
use crate::core::identifiers::UnitCode;
use crate::core::reference::AttributeType;

// ============================================================================
// SECTION: Source Kinds
// ============================================================================

/// Parameter keys a source kind accepts inside `parameters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceParameter {
    /// Locale used to render option labels.
    LabelLocale,
    /// Unit the amount is converted to.
    Unit,
    /// Currency selected from a price collection.
    Currency,
}

impl SourceParameter {
    /// Returns the wire key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::LabelLocale => "label_locale",
            Self::Unit => "unit",
            Self::Currency => "currency",
        }
    }
}

/// Capability description shared by all source kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRules {
    /// Parameters accepted, each required when the list is non-empty.
    pub parameters: &'static [SourceParameter],
}

impl SourceRules {
    /// Returns true when the kind carries a `parameters` object.
    #[must_use]
    pub const fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }
}

/// Attribute source variant derived from the attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Identifier, text, textarea.
    Text,
    /// Date.
    Date,
    /// Number.
    Number,
    /// Boolean.
    Boolean,
    /// Single or multi select.
    Select {
        /// True for multi select attributes.
        multiple: bool,
    },
    /// Measurement.
    Metric,
    /// Image or file.
    Media,
    /// Price collection.
    Price,
}

impl SourceKind {
    /// Maps an attribute type to its source kind.
    #[must_use]
    pub const fn for_attribute(attribute_type: AttributeType) -> Self {
        match attribute_type {
            AttributeType::Identifier | AttributeType::Text | AttributeType::Textarea => Self::Text,
            AttributeType::Date => Self::Date,
            AttributeType::Number => Self::Number,
            AttributeType::Boolean => Self::Boolean,
            AttributeType::SimpleSelect => Self::Select {
                multiple: false,
            },
            AttributeType::MultiSelect => Self::Select {
                multiple: true,
            },
            AttributeType::Metric => Self::Metric,
            AttributeType::Image | AttributeType::File => Self::Media,
            AttributeType::PriceCollection => Self::Price,
        }
    }

    /// Returns the validation rules of the kind.
    #[must_use]
    pub const fn rules(self) -> SourceRules {
        match self {
            Self::Select {
                ..
            } => SourceRules {
                parameters: &[SourceParameter::LabelLocale],
            },
            Self::Metric => SourceRules {
                parameters: &[SourceParameter::Unit],
            },
            Self::Price => SourceRules {
                parameters: &[SourceParameter::Currency],
            },
            Self::Text | Self::Date | Self::Number | Self::Boolean | Self::Media => SourceRules {
                parameters: &[],
            },
        }
    }

    /// Returns true when the kind can feed a target of the given type.
    #[must_use]
    pub fn is_compatible_with(self, target: &TargetProperty) -> bool {
        match target.target_type {
            TargetType::String => match target.format.as_deref() {
                Some("date-time") => matches!(self, Self::Date),
                Some("uri") => matches!(self, Self::Media),
                Some(_) => false,
                None => matches!(
                    self,
                    Self::Text
                        | Self::Date
                        | Self::Select {
                            ..
                        }
                        | Self::Media
                ),
            },
            TargetType::Number => matches!(self, Self::Number | Self::Metric | Self::Price),
            TargetType::Boolean => matches!(self, Self::Boolean),
        }
    }
}

// ============================================================================
// SECTION: Attribute Sources
// ============================================================================

/// Type-specific parameters of an attribute source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceParameters {
    /// Locale used for option labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_locale: Option<LocaleCode>,
    /// Target unit for metric values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitCode>,
    /// Currency selected from price collections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
}

/// Validated source feeding one target property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSource {
    /// Attribute code.
    pub source: AttributeCode,
    /// Channel for scopable attributes.
    pub scope: Option<ChannelCode>,
    /// Locale for localizable attributes.
    pub locale: Option<LocaleCode>,
    /// Parameters for select, metric, and price sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<SourceParameters>,
}

impl AttributeSource {
    /// Builds a source without parameters.
    #[must_use]
    pub fn new(source: impl Into<AttributeCode>, scope: Option<&str>, locale: Option<&str>) -> Self {
        Self {
            source: source.into(),
            scope: scope.map(ChannelCode::new),
            locale: locale.map(LocaleCode::new),
            parameters: None,
        }
    }

    /// Collects the reference data this source depends on.
    pub fn collect_references(&self, out: &mut BTreeSet<ReferenceKey>) {
        out.insert(ReferenceKey::Attribute(self.source.clone()));
        if let Some(scope) = &self.scope {
            out.insert(ReferenceKey::Channel(scope.clone()));
        }
        if let Some(locale) = &self.locale {
            out.insert(ReferenceKey::Locale(locale.clone()));
        }
        if let Some(label_locale) =
            self.parameters.as_ref().and_then(|parameters| parameters.label_locale.as_ref())
        {
            out.insert(ReferenceKey::Locale(label_locale.clone()));
        }
    }
}

/// Product mapping: target property name to source (`None` for `uuid`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductMapping(pub BTreeMap<String, Option<AttributeSource>>);

impl ProductMapping {
    /// Returns true when no target is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the mapping in its wire form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let entries = self
            .0
            .iter()
            .map(|(target, source)| {
                let value = source.as_ref().map_or(Value::Null, source_to_value);
                (target.clone(), value)
            })
            .collect();
        Value::Object(entries)
    }

    /// Collects the reference data all sources depend on.
    pub fn collect_references(&self, out: &mut BTreeSet<ReferenceKey>) {
        for source in self.0.values().flatten() {
            source.collect_references(out);
        }
    }
}

/// Serializes a source to its wire object.
fn source_to_value(source: &AttributeSource) -> Value {
    let mut object = serde_json::Map::new();
    object.insert("source".to_string(), Value::String(source.source.to_string()));
    object.insert(
        "scope".to_string(),
        source.scope.as_ref().map_or(Value::Null, |scope| Value::String(scope.to_string())),
    );
    object.insert(
        "locale".to_string(),
        source.locale.as_ref().map_or(Value::Null, |locale| Value::String(locale.to_string())),
    );
    if let Some(parameters) = &source.parameters {
        let mut params = serde_json::Map::new();
        if let Some(label_locale) = &parameters.label_locale {
            params.insert("label_locale".to_string(), Value::String(label_locale.to_string()));
        }
        if let Some(unit) = &parameters.unit {
            params.insert("unit".to_string(), Value::String(unit.to_string()));
        }
        if let Some(currency) = &parameters.currency {
            params.insert("currency".to_string(), Value::String(currency.to_string()));
        }
        object.insert("parameters".to_string(), Value::Object(params));
    }
    Value::Object(object)
}

// ============================================================================
// SECTION: Schema Targets
// ============================================================================

/// Name of the always-present product identity target.
pub const UUID_TARGET: &str = "uuid";

/// JSON type of a target property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    /// String target, optionally with a `format`.
    String,
    /// Number target.
    Number,
    /// Boolean target.
    Boolean,
}

impl TargetType {
    /// Parses a JSON Schema `type` keyword value.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }
}

/// One target property declared by a product mapping schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetProperty {
    /// Property name.
    pub name: String,
    /// JSON type.
    pub target_type: TargetType,
    /// Optional string format.
    pub format: Option<String>,
}

/// Extracts the target properties of a schema already accepted by its
/// meta-schema. Properties with an unrecognized type are skipped.
#[must_use]
pub fn schema_targets(schema: &Value) -> Vec<TargetProperty> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    properties
        .iter()
        .filter_map(|(name, property)| {
            let target_type = property.get("type").and_then(Value::as_str).and_then(TargetType::parse)?;
            Some(TargetProperty {
                name: name.clone(),
                target_type,
                format: property.get("format").and_then(Value::as_str).map(str::to_string),
            })
        })
        .collect()
}
