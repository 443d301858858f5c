// catalog-sync-core/src/core/criterion.rs
// ============================================================================
// Module: Selection Criterion Model
// Description: Typed product-selection filter conditions.
// Purpose: Represent one condition (field, operator, value, scope, locale).
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`SelectionCriterion`] is pure data. Its `field` is either a reserved
//! product property (`enabled`, `family`, `categories`, `completeness`) or an
//! attribute code. Operators use the PIM wire labels (`IN`, `NOT EMPTY`, ...)
//! and accept the legacy aliases `IN_LIST`, `NOT_IN_LIST`, `EQUALS`,
//! `IS_EMPTY`, and `NOT_EMPTY` on input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::AttributeCode;
use crate::core::identifiers::CategoryCode;
use crate::core::identifiers::ChannelCode;
use crate::core::identifiers::FamilyCode;
use crate::core::identifiers::LocaleCode;
use crate::core::identifiers::OptionCode;

// ============================================================================
// SECTION: Operators
// ============================================================================

/// Criterion operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Equality.
    #[serde(rename = "=", alias = "EQUALS")]
    Equal,
    /// Inequality.
    #[serde(rename = "!=")]
    NotEqual,
    /// Strictly lower.
    #[serde(rename = "<")]
    Lower,
    /// Lower or equal.
    #[serde(rename = "<=")]
    LowerOrEqual,
    /// Strictly greater.
    #[serde(rename = ">")]
    Greater,
    /// Greater or equal.
    #[serde(rename = ">=")]
    GreaterOrEqual,
    /// Substring match.
    #[serde(rename = "CONTAINS")]
    Contains,
    /// Negated substring match.
    #[serde(rename = "DOES NOT CONTAIN")]
    DoesNotContain,
    /// Prefix match.
    #[serde(rename = "STARTS WITH")]
    StartsWith,
    /// Membership in a list.
    #[serde(rename = "IN", alias = "IN_LIST")]
    In,
    /// Non-membership in a list.
    #[serde(rename = "NOT IN", alias = "NOT_IN_LIST")]
    NotIn,
    /// No value.
    #[serde(rename = "EMPTY", alias = "IS_EMPTY")]
    Empty,
    /// Any value.
    #[serde(rename = "NOT EMPTY", alias = "NOT_EMPTY")]
    NotEmpty,
    /// Inclusive date range.
    #[serde(rename = "BETWEEN")]
    Between,
    /// Outside an inclusive date range.
    #[serde(rename = "NOT BETWEEN")]
    NotBetween,
    /// In a category or any of its descendants.
    #[serde(rename = "IN CHILDREN")]
    InChildren,
    /// Not in a category nor any of its descendants.
    #[serde(rename = "NOT IN CHILDREN")]
    NotInChildren,
    /// In no category at all.
    #[serde(rename = "UNCLASSIFIED")]
    Unclassified,
    /// In one of the categories, or in none.
    #[serde(rename = "IN OR UNCLASSIFIED")]
    InOrUnclassified,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Self; 19] = [
        Self::Equal,
        Self::NotEqual,
        Self::Lower,
        Self::LowerOrEqual,
        Self::Greater,
        Self::GreaterOrEqual,
        Self::Contains,
        Self::DoesNotContain,
        Self::StartsWith,
        Self::In,
        Self::NotIn,
        Self::Empty,
        Self::NotEmpty,
        Self::Between,
        Self::NotBetween,
        Self::InChildren,
        Self::NotInChildren,
        Self::Unclassified,
        Self::InOrUnclassified,
    ];

    /// Returns the canonical wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Lower => "<",
            Self::LowerOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Contains => "CONTAINS",
            Self::DoesNotContain => "DOES NOT CONTAIN",
            Self::StartsWith => "STARTS WITH",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Empty => "EMPTY",
            Self::NotEmpty => "NOT EMPTY",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT BETWEEN",
            Self::InChildren => "IN CHILDREN",
            Self::NotInChildren => "NOT IN CHILDREN",
            Self::Unclassified => "UNCLASSIFIED",
            Self::InOrUnclassified => "IN OR UNCLASSIFIED",
        }
    }

    /// Parses a wire label, accepting legacy aliases.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "EQUALS" => Some(Self::Equal),
            "IN_LIST" => Some(Self::In),
            "NOT_IN_LIST" => Some(Self::NotIn),
            "IS_EMPTY" => Some(Self::Empty),
            "NOT_EMPTY" => Some(Self::NotEmpty),
            other => Self::ALL.into_iter().find(|operator| operator.as_str() == other),
        }
    }

    /// Returns true when the operator takes no value.
    #[must_use]
    pub const fn is_nullary(self) -> bool {
        matches!(self, Self::Empty | Self::NotEmpty | Self::Unclassified)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Fields
// ============================================================================

/// Reserved product properties usable as criterion fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedField {
    /// Product enabled flag.
    Enabled,
    /// Product family.
    Family,
    /// Product categories.
    Categories,
    /// Completeness percentage for a channel and locale.
    Completeness,
}

impl ReservedField {
    /// Returns the wire name of the property.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Family => "family",
            Self::Categories => "categories",
            Self::Completeness => "completeness",
        }
    }

    /// Parses a reserved property name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "enabled" => Some(Self::Enabled),
            "family" => Some(Self::Family),
            "categories" => Some(Self::Categories),
            "completeness" => Some(Self::Completeness),
            _ => None,
        }
    }

    /// Returns the operators accepted for the property.
    #[must_use]
    pub const fn operators(self) -> &'static [Operator] {
        match self {
            Self::Enabled => &[Operator::Equal, Operator::NotEqual],
            Self::Family => &[Operator::In, Operator::NotIn, Operator::Empty, Operator::NotEmpty],
            Self::Categories => &[
                Operator::In,
                Operator::NotIn,
                Operator::InChildren,
                Operator::NotInChildren,
                Operator::Unclassified,
                Operator::InOrUnclassified,
            ],
            Self::Completeness => {
                &[Operator::Equal, Operator::NotEqual, Operator::Lower, Operator::Greater]
            }
        }
    }
}

/// Resolved criterion field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CriterionField {
    /// Reserved product property.
    Reserved(ReservedField),
    /// Attribute code.
    Attribute(AttributeCode),
}

impl CriterionField {
    /// Resolves a raw field name; reserved names take precedence.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        ReservedField::parse(name)
            .map_or_else(|| Self::Attribute(AttributeCode::new(name)), Self::Reserved)
    }
}

// ============================================================================
// SECTION: Criterion
// ============================================================================

/// One product-selection condition.
///
/// # Invariants
/// - `scope`/`locale` are `None` unless the field requires them.
/// - `value` shape matches the operator arity once validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionCriterion {
    /// Attribute code or reserved property name.
    pub field: String,
    /// Operator.
    pub operator: Operator,
    /// Operand; null for nullary operators.
    #[serde(default)]
    pub value: Value,
    /// Channel code for scopable fields.
    #[serde(default)]
    pub scope: Option<ChannelCode>,
    /// Locale code for localizable fields.
    #[serde(default)]
    pub locale: Option<LocaleCode>,
}

impl SelectionCriterion {
    /// Builds a criterion without scope or locale.
    #[must_use]
    pub fn new(field: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            scope: None,
            locale: None,
        }
    }

    /// Returns a copy with scope and locale set.
    #[must_use]
    pub fn with_context(mut self, scope: Option<&str>, locale: Option<&str>) -> Self {
        self.scope = scope.map(ChannelCode::new);
        self.locale = locale.map(LocaleCode::new);
        self
    }

    /// Returns the resolved field.
    #[must_use]
    pub fn resolved_field(&self) -> CriterionField {
        CriterionField::parse(&self.field)
    }

    /// Collects the reference data this criterion depends on.
    ///
    /// Option codes are recorded for every attribute criterion carrying a
    /// string list; the set may over-approximate for non-select attributes.
    pub fn collect_references(&self, out: &mut BTreeSet<ReferenceKey>) {
        if let Some(scope) = &self.scope {
            out.insert(ReferenceKey::Channel(scope.clone()));
        }
        if let Some(locale) = &self.locale {
            out.insert(ReferenceKey::Locale(locale.clone()));
        }
        match self.resolved_field() {
            CriterionField::Reserved(ReservedField::Family) => {
                for code in string_items(&self.value) {
                    out.insert(ReferenceKey::Family(FamilyCode::new(code)));
                }
            }
            CriterionField::Reserved(ReservedField::Categories) => {
                for code in string_items(&self.value) {
                    out.insert(ReferenceKey::Category(CategoryCode::new(code)));
                }
            }
            CriterionField::Reserved(ReservedField::Enabled | ReservedField::Completeness) => {}
            CriterionField::Attribute(attribute) => {
                if matches!(self.operator, Operator::In | Operator::NotIn) {
                    for code in string_items(&self.value) {
                        out.insert(ReferenceKey::AttributeOption {
                            attribute: attribute.clone(),
                            option: OptionCode::new(code),
                        });
                    }
                }
                out.insert(ReferenceKey::Attribute(attribute));
            }
        }
    }
}

/// Iterates over the string members of a JSON list value.
fn string_items(value: &Value) -> impl Iterator<Item = &str> {
    value.as_array().into_iter().flatten().filter_map(Value::as_str)
}

// ============================================================================
// SECTION: Reference Keys
// ============================================================================

/// A piece of reference data a catalog depends on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKey {
    /// Attribute.
    Attribute(AttributeCode),
    /// Option of a select attribute.
    AttributeOption {
        /// Owning attribute.
        attribute: AttributeCode,
        /// Option code.
        option: OptionCode,
    },
    /// Channel.
    Channel(ChannelCode),
    /// Locale.
    Locale(LocaleCode),
    /// Family.
    Family(FamilyCode),
    /// Category.
    Category(CategoryCode),
}

impl ReferenceKey {
    /// Returns the reference kind label used by persistent indexes.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Attribute(_) => "attribute",
            Self::AttributeOption {
                ..
            } => "attribute_option",
            Self::Channel(_) => "channel",
            Self::Locale(_) => "locale",
            Self::Family(_) => "family",
            Self::Category(_) => "category",
        }
    }

    /// Returns the reference code used by persistent indexes.
    ///
    /// Options are keyed as `<attribute>.<option>`.
    #[must_use]
    pub fn code(&self) -> String {
        match self {
            Self::Attribute(code) => code.to_string(),
            Self::AttributeOption {
                attribute,
                option,
            } => format!("{attribute}.{option}"),
            Self::Channel(code) => code.to_string(),
            Self::Locale(code) => code.to_string(),
            Self::Family(code) => code.to_string(),
            Self::Category(code) => code.to_string(),
        }
    }
}

impl fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.code())
    }
}

/// Reference-data deletion notice consumed by catalog reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceDeletion(pub ReferenceKey);

impl ReferenceDeletion {
    /// Returns the deleted reference.
    #[must_use]
    pub const fn key(&self) -> &ReferenceKey {
        &self.0
    }
}
