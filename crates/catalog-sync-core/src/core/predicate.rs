// catalog-sync-core/src/core/predicate.rs
// ============================================================================
// Module: Product Predicates
// Description: Executable boolean product filters produced by compilation.
// Purpose: Evaluate compiled product selections against product snapshots.
// Dependencies: serde_json, time
// ============================================================================

//! ## Overview
//! A [`ProductPredicate`] is a small boolean tree over [`ProductCondition`]
//! leaves. `And`/`Or` short-circuit in declaration order; an empty `And`
//! matches every product and an empty `Or` matches none. Leaves that read an
//! attribute value fail when the product has no value in the requested
//! context, so negations that must keep "has a value" semantics are compiled
//! as `And[Present, Not(test)]`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde_json::Value;
use time::Date;
use time::macros::format_description;

use crate::core::identifiers::AttributeCode;
use crate::core::identifiers::CategoryCode;
use crate::core::identifiers::ChannelCode;
use crate::core::identifiers::FamilyCode;
use crate::core::identifiers::LocaleCode;
use crate::core::identifiers::OptionCode;
use crate::core::identifiers::UnitCode;
use crate::core::product::Product;

// ============================================================================
// SECTION: Comparisons
// ============================================================================

/// Ordered comparison applied between a product value and an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Lower,
    /// `<=`
    LowerOrEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
}

impl Comparison {
    /// Returns true when `ordering` (value compared to operand) satisfies the comparison.
    #[must_use]
    pub const fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => matches!(ordering, Ordering::Equal),
            Self::NotEqual => !matches!(ordering, Ordering::Equal),
            Self::Lower => matches!(ordering, Ordering::Less),
            Self::LowerOrEqual => !matches!(ordering, Ordering::Greater),
            Self::Greater => matches!(ordering, Ordering::Greater),
            Self::GreaterOrEqual => !matches!(ordering, Ordering::Less),
        }
    }
}

/// Parses a `YYYY-MM-DD` date, ignoring any trailing time component.
#[must_use]
pub fn parse_date(raw: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    let day = raw.get(.. 10)?;
    Date::parse(day, &format).ok()
}

/// Reads a JSON number or numeric string as `f64`.
#[must_use]
pub fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// SECTION: Value Tests
// ============================================================================

/// Test applied to an attribute value that is present.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueTest {
    /// Any value.
    Present,
    /// Exact text match.
    TextEquals(String),
    /// Substring match.
    TextContains(String),
    /// Prefix match.
    TextStartsWith(String),
    /// Numeric comparison.
    Number(Comparison, f64),
    /// Boolean equality.
    Boolean(bool),
    /// Date comparison.
    Date(Comparison, Date),
    /// Inclusive date range.
    DateBetween(Date, Date),
    /// At least one selected option in the set.
    OptionIn(BTreeSet<OptionCode>),
    /// Measurement comparison; only values in the same unit compare.
    Metric {
        /// Comparison.
        comparison: Comparison,
        /// Operand amount.
        amount: f64,
        /// Operand unit.
        unit: UnitCode,
    },
}

impl ValueTest {
    /// Evaluates the test against value data.
    #[must_use]
    pub fn holds(&self, data: &Value) -> bool {
        match self {
            Self::Present => true,
            Self::TextEquals(expected) => data.as_str() == Some(expected.as_str()),
            Self::TextContains(needle) => {
                data.as_str().is_some_and(|text| text.contains(needle.as_str()))
            }
            Self::TextStartsWith(prefix) => {
                data.as_str().is_some_and(|text| text.starts_with(prefix.as_str()))
            }
            Self::Number(comparison, operand) => number_of(data)
                .and_then(|actual| actual.partial_cmp(operand))
                .is_some_and(|ordering| comparison.holds(ordering)),
            Self::Boolean(expected) => data.as_bool() == Some(*expected),
            Self::Date(comparison, operand) => data
                .as_str()
                .and_then(parse_date)
                .is_some_and(|actual| comparison.holds(actual.cmp(operand))),
            Self::DateBetween(from, to) => data
                .as_str()
                .and_then(parse_date)
                .is_some_and(|actual| *from <= actual && actual <= *to),
            Self::OptionIn(options) => match data {
                Value::String(code) => options.contains(&OptionCode::new(code.as_str())),
                Value::Array(codes) => codes
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|code| options.contains(&OptionCode::new(code))),
                _ => false,
            },
            Self::Metric {
                comparison,
                amount,
                unit,
            } => {
                let same_unit = data.get("unit").and_then(Value::as_str) == Some(unit.as_str());
                same_unit
                    && data
                        .get("amount")
                        .and_then(number_of)
                        .and_then(|actual| actual.partial_cmp(amount))
                        .is_some_and(|ordering| comparison.holds(ordering))
            }
        }
    }
}

// ============================================================================
// SECTION: Conditions
// ============================================================================

/// Leaf condition of a product predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductCondition {
    /// Unclassified, or in at least one of the granted categories.
    Visible(BTreeSet<CategoryCode>),
    /// Enabled flag equals the operand.
    Enabled(bool),
    /// Family in the set.
    FamilyIn(BTreeSet<FamilyCode>),
    /// Product has a family.
    HasFamily,
    /// In at least one of the categories.
    CategoryIn(BTreeSet<CategoryCode>),
    /// In no category.
    Unclassified,
    /// Completeness comparison; products without a computed ratio fail.
    Completeness {
        /// Channel.
        channel: ChannelCode,
        /// Locale.
        locale: LocaleCode,
        /// Comparison.
        comparison: Comparison,
        /// Operand percentage.
        ratio: u8,
    },
    /// Attribute value test in a context; products without a value fail.
    Value {
        /// Attribute.
        attribute: AttributeCode,
        /// Channel for scopable attributes.
        scope: Option<ChannelCode>,
        /// Locale for localizable attributes.
        locale: Option<LocaleCode>,
        /// Test applied to the value.
        test: ValueTest,
    },
}

impl ProductCondition {
    /// Evaluates the condition against a product.
    #[must_use]
    pub fn holds(&self, product: &Product) -> bool {
        match self {
            Self::Visible(granted) => {
                product.is_unclassified()
                    || product.categories.iter().any(|category| granted.contains(category))
            }
            Self::Enabled(expected) => product.enabled == *expected,
            Self::FamilyIn(families) => {
                product.family.as_ref().is_some_and(|family| families.contains(family))
            }
            Self::HasFamily => product.family.is_some(),
            Self::CategoryIn(categories) => {
                product.categories.iter().any(|category| categories.contains(category))
            }
            Self::Unclassified => product.is_unclassified(),
            Self::Completeness {
                channel,
                locale,
                comparison,
                ratio,
            } => product
                .completeness_for(channel, locale)
                .is_some_and(|actual| comparison.holds(actual.cmp(ratio))),
            Self::Value {
                attribute,
                scope,
                locale,
                test,
            } => product
                .value(attribute, scope.as_ref(), locale.as_ref())
                .is_some_and(|data| test.holds(data)),
        }
    }
}

// ============================================================================
// SECTION: Predicate Tree
// ============================================================================

/// Executable product filter.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductPredicate {
    /// All children hold; empty matches everything.
    And(Vec<Self>),
    /// At least one child holds; empty matches nothing.
    Or(Vec<Self>),
    /// Child does not hold.
    Not(Box<Self>),
    /// Leaf condition.
    Condition(ProductCondition),
}

impl ProductPredicate {
    /// Returns the predicate matching every product.
    #[must_use]
    pub const fn all() -> Self {
        Self::And(Vec::new())
    }

    /// Wraps a leaf condition.
    #[must_use]
    pub const fn condition(condition: ProductCondition) -> Self {
        Self::Condition(condition)
    }

    /// Negates a predicate.
    #[must_use]
    pub fn negate(predicate: Self) -> Self {
        Self::Not(Box::new(predicate))
    }

    /// Evaluates the predicate against a product.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::And(children) => children.iter().all(|child| child.matches(product)),
            Self::Or(children) => children.iter().any(|child| child.matches(product)),
            Self::Not(child) => !child.matches(product),
            Self::Condition(condition) => condition.holds(product),
        }
    }
}

// ============================================================================
// SECTION: Permission Scope
// ============================================================================

/// Categories an owner may see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionScope {
    /// Granted categories; `None` grants everything.
    pub granted_categories: Option<BTreeSet<CategoryCode>>,
}

impl PermissionScope {
    /// Scope that sees every product.
    #[must_use]
    pub const fn unrestricted() -> Self {
        Self {
            granted_categories: None,
        }
    }

    /// Scope limited to unclassified products and the given categories.
    #[must_use]
    pub fn restricted<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CategoryCode>,
    {
        Self {
            granted_categories: Some(categories.into_iter().map(Into::into).collect()),
        }
    }

    /// Returns the visibility condition, `None` when unrestricted.
    #[must_use]
    pub fn condition(&self) -> Option<ProductCondition> {
        self.granted_categories.clone().map(ProductCondition::Visible)
    }
}
