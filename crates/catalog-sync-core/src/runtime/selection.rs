// catalog-sync-core/src/runtime/selection.rs
// ============================================================================
// Module: Product Selection Compiler
// Description: Compiles stored selection criteria into product predicates.
// Purpose: Produce an executable filter or a typed compilation failure.
// Dependencies: crate::{core, interfaces, runtime}, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Compilation re-validates the stored criteria against current reference
//! data, then lowers each criterion to a predicate. All criteria are ANDed,
//! preceded by the owner's visibility condition; an empty criteria list
//! matches every visible product. `IN CHILDREN` expands each category to
//! itself plus all of its descendants at compile time.
//!
//! Failures never panic: a criterion that no longer validates (deleted
//! attribute, option, channel, locale) yields [`CompilationError::Invalid`],
//! which callers surface as an invalid catalog.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::collections::VecDeque;

use serde_json::Value;
use thiserror::Error;

use crate::core::AttributeCode;
use crate::core::AttributeType;
use crate::core::CategoryCode;
use crate::core::Comparison;
use crate::core::CriterionField;
use crate::core::FamilyCode;
use crate::core::Operator;
use crate::core::OptionCode;
use crate::core::PermissionScope;
use crate::core::ProductCondition;
use crate::core::ProductPredicate;
use crate::core::ReservedField;
use crate::core::SelectionCriterion;
use crate::core::UnitCode;
use crate::core::ValueTest;
use crate::core::predicate::number_of;
use crate::core::predicate::parse_date;
use crate::core::violation::Violation;
use crate::core::violation::messages;
use crate::core::violation::path;
use crate::interfaces::ReferenceData;
use crate::interfaces::ReferenceError;
use crate::runtime::criterion::validate_criteria;
use crate::runtime::validation::ValidationError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Selection compilation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompilationError {
    /// Criteria no longer validate against reference data.
    #[error("selection criteria are invalid: {} violation(s)", .0.len())]
    Invalid(Vec<Violation>),
    /// Reference data could not be consulted.
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

impl From<ValidationError> for CompilationError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::Violations(violations) => Self::Invalid(violations),
            ValidationError::Reference(error) => Self::Reference(error),
        }
    }
}

// ============================================================================
// SECTION: Compilation
// ============================================================================

/// Compiles criteria into a product predicate for the given permission scope.
///
/// # Errors
///
/// Returns [`CompilationError`] when a criterion references unknown fields,
/// deleted reference data, or carries an incompatible operator or value.
pub fn compile_selection<R: ReferenceData + ?Sized>(
    criteria: &[SelectionCriterion],
    reference: &R,
    permissions: &PermissionScope,
) -> Result<ProductPredicate, CompilationError> {
    let raw = serde_json::to_value(criteria).map_err(|err| {
        CompilationError::Invalid(vec![
            Violation::new("", messages::TYPE_ARRAY).with_cause(err.to_string()),
        ])
    })?;
    let validated = validate_criteria(&raw, reference)?;

    let mut conjuncts = Vec::with_capacity(validated.len() + 1);
    if let Some(visible) = permissions.condition() {
        conjuncts.push(ProductPredicate::condition(visible));
    }
    for (index, criterion) in validated.iter().enumerate() {
        conjuncts.push(lower_criterion(criterion, reference, &path("", index))?);
    }
    Ok(ProductPredicate::And(conjuncts))
}

/// Lowers one validated criterion.
fn lower_criterion<R: ReferenceData + ?Sized>(
    criterion: &SelectionCriterion,
    reference: &R,
    item_path: &str,
) -> Result<ProductPredicate, CompilationError> {
    let value_path = path(item_path, "value");
    let invalid = || {
        CompilationError::Invalid(vec![Violation::new(
            value_path.clone(),
            messages::OPERATOR_NOT_SUPPORTED,
        )])
    };
    match criterion.resolved_field() {
        CriterionField::Reserved(reserved) => {
            lower_reserved(reserved, criterion, reference)?.ok_or_else(invalid)
        }
        CriterionField::Attribute(code) => {
            let Some(attribute) = reference.attribute(&code)? else {
                return Err(CompilationError::Invalid(vec![Violation::new(
                    path(item_path, "field"),
                    messages::ATTRIBUTE_DELETED,
                )]));
            };
            lower_attribute(attribute.attribute_type, &code, criterion).ok_or_else(invalid)
        }
    }
}

// ============================================================================
// SECTION: Reserved Fields
// ============================================================================

/// Lowers a reserved-property criterion; `None` for inconsistent input.
fn lower_reserved<R: ReferenceData + ?Sized>(
    reserved: ReservedField,
    criterion: &SelectionCriterion,
    reference: &R,
) -> Result<Option<ProductPredicate>, CompilationError> {
    let operator = criterion.operator;
    let predicate = match reserved {
        ReservedField::Enabled => {
            let Some(expected) = criterion.value.as_bool() else {
                return Ok(None);
            };
            let expected = if operator == Operator::NotEqual { !expected } else { expected };
            Some(leaf(ProductCondition::Enabled(expected)))
        }
        ReservedField::Family => match operator {
            Operator::Empty => Some(ProductPredicate::negate(leaf(ProductCondition::HasFamily))),
            Operator::NotEmpty => Some(leaf(ProductCondition::HasFamily)),
            Operator::In | Operator::NotIn => {
                let families: BTreeSet<FamilyCode> =
                    codes(&criterion.value).map(FamilyCode::new).collect();
                let member = leaf(ProductCondition::FamilyIn(families));
                Some(if operator == Operator::In { member } else { ProductPredicate::negate(member) })
            }
            _ => None,
        },
        ReservedField::Categories => {
            let listed: BTreeSet<CategoryCode> =
                codes(&criterion.value).map(CategoryCode::new).collect();
            match operator {
                Operator::In => Some(leaf(ProductCondition::CategoryIn(listed))),
                Operator::NotIn => {
                    Some(ProductPredicate::negate(leaf(ProductCondition::CategoryIn(listed))))
                }
                Operator::InChildren => Some(leaf(ProductCondition::CategoryIn(
                    expand_descendants(reference, &listed)?,
                ))),
                Operator::NotInChildren => Some(ProductPredicate::negate(leaf(
                    ProductCondition::CategoryIn(expand_descendants(reference, &listed)?),
                ))),
                Operator::Unclassified => Some(leaf(ProductCondition::Unclassified)),
                Operator::InOrUnclassified => Some(ProductPredicate::Or(vec![
                    leaf(ProductCondition::CategoryIn(listed)),
                    leaf(ProductCondition::Unclassified),
                ])),
                _ => None,
            }
        }
        ReservedField::Completeness => {
            let (Some(channel), Some(locale), Some(comparison), Some(ratio)) = (
                criterion.scope.clone(),
                criterion.locale.clone(),
                comparison_for(operator),
                criterion.value.as_u64().and_then(|ratio| u8::try_from(ratio).ok()),
            ) else {
                return Ok(None);
            };
            Some(leaf(ProductCondition::Completeness {
                channel,
                locale,
                comparison,
                ratio,
            }))
        }
    };
    Ok(predicate)
}

/// Expands categories to themselves plus every descendant.
///
/// # Errors
///
/// Returns [`ReferenceError`] when the category tree cannot be read.
pub fn expand_descendants<R: ReferenceData + ?Sized>(
    reference: &R,
    roots: &BTreeSet<CategoryCode>,
) -> Result<BTreeSet<CategoryCode>, ReferenceError> {
    let mut seen: BTreeSet<CategoryCode> = BTreeSet::new();
    let mut queue: VecDeque<CategoryCode> = roots.iter().cloned().collect();
    while let Some(code) = queue.pop_front() {
        if !seen.insert(code.clone()) {
            continue;
        }
        for child in reference.category_children(&code)? {
            if !seen.contains(&child) {
                queue.push_back(child);
            }
        }
    }
    Ok(seen)
}

// ============================================================================
// SECTION: Attribute Fields
// ============================================================================

/// Lowers an attribute criterion; `None` for inconsistent input.
fn lower_attribute(
    attribute_type: AttributeType,
    code: &AttributeCode,
    criterion: &SelectionCriterion,
) -> Option<ProductPredicate> {
    let value_leaf = |test: ValueTest| {
        leaf(ProductCondition::Value {
            attribute: code.clone(),
            scope: criterion.scope.clone(),
            locale: criterion.locale.clone(),
            test,
        })
    };
    let present_and_not = |test: ValueTest| {
        ProductPredicate::And(vec![
            value_leaf(ValueTest::Present),
            ProductPredicate::negate(value_leaf(test)),
        ])
    };
    let operator = criterion.operator;
    let value = &criterion.value;
    match operator {
        Operator::Empty => return Some(ProductPredicate::negate(value_leaf(ValueTest::Present))),
        Operator::NotEmpty => return Some(value_leaf(ValueTest::Present)),
        _ => {}
    }
    match attribute_type {
        AttributeType::Identifier | AttributeType::Text | AttributeType::Textarea => {
            let text = value.as_str()?.to_string();
            match operator {
                Operator::Equal => Some(value_leaf(ValueTest::TextEquals(text))),
                Operator::NotEqual => Some(present_and_not(ValueTest::TextEquals(text))),
                Operator::Contains => Some(value_leaf(ValueTest::TextContains(text))),
                Operator::DoesNotContain => Some(present_and_not(ValueTest::TextContains(text))),
                Operator::StartsWith => Some(value_leaf(ValueTest::TextStartsWith(text))),
                _ => None,
            }
        }
        AttributeType::Number => {
            Some(value_leaf(ValueTest::Number(comparison_for(operator)?, number_of(value)?)))
        }
        AttributeType::Boolean => {
            let expected = value.as_bool()?;
            match operator {
                Operator::Equal => Some(value_leaf(ValueTest::Boolean(expected))),
                Operator::NotEqual => Some(value_leaf(ValueTest::Boolean(!expected))),
                _ => None,
            }
        }
        AttributeType::Date => match operator {
            Operator::Between | Operator::NotBetween => {
                let bounds = value.as_array()?;
                let from = parse_date(bounds.first()?.as_str()?)?;
                let to = parse_date(bounds.get(1)?.as_str()?)?;
                let test = ValueTest::DateBetween(from, to);
                Some(if operator == Operator::Between {
                    value_leaf(test)
                } else {
                    present_and_not(test)
                })
            }
            _ => Some(value_leaf(ValueTest::Date(
                comparison_for(operator)?,
                parse_date(value.as_str()?)?,
            ))),
        },
        AttributeType::SimpleSelect | AttributeType::MultiSelect => {
            let options: BTreeSet<OptionCode> = codes(value).map(OptionCode::new).collect();
            match operator {
                Operator::In => Some(value_leaf(ValueTest::OptionIn(options))),
                Operator::NotIn => Some(present_and_not(ValueTest::OptionIn(options))),
                _ => None,
            }
        }
        AttributeType::Metric => Some(value_leaf(ValueTest::Metric {
            comparison: comparison_for(operator)?,
            amount: value.get("amount").and_then(number_of)?,
            unit: UnitCode::new(value.get("unit")?.as_str()?),
        })),
        AttributeType::PriceCollection | AttributeType::Image | AttributeType::File => None,
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Wraps a condition as a predicate leaf.
const fn leaf(condition: ProductCondition) -> ProductPredicate {
    ProductPredicate::condition(condition)
}

/// Maps a comparison operator.
const fn comparison_for(operator: Operator) -> Option<Comparison> {
    match operator {
        Operator::Equal => Some(Comparison::Equal),
        Operator::NotEqual => Some(Comparison::NotEqual),
        Operator::Lower => Some(Comparison::Lower),
        Operator::LowerOrEqual => Some(Comparison::LowerOrEqual),
        Operator::Greater => Some(Comparison::Greater),
        Operator::GreaterOrEqual => Some(Comparison::GreaterOrEqual),
        _ => None,
    }
}

/// Iterates over the string members of a list value.
fn codes(value: &Value) -> impl Iterator<Item = &str> {
    value.as_array().into_iter().flatten().filter_map(Value::as_str)
}
