// catalog-sync-core/src/runtime/criterion.rs
// ============================================================================
// Module: Selection Criteria Validation
// Description: Validates raw product selection criteria against reference data.
// Purpose: Turn untrusted criteria documents into typed criteria or violations.
// Dependencies: crate::{core, interfaces, runtime}, serde_json
// ============================================================================

//! ## Overview
//! Criteria arrive as a JSON array of objects with `field`, `operator`,
//! `value`, `scope`, and `locale`. Validation is pure: it consults
//! [`ReferenceData`] but never mutates anything, and returns every violation
//! it finds with a `[index][key]` property path. `scope` and `locale` may be
//! omitted, in which case they are read as null.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::core::Attribute;
use crate::core::AttributeType;
use crate::core::CategoryCode;
use crate::core::CriterionField;
use crate::core::FamilyCode;
use crate::core::Operator;
use crate::core::OptionCode;
use crate::core::ReservedField;
use crate::core::SelectionCriterion;
use crate::core::UnitCode;
use crate::core::predicate::number_of;
use crate::core::predicate::parse_date;
use crate::core::violation::Violation;
use crate::core::violation::messages;
use crate::core::violation::path;
use crate::interfaces::ReferenceData;
use crate::interfaces::ReferenceError;
use crate::runtime::validation::NULL;
use crate::runtime::validation::ValidationError;
use crate::runtime::validation::check_locale;
use crate::runtime::validation::check_scope;
use crate::runtime::validation::reject_unexpected_keys;
use crate::runtime::validation::require_null;

// ============================================================================
// SECTION: Operator Tables
// ============================================================================

/// Keys accepted in a criterion object.
const CRITERION_KEYS: [&str; 5] = ["field", "operator", "value", "scope", "locale"];

/// Returns the operators accepted for an attribute type.
#[must_use]
pub const fn attribute_operators(attribute_type: AttributeType) -> &'static [Operator] {
    match attribute_type {
        AttributeType::Identifier | AttributeType::Text | AttributeType::Textarea => &[
            Operator::Equal,
            Operator::NotEqual,
            Operator::Contains,
            Operator::DoesNotContain,
            Operator::StartsWith,
            Operator::Empty,
            Operator::NotEmpty,
        ],
        AttributeType::Number | AttributeType::Metric => &[
            Operator::Equal,
            Operator::NotEqual,
            Operator::Lower,
            Operator::LowerOrEqual,
            Operator::Greater,
            Operator::GreaterOrEqual,
            Operator::Empty,
            Operator::NotEmpty,
        ],
        AttributeType::Boolean => {
            &[Operator::Equal, Operator::NotEqual, Operator::Empty, Operator::NotEmpty]
        }
        AttributeType::Date => &[
            Operator::Equal,
            Operator::NotEqual,
            Operator::Lower,
            Operator::Greater,
            Operator::Between,
            Operator::NotBetween,
            Operator::Empty,
            Operator::NotEmpty,
        ],
        AttributeType::SimpleSelect | AttributeType::MultiSelect => {
            &[Operator::In, Operator::NotIn, Operator::Empty, Operator::NotEmpty]
        }
        AttributeType::PriceCollection | AttributeType::Image | AttributeType::File => &[],
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a raw criteria document.
///
/// # Errors
///
/// Returns [`ValidationError::Violations`] listing every invalid field, or
/// [`ValidationError::Reference`] when reference data is unavailable.
pub fn validate_criteria<R: ReferenceData + ?Sized>(
    raw: &Value,
    reference: &R,
) -> Result<Vec<SelectionCriterion>, ValidationError> {
    let Some(items) = raw.as_array() else {
        return Err(ValidationError::Violations(vec![Violation::new("", messages::TYPE_ARRAY)]));
    };
    let mut violations = Vec::new();
    let mut criteria = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let item_path = path("", index);
        let before = violations.len();
        let criterion = validate_criterion(item, reference, &item_path, &mut violations)?;
        if violations.len() == before
            && let Some(criterion) = criterion
        {
            criteria.push(criterion);
        }
    }
    if violations.is_empty() {
        Ok(criteria)
    } else {
        Err(ValidationError::Violations(violations))
    }
}

/// Validates one criterion object.
fn validate_criterion<R: ReferenceData + ?Sized>(
    item: &Value,
    reference: &R,
    item_path: &str,
    out: &mut Vec<Violation>,
) -> Result<Option<SelectionCriterion>, ReferenceError> {
    let Some(object) = item.as_object() else {
        out.push(Violation::new(item_path, messages::TYPE_OBJECT));
        return Ok(None);
    };
    reject_unexpected_keys(object, &CRITERION_KEYS, item_path, out);
    let field = read_required_string(object, "field", item_path, out);
    let operator_label = read_required_string(object, "operator", item_path, out);
    let (Some(field), Some(operator_label)) = (field, operator_label) else {
        return Ok(None);
    };
    let Some(operator) = Operator::parse(operator_label) else {
        out.push(Violation::new(path(item_path, "operator"), messages::OPERATOR_NOT_SUPPORTED));
        return Ok(None);
    };
    let value = object.get("value").unwrap_or(&NULL);
    let scope = object.get("scope").unwrap_or(&NULL);
    let locale = object.get("locale").unwrap_or(&NULL);
    let value_path = path(item_path, "value");
    let scope_path = path(item_path, "scope");
    let locale_path = path(item_path, "locale");

    let (scope, locale) = match CriterionField::parse(field) {
        CriterionField::Reserved(reserved) => {
            if !reserved.operators().contains(&operator) {
                out.push(Violation::new(path(item_path, "operator"), messages::OPERATOR_NOT_SUPPORTED));
                return Ok(None);
            }
            let contextual = reserved == ReservedField::Completeness;
            let channel = check_scope(reference, scope, contextual, &scope_path, out)?;
            let locale =
                check_locale(reference, locale, contextual, channel.as_ref(), &locale_path, out)?;
            check_reserved_value(reserved, operator, value, reference, &value_path, out)?;
            (channel.map(|channel| channel.code), locale)
        }
        CriterionField::Attribute(code) => {
            let Some(attribute) = reference.attribute(&code)? else {
                out.push(Violation::new(path(item_path, "field"), messages::ATTRIBUTE_DELETED));
                return Ok(None);
            };
            if !attribute_operators(attribute.attribute_type).contains(&operator) {
                out.push(Violation::new(path(item_path, "operator"), messages::OPERATOR_NOT_SUPPORTED));
                return Ok(None);
            }
            let channel = check_scope(reference, scope, attribute.scopable, &scope_path, out)?;
            let locale = check_locale(
                reference,
                locale,
                attribute.localizable,
                channel.as_ref(),
                &locale_path,
                out,
            )?;
            check_attribute_value(&attribute, operator, value, &value_path, out);
            (channel.map(|channel| channel.code), locale)
        }
    };
    Ok(Some(SelectionCriterion {
        field: field.to_string(),
        operator,
        value: value.clone(),
        scope,
        locale,
    }))
}

/// Reads a required string key, recording missing or mistyped keys.
fn read_required_string<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    item_path: &str,
    out: &mut Vec<Violation>,
) -> Option<&'a str> {
    match object.get(key) {
        None => {
            out.push(Violation::new(path(item_path, key), messages::FIELD_MISSING));
            None
        }
        Some(Value::String(text)) => Some(text.as_str()),
        Some(_) => {
            out.push(Violation::new(path(item_path, key), messages::TYPE_STRING));
            None
        }
    }
}

// ============================================================================
// SECTION: Value Checks
// ============================================================================

/// Checks the value of a reserved-property criterion.
fn check_reserved_value<R: ReferenceData + ?Sized>(
    reserved: ReservedField,
    operator: Operator,
    value: &Value,
    reference: &R,
    value_path: &str,
    out: &mut Vec<Violation>,
) -> Result<(), ReferenceError> {
    if operator.is_nullary() {
        require_null(value, value_path, out);
        return Ok(());
    }
    match reserved {
        ReservedField::Enabled => {
            if !value.is_boolean() {
                out.push(Violation::new(value_path, messages::TYPE_BOOLEAN));
            }
        }
        ReservedField::Family => {
            if let Some(codes) = require_code_list(value, value_path, out) {
                for code in codes {
                    if reference.family(&FamilyCode::new(code))?.is_none() {
                        out.push(Violation::new(value_path, messages::FAMILY_DELETED));
                        break;
                    }
                }
            }
        }
        ReservedField::Categories => {
            if let Some(codes) = require_code_list(value, value_path, out) {
                for code in codes {
                    if reference.category(&CategoryCode::new(code))?.is_none() {
                        out.push(Violation::new(value_path, messages::CATEGORY_DELETED));
                        break;
                    }
                }
            }
        }
        ReservedField::Completeness => match value.as_u64() {
            Some(ratio) if ratio <= 100 => {}
            Some(_) => out.push(Violation::new(value_path, messages::PERCENTAGE_RANGE)),
            None if value.is_number() => {
                out.push(Violation::new(value_path, messages::PERCENTAGE_RANGE));
            }
            None => out.push(Violation::new(value_path, messages::TYPE_NUMBER)),
        },
    }
    Ok(())
}

/// Checks the value of an attribute criterion.
fn check_attribute_value(
    attribute: &Attribute,
    operator: Operator,
    value: &Value,
    value_path: &str,
    out: &mut Vec<Violation>,
) {
    if operator.is_nullary() {
        require_null(value, value_path, out);
        return;
    }
    match attribute.attribute_type {
        AttributeType::Identifier | AttributeType::Text | AttributeType::Textarea => {
            if !value.is_string() {
                out.push(Violation::new(value_path, messages::TYPE_STRING));
            }
        }
        AttributeType::Number => {
            if number_of(value).is_none() || value.is_string() {
                out.push(Violation::new(value_path, messages::TYPE_NUMBER));
            }
        }
        AttributeType::Boolean => {
            if !value.is_boolean() {
                out.push(Violation::new(value_path, messages::TYPE_BOOLEAN));
            }
        }
        AttributeType::Date => {
            if matches!(operator, Operator::Between | Operator::NotBetween) {
                check_date_range(value, value_path, out);
            } else {
                check_date(value, value_path, out);
            }
        }
        AttributeType::SimpleSelect | AttributeType::MultiSelect => {
            if let Some(codes) = require_code_list(value, value_path, out)
                && codes.iter().any(|code| !attribute.options.contains(&OptionCode::new(*code)))
            {
                out.push(Violation::new(value_path, messages::OPTION_DELETED));
            }
        }
        AttributeType::Metric => check_metric(attribute, value, value_path, out),
        AttributeType::PriceCollection | AttributeType::Image | AttributeType::File => {}
    }
}

/// Reads a non-empty list of string codes.
fn require_code_list<'a>(
    value: &'a Value,
    value_path: &str,
    out: &mut Vec<Violation>,
) -> Option<Vec<&'a str>> {
    let Some(items) = value.as_array() else {
        out.push(Violation::new(value_path, messages::TYPE_ARRAY));
        return None;
    };
    if items.is_empty() {
        out.push(Violation::new(value_path, messages::LIST_EMPTY));
        return None;
    }
    let codes: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
    if codes.is_none() {
        out.push(Violation::new(value_path, messages::TYPE_STRING));
    }
    codes
}

/// Checks a single `YYYY-MM-DD` date.
fn check_date(value: &Value, value_path: &str, out: &mut Vec<Violation>) {
    match value.as_str() {
        None => out.push(Violation::new(value_path, messages::TYPE_STRING)),
        Some(raw) if raw.len() != 10 || parse_date(raw).is_none() => {
            out.push(Violation::new(value_path, messages::INVALID_DATE));
        }
        Some(_) => {}
    }
}

/// Checks a two-date range.
fn check_date_range(value: &Value, value_path: &str, out: &mut Vec<Violation>) {
    let Some(items) = value.as_array() else {
        out.push(Violation::new(value_path, messages::TYPE_ARRAY));
        return;
    };
    if items.len() != 2 {
        out.push(Violation::new(value_path, messages::RANGE_SIZE));
        return;
    }
    for (index, item) in items.iter().enumerate() {
        check_date(item, &path(value_path, index), out);
    }
}

/// Checks a `{amount, unit}` metric operand.
fn check_metric(attribute: &Attribute, value: &Value, value_path: &str, out: &mut Vec<Violation>) {
    let Some(object) = value.as_object() else {
        out.push(Violation::new(value_path, messages::TYPE_OBJECT));
        return;
    };
    reject_unexpected_keys(object, &["amount", "unit"], value_path, out);
    match object.get("amount") {
        None => out.push(Violation::new(path(value_path, "amount"), messages::FIELD_MISSING)),
        Some(amount) if !amount.is_number() => {
            out.push(Violation::new(path(value_path, "amount"), messages::TYPE_NUMBER));
        }
        Some(_) => {}
    }
    match object.get("unit") {
        None => out.push(Violation::new(path(value_path, "unit"), messages::FIELD_MISSING)),
        Some(Value::String(unit)) => {
            if !attribute.units.contains(&UnitCode::new(unit.as_str())) {
                out.push(Violation::new(path(value_path, "unit"), messages::UNIT_NOT_IN_FAMILY));
            }
        }
        Some(_) => out.push(Violation::new(path(value_path, "unit"), messages::TYPE_STRING)),
    }
}

