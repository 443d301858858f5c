// catalog-sync-core/src/runtime/mapping.rs
// ============================================================================
// Module: Product Mapping Validation
// Description: Validates product mappings against their schema and reference data.
// Purpose: Turn untrusted mapping documents into typed mappings or violations.
// Dependencies: crate::{core, interfaces, runtime}, serde_json
// ============================================================================

//! ## Overview
//! Mapping validation runs in a single pass:
//!
//! 1. the catalog's product mapping schema is meta-validated;
//! 2. the mapping must carry exactly the schema's target properties;
//! 3. each attribute source is validated according to the kind derived from
//!    its attribute type, then checked for compatibility with its target.
//!
//! A target whose source is `null` is left unmapped. The `uuid` target is
//! always fed by the product UUID and accepts `null` or the explicit
//! `{"source": "uuid", "scope": null, "locale": null}` form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value;

use crate::core::Attribute;
use crate::core::AttributeCode;
use crate::core::AttributeSource;
use crate::core::Channel;
use crate::core::CurrencyCode;
use crate::core::ProductMapping;
use crate::core::SourceKind;
use crate::core::SourceParameter;
use crate::core::SourceParameters;
use crate::core::TargetProperty;
use crate::core::UnitCode;
use crate::core::mapping::UUID_TARGET;
use crate::core::mapping::schema_targets;
use crate::core::violation::Violation;
use crate::core::violation::messages;
use crate::core::violation::path;
use crate::interfaces::ReferenceData;
use crate::interfaces::ReferenceError;
use crate::runtime::schema::validate_mapping_schema;
use crate::runtime::validation::NULL;
use crate::runtime::validation::ValidationError;
use crate::runtime::validation::check_locale;
use crate::runtime::validation::check_scope;
use crate::runtime::validation::reject_unexpected_keys;
use crate::runtime::validation::require_string;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Keys accepted by sources without parameters.
const SOURCE_KEYS: [&str; 3] = ["source", "scope", "locale"];

/// Keys accepted by sources with parameters.
const SOURCE_KEYS_WITH_PARAMETERS: [&str; 4] = ["source", "scope", "locale", "parameters"];

// ============================================================================
// SECTION: Mapping Validation
// ============================================================================

/// Validates a product mapping against its schema and reference data.
///
/// A missing schema is treated as an empty schema: only an empty mapping is
/// accepted.
///
/// # Errors
///
/// Returns [`ValidationError::Violations`] listing every invalid field, or
/// [`ValidationError::Reference`] when reference data is unavailable.
pub fn validate_mapping<R: ReferenceData + ?Sized>(
    schema: Option<&Value>,
    mapping: &Value,
    reference: &R,
) -> Result<ProductMapping, ValidationError> {
    let targets = match schema {
        Some(schema) => {
            validate_mapping_schema(schema)
                .map_err(|violation| ValidationError::Violations(vec![violation]))?;
            schema_targets(schema)
        }
        None => Vec::new(),
    };
    let Some(object) = mapping.as_object() else {
        return Err(ValidationError::Violations(vec![Violation::new("", messages::TYPE_OBJECT)]));
    };

    let mut violations = Vec::new();
    for key in object.keys() {
        if !targets.iter().any(|target| &target.name == key) {
            violations.push(Violation::new(path("", key), messages::FIELD_NOT_EXPECTED));
        }
    }

    let mut sources = BTreeMap::new();
    for target in &targets {
        let target_path = path("", &target.name);
        let Some(raw) = object.get(&target.name) else {
            violations.push(Violation::new(target_path, messages::FIELD_MISSING));
            continue;
        };
        if target.name == UUID_TARGET {
            check_uuid_target(raw, &target_path, &mut violations);
            sources.insert(target.name.clone(), None);
            continue;
        }
        let source = validate_target_source(raw, target, reference, &target_path, &mut violations)?;
        sources.insert(target.name.clone(), source);
    }

    if violations.is_empty() {
        Ok(ProductMapping(sources))
    } else {
        Err(ValidationError::Violations(violations))
    }
}

/// Checks the fixed `uuid` target.
fn check_uuid_target(raw: &Value, target_path: &str, out: &mut Vec<Violation>) {
    let Some(object) = raw.as_object() else {
        if !raw.is_null() {
            out.push(Violation::new(target_path, messages::TYPE_OBJECT));
        }
        return;
    };
    reject_unexpected_keys(object, &SOURCE_KEYS, target_path, out);
    if object.get("source").and_then(Value::as_str) != Some(UUID_TARGET) {
        out.push(Violation::new(path(target_path, "source"), messages::FIELD_NOT_EXPECTED));
    }
    for key in ["scope", "locale"] {
        if !object.get(key).unwrap_or(&NULL).is_null() {
            out.push(Violation::new(path(target_path, key), messages::MUST_BE_NULL));
        }
    }
}

/// Validates the source of one non-`uuid` target.
fn validate_target_source<R: ReferenceData + ?Sized>(
    raw: &Value,
    target: &TargetProperty,
    reference: &R,
    target_path: &str,
    out: &mut Vec<Violation>,
) -> Result<Option<AttributeSource>, ReferenceError> {
    let Some(object) = raw.as_object() else {
        if !raw.is_null() {
            out.push(Violation::new(target_path, messages::TYPE_OBJECT));
        }
        return Ok(None);
    };
    if object.get("source").is_some_and(Value::is_null) {
        reject_unexpected_keys(object, &SOURCE_KEYS, target_path, out);
        for key in ["scope", "locale"] {
            if !object.get(key).unwrap_or(&NULL).is_null() {
                out.push(Violation::new(path(target_path, key), messages::MUST_BE_NULL));
            }
        }
        return Ok(None);
    }
    let before = out.len();
    let Some((attribute, source)) = validate_source_object(object, reference, target_path, out)?
    else {
        return Ok(None);
    };
    if out.len() == before
        && !SourceKind::for_attribute(attribute.attribute_type).is_compatible_with(target)
    {
        out.push(Violation::new(
            path(target_path, "source"),
            messages::ATTRIBUTE_TYPE_INCOMPATIBLE,
        ));
    }
    Ok(Some(source))
}

// ============================================================================
// SECTION: Attribute Sources
// ============================================================================

/// Validates a single attribute source object outside of any schema.
///
/// # Errors
///
/// Returns [`ValidationError::Violations`] when the source is invalid, or
/// [`ValidationError::Reference`] when reference data is unavailable.
pub fn validate_attribute_source<R: ReferenceData + ?Sized>(
    raw: &Value,
    reference: &R,
) -> Result<AttributeSource, ValidationError> {
    let Some(object) = raw.as_object() else {
        return Err(ValidationError::Violations(vec![Violation::new("", messages::TYPE_OBJECT)]));
    };
    let mut violations = Vec::new();
    let validated = validate_source_object(object, reference, "", &mut violations)?;
    match validated {
        Some((_, source)) if violations.is_empty() => Ok(source),
        _ => Err(ValidationError::Violations(violations)),
    }
}

/// Validates a source object, dispatching on the attribute's source kind.
fn validate_source_object<R: ReferenceData + ?Sized>(
    object: &Map<String, Value>,
    reference: &R,
    source_path: &str,
    out: &mut Vec<Violation>,
) -> Result<Option<(Attribute, AttributeSource)>, ReferenceError> {
    let code_path = path(source_path, "source");
    let code = match object.get("source") {
        None => {
            out.push(Violation::new(&code_path, messages::FIELD_MISSING));
            None
        }
        Some(value) => require_string(value, &code_path, out),
    };
    let attribute = match code {
        Some(code) => {
            let found = reference.attribute(&AttributeCode::new(code))?;
            if found.is_none() {
                out.push(Violation::new(code_path.clone(), messages::ATTRIBUTE_DELETED));
            }
            found
        }
        None => None,
    };
    let Some(attribute) = attribute else {
        reject_unexpected_keys(object, &SOURCE_KEYS_WITH_PARAMETERS, source_path, out);
        return Ok(None);
    };

    let rules = SourceKind::for_attribute(attribute.attribute_type).rules();
    let allowed: &[&str] =
        if rules.has_parameters() { &SOURCE_KEYS_WITH_PARAMETERS } else { &SOURCE_KEYS };
    reject_unexpected_keys(object, allowed, source_path, out);

    let scope_path = path(source_path, "scope");
    let locale_path = path(source_path, "locale");
    let channel = match object.get("scope") {
        None => {
            out.push(Violation::new(scope_path, messages::FIELD_MISSING));
            None
        }
        Some(scope) => check_scope(reference, scope, attribute.scopable, &scope_path, out)?,
    };
    let locale = match object.get("locale") {
        None => {
            out.push(Violation::new(locale_path, messages::FIELD_MISSING));
            None
        }
        Some(locale) => check_locale(
            reference,
            locale,
            attribute.localizable,
            channel.as_ref(),
            &locale_path,
            out,
        )?,
    };

    let parameters = if rules.has_parameters() {
        let parameters_path = path(source_path, "parameters");
        match object.get("parameters") {
            None => {
                out.push(Violation::new(parameters_path, messages::FIELD_MISSING));
                None
            }
            Some(raw) => Some(validate_parameters(
                raw,
                rules.parameters,
                &attribute,
                channel.as_ref(),
                reference,
                &parameters_path,
                out,
            )?),
        }
    } else {
        None
    };

    let source = AttributeSource {
        source: attribute.code.clone(),
        scope: channel.map(|channel| channel.code),
        locale,
        parameters,
    };
    Ok(Some((attribute, source)))
}

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Validates the `parameters` object of a source.
fn validate_parameters<R: ReferenceData + ?Sized>(
    raw: &Value,
    accepted: &[SourceParameter],
    attribute: &Attribute,
    channel: Option<&Channel>,
    reference: &R,
    parameters_path: &str,
    out: &mut Vec<Violation>,
) -> Result<SourceParameters, ReferenceError> {
    let mut parameters = SourceParameters::default();
    let Some(object) = raw.as_object() else {
        out.push(Violation::new(parameters_path, messages::TYPE_OBJECT));
        return Ok(parameters);
    };
    let keys: Vec<&str> = accepted.iter().map(|parameter| parameter.key()).collect();
    reject_unexpected_keys(object, &keys, parameters_path, out);

    for parameter in accepted {
        let parameter_path = path(parameters_path, parameter.key());
        let Some(value) = object.get(parameter.key()) else {
            out.push(Violation::new(parameter_path, messages::FIELD_MISSING));
            continue;
        };
        match parameter {
            SourceParameter::LabelLocale => {
                parameters.label_locale =
                    check_locale(reference, value, true, None, &parameter_path, out)?;
            }
            SourceParameter::Unit => {
                let Some(unit) = require_string(value, &parameter_path, out) else {
                    continue;
                };
                let unit = UnitCode::new(unit);
                if attribute.units.contains(&unit) {
                    parameters.unit = Some(unit);
                } else {
                    out.push(Violation::new(parameter_path, messages::UNIT_NOT_IN_FAMILY));
                }
            }
            SourceParameter::Currency => {
                let Some(currency) = require_string(value, &parameter_path, out) else {
                    continue;
                };
                let currency = CurrencyCode::new(currency);
                if currency_is_activated(&currency, channel, reference)? {
                    parameters.currency = Some(currency);
                } else {
                    out.push(Violation::new(parameter_path, messages::CURRENCY_NOT_ACTIVATED));
                }
            }
        }
    }
    Ok(parameters)
}

/// Returns true when the currency is activated on the channel, or on any
/// channel when the source is not scoped.
fn currency_is_activated<R: ReferenceData + ?Sized>(
    currency: &CurrencyCode,
    channel: Option<&Channel>,
    reference: &R,
) -> Result<bool, ReferenceError> {
    if let Some(channel) = channel {
        return Ok(channel.currencies.contains(currency));
    }
    Ok(reference
        .channels()?
        .iter()
        .any(|channel| !channel.deleted && channel.currencies.contains(currency)))
}
