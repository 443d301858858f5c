// catalog-sync-core/src/runtime/validation.rs
// ============================================================================
// Module: Shared Validation Rules
// Description: Scope and locale rules shared by criteria and mapping validation.
// Purpose: Keep presence checks dependent only on scopable/localizable flags.
// Dependencies: crate::{core, interfaces}, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Criteria and attribute sources carry the same `scope`/`locale` pair and
//! follow the same rules: a scopable attribute needs a non-blank string
//! naming a live channel, a localizable attribute needs a non-blank string
//! naming an enabled locale (activated for the channel when one is given),
//! and both must be null otherwise.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::Channel;
use crate::core::ChannelCode;
use crate::core::LocaleCode;
use crate::core::violation::Violation;
use crate::core::violation::messages;
use crate::interfaces::ReferenceData;
use crate::interfaces::ReferenceError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Null stand-in for omitted keys.
pub(crate) static NULL: Value = Value::Null;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Validation outcome errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input rejected with field-scoped violations.
    #[error("validation failed with {} violation(s)", .0.len())]
    Violations(Vec<Violation>),
    /// Reference data could not be consulted.
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

impl ValidationError {
    /// Returns the violations, empty for reference failures.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Violations(violations) => violations,
            Self::Reference(_) => &[],
        }
    }
}

// ============================================================================
// SECTION: Scalar Checks
// ============================================================================

/// Reads a non-blank string or records why it is not one.
pub(crate) fn require_string<'a>(
    value: &'a Value,
    path: &str,
    out: &mut Vec<Violation>,
) -> Option<&'a str> {
    match value {
        Value::String(text) if text.trim().is_empty() => {
            out.push(Violation::new(path, messages::NOT_BLANK));
            None
        }
        Value::String(text) => Some(text.as_str()),
        Value::Null => {
            out.push(Violation::new(path, messages::NOT_BLANK));
            None
        }
        _ => {
            out.push(Violation::new(path, messages::TYPE_STRING));
            None
        }
    }
}

/// Records a violation unless the value is null.
pub(crate) fn require_null(value: &Value, path: &str, out: &mut Vec<Violation>) {
    if !value.is_null() {
        out.push(Violation::new(path, messages::MUST_BE_NULL));
    }
}

// ============================================================================
// SECTION: Scope and Locale
// ============================================================================

/// Checks a `scope` value against the attribute's scopable flag.
///
/// Returns the live channel when the scope names one.
///
/// # Errors
///
/// Returns [`ReferenceError`] when channels cannot be consulted.
pub(crate) fn check_scope<R: ReferenceData + ?Sized>(
    reference: &R,
    value: &Value,
    scopable: bool,
    path: &str,
    out: &mut Vec<Violation>,
) -> Result<Option<Channel>, ReferenceError> {
    if !scopable {
        require_null(value, path, out);
        return Ok(None);
    }
    let Some(code) = require_string(value, path, out) else {
        return Ok(None);
    };
    match reference.channel(&ChannelCode::new(code))? {
        Some(channel) if !channel.deleted => Ok(Some(channel)),
        _ => {
            out.push(Violation::new(path, messages::CHANNEL_DELETED));
            Ok(None)
        }
    }
}

/// Checks a `locale` value against the attribute's localizable flag.
///
/// When `channel` is given the locale must be activated for it; otherwise
/// it must be enabled on at least one channel.
///
/// # Errors
///
/// Returns [`ReferenceError`] when locales cannot be consulted.
pub(crate) fn check_locale<R: ReferenceData + ?Sized>(
    reference: &R,
    value: &Value,
    localizable: bool,
    channel: Option<&Channel>,
    path: &str,
    out: &mut Vec<Violation>,
) -> Result<Option<LocaleCode>, ReferenceError> {
    if !localizable {
        require_null(value, path, out);
        return Ok(None);
    }
    let Some(code) = require_string(value, path, out) else {
        return Ok(None);
    };
    let locale = LocaleCode::new(code);
    if let Some(channel) = channel {
        if !channel.has_locale(&locale) {
            out.push(Violation::new(path, messages::LOCALE_NOT_IN_CHANNEL));
            return Ok(None);
        }
        return Ok(Some(locale));
    }
    match reference.locale(&locale)? {
        Some(found) if found.enabled => Ok(Some(locale)),
        _ => {
            out.push(Violation::new(path, messages::LOCALE_DISABLED));
            Ok(None)
        }
    }
}

/// Records `FIELD_NOT_EXPECTED` for every key outside `allowed`.
pub(crate) fn reject_unexpected_keys(
    object: &serde_json::Map<String, Value>,
    allowed: &[&str],
    path: &str,
    out: &mut Vec<Violation>,
) {
    for key in object.keys() {
        if !allowed.contains(&key.as_str()) {
            out.push(Violation::new(format!("{path}[{key}]"), messages::FIELD_NOT_EXPECTED));
        }
    }
}
