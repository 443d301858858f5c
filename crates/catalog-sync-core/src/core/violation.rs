// catalog-sync-core/src/core/violation.rs
// ============================================================================
// Module: Validation Violations
// Description: Field-scoped validation failures and the message catalogue.
// Purpose: Give every validator one shared, serializable failure shape.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Violation`] names the offending field with a bracketed property path
//! (`[name][locale]`, `[0][value]`) and carries a fixed, user-facing message.
//! Messages are stable strings consumed verbatim by API clients.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Messages
// ============================================================================

/// Fixed violation messages.
pub mod messages {
    /// Required key absent.
    pub const FIELD_MISSING: &str = "This field is missing.";
    /// Key present but not allowed.
    pub const FIELD_NOT_EXPECTED: &str = "This field was not expected.";
    /// Value must be a string.
    pub const TYPE_STRING: &str = "This value should be of type string.";
    /// Value must be an array.
    pub const TYPE_ARRAY: &str = "This value should be of type array.";
    /// Value must be a boolean.
    pub const TYPE_BOOLEAN: &str = "This value should be of type bool.";
    /// Value must be a number.
    pub const TYPE_NUMBER: &str = "This value should be of type numeric.";
    /// Value must be an object.
    pub const TYPE_OBJECT: &str = "This value should be of type object.";
    /// Value must not be blank.
    pub const NOT_BLANK: &str = "This value should not be blank.";
    /// Value must be null.
    pub const MUST_BE_NULL: &str = "This value should be null.";
    /// Channel unknown or deleted.
    pub const CHANNEL_DELETED: &str =
        "This channel has been deleted. Please check your channel settings or update this value.";
    /// Locale unknown or not enabled anywhere.
    pub const LOCALE_DISABLED: &str = "This locale is disabled or does not exist anymore. Please \
                                       check your channels and locales settings.";
    /// Locale not activated for the selected channel.
    pub const LOCALE_NOT_IN_CHANNEL: &str = "This locale is disabled. Please check your channels \
                                             and locales settings or update this value.";
    /// Mapping schema rejected by its meta-schema.
    pub const INVALID_SCHEMA: &str = "You must provide a valid schema.";
    /// Attribute unknown.
    pub const ATTRIBUTE_DELETED: &str = "This attribute has been deleted.";
    /// Attribute type cannot feed the target property.
    pub const ATTRIBUTE_TYPE_INCOMPATIBLE: &str =
        "This attribute type is not compatible with the target type.";
    /// Unit outside the attribute's measurement family.
    pub const UNIT_NOT_IN_FAMILY: &str =
        "This unit does not belong to the measurement family of the attribute.";
    /// Currency not activated on any channel, or not on the selected one.
    pub const CURRENCY_NOT_ACTIVATED: &str = "This currency is not activated. Please check your \
                                              channels settings or update this value.";
    /// Option unknown for the attribute.
    pub const OPTION_DELETED: &str = "This option has been deleted.";
    /// Family unknown.
    pub const FAMILY_DELETED: &str = "This family has been deleted.";
    /// Category unknown.
    pub const CATEGORY_DELETED: &str = "This category has been deleted.";
    /// Criterion field unknown.
    pub const FIELD_UNKNOWN: &str = "This field does not exist.";
    /// Operator not supported for the field.
    pub const OPERATOR_NOT_SUPPORTED: &str = "This operator is not supported for this field.";
    /// Empty list where at least one element is required.
    pub const LIST_EMPTY: &str = "This collection should contain 1 element or more.";
    /// Range list of the wrong size.
    pub const RANGE_SIZE: &str = "This collection should contain exactly 2 elements.";
    /// Date not in `YYYY-MM-DD` form.
    pub const INVALID_DATE: &str = "This value is not a valid date.";
    /// Name longer than 255 characters.
    pub const NAME_TOO_LONG: &str = "This value is too long. It should have 255 characters or less.";
    /// Percentage outside 0..=100.
    pub const PERCENTAGE_RANGE: &str = "This value should be between 0 and 100.";
}

// ============================================================================
// SECTION: Violation
// ============================================================================

/// Field-scoped validation failure.
///
/// # Invariants
/// - `property_path` is a sequence of bracketed segments, empty for the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Bracketed path of the offending field.
    pub property_path: String,
    /// User-facing message.
    pub message: String,
    /// Optional underlying cause, never shown as the message itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl Violation {
    /// Builds a violation at the given path.
    #[must_use]
    pub fn new(property_path: impl Into<String>, message: &str) -> Self {
        Self {
            property_path: property_path.into(),
            message: message.to_string(),
            cause: None,
        }
    }

    /// Returns a copy carrying an underlying cause.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.property_path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.property_path, self.message)
        }
    }
}

/// Appends a bracketed segment to a property path.
#[must_use]
pub fn path(parent: &str, segment: impl fmt::Display) -> String {
    format!("{parent}[{segment}]")
}
