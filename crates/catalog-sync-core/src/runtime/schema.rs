// catalog-sync-core/src/runtime/schema.rs
// ============================================================================
// Module: Mapping Schema Meta-Validation
// Description: Versioned meta-schemas for product mapping schemas.
// Purpose: Accept or reject catalog mapping schemas with one stable violation.
// Dependencies: jsonschema, serde_json
// ============================================================================

//! ## Overview
//! A product mapping schema names its meta-schema with `$schema`. Known
//! versions are compiled from documents bundled with the crate under JSON
//! Schema draft 2020-12. Every failure, including an unknown or missing
//! `$schema`, collapses to a single "You must provide a valid schema."
//! violation whose cause holds the underlying error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Value;

use crate::core::violation::Violation;
use crate::core::violation::messages;

// ============================================================================
// SECTION: Versions
// ============================================================================

/// Bundled meta-schema for version 0.0.1 (string targets only).
const META_SCHEMA_0_0_1: &str = include_str!("../../schemas/product/0.0.1.json");
/// Bundled meta-schema for version 0.0.2 (string, number, boolean targets).
const META_SCHEMA_0_0_2: &str = include_str!("../../schemas/product/0.0.2.json");

/// Known product mapping meta-schema versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaSchemaVersion {
    /// `0.0.1`
    V0_0_1,
    /// `0.0.2`
    V0_0_2,
}

impl MetaSchemaVersion {
    /// Every supported version, oldest first.
    pub const ALL: [Self; 2] = [Self::V0_0_1, Self::V0_0_2];

    /// Returns the `$schema` URI identifying the version.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::V0_0_1 => "https://api.akeneo.com/mapping/product/0.0.1/schema",
            Self::V0_0_2 => "https://api.akeneo.com/mapping/product/0.0.2/schema",
        }
    }

    /// Resolves a `$schema` URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|version| version.uri() == uri)
    }

    /// Returns the bundled meta-schema source.
    #[must_use]
    pub const fn source(self) -> &'static str {
        match self {
            Self::V0_0_1 => META_SCHEMA_0_0_1,
            Self::V0_0_2 => META_SCHEMA_0_0_2,
        }
    }

    /// Compiles the bundled meta-schema.
    ///
    /// # Errors
    ///
    /// Returns a description of the failure when the bundled document does
    /// not parse or compile.
    pub fn compile(self) -> Result<Validator, String> {
        let document: Value = serde_json::from_str(self.source())
            .map_err(|err| format!("meta-schema {} is not json: {err}", self.uri()))?;
        jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&document)
            .map_err(|err| format!("meta-schema {} does not compile: {err}", self.uri()))
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a product mapping schema against the meta-schema it names.
///
/// # Errors
///
/// Returns exactly one [`Violation`] when the schema is rejected.
pub fn validate_mapping_schema(schema: &Value) -> Result<MetaSchemaVersion, Violation> {
    let reject = |cause: String| Violation::new("", messages::INVALID_SCHEMA).with_cause(cause);
    let Some(uri) = schema.get("$schema").and_then(Value::as_str) else {
        return Err(reject("missing \"$schema\" meta-schema identifier".to_string()));
    };
    let Some(version) = MetaSchemaVersion::from_uri(uri) else {
        return Err(reject(format!("unsupported meta-schema: {uri}")));
    };
    let validator = version.compile().map_err(reject)?;
    validator.validate(schema).map_err(|err| reject(err.to_string()))?;
    Ok(version)
}
