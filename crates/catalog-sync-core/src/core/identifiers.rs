// catalog-sync-core/src/core/identifiers.rs
// ============================================================================
// Module: Catalog Sync Identifiers
// Description: Canonical identifiers for catalogs, products, and reference data.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! Catalogs and products are identified by UUIDs; reference data (attributes,
//! options, channels, locales, families, categories, currencies, units) is
//! identified by PIM codes. Codes are opaque strings and serialize
//! transparently. Existence checks are performed against reference data at
//! validation time, never inside these wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// SECTION: UUID Identifiers
// ============================================================================

/// Catalog identifier (UUID, hyphenated lowercase string form).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(Uuid);

impl CatalogId {
    /// Wraps an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a fresh random catalog identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for CatalogId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// Product identifier (UUID). Ordering follows the canonical string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductUuid(Uuid);

impl ProductUuid {
    /// Wraps an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a fresh random product UUID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProductUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for ProductUuid {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

// ============================================================================
// SECTION: Code Identifiers
// ============================================================================

/// Declares a transparent string code identifier with the shared helpers.
macro_rules! code_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new code identifier.
            #[must_use]
            pub fn new(code: impl Into<String>) -> Self {
                Self(code.into())
            }

            /// Returns the code as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

code_identifier!(
    /// Owner of a catalog: the connection (app user) code it was created for.
    OwnerCode
);
code_identifier!(
    /// Attribute code.
    AttributeCode
);
code_identifier!(
    /// Attribute option code, unique within its attribute.
    OptionCode
);
code_identifier!(
    /// Channel (scope) code.
    ChannelCode
);
code_identifier!(
    /// Locale code such as `en_US`.
    LocaleCode
);
code_identifier!(
    /// Family code.
    FamilyCode
);
code_identifier!(
    /// Category code.
    CategoryCode
);
code_identifier!(
    /// Currency code such as `EUR`.
    CurrencyCode
);
code_identifier!(
    /// Measurement unit code such as `KILOGRAM`.
    UnitCode
);
