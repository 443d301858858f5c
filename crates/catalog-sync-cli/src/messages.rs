// catalog-sync-cli/src/messages.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Keyed message templates for every line the CLI prints.
// Purpose: Keep user-facing output consistent across commands.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! Every line the `catalog-sync` binary prints is looked up here by key and
//! formatted through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is built once and read-only thereafter.
//! - Missing keys fall back to the key itself.
//! - Placeholders are substituted in argument order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A named argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name used in templates (e.g., `"path"`).
    pub key: &'static str,
    /// Value substituted for the placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`].
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries.
const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "catalog-sync {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("input.read_failed", "Failed to read {kind} at {path}: {error}"),
    ("input.parse_failed", "Failed to parse {kind} JSON at {path}: {error}"),
    ("input.kind.seed", "reference seed"),
    ("input.kind.schema", "mapping schema"),
    ("input.kind.mapping", "mapping"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    (
        "config.validate.seed",
        "Reference seed: {attributes} attributes, {channels} channels, {locales} locales, \
         {products} products.",
    ),
    ("config.validate.local_only", "No bearer tokens configured; the server will run local-only."),
    ("serve.config.load_failed", "Failed to load config: {error}"),
    ("serve.init_failed", "Failed to initialize catalog sync server: {error}"),
    ("serve.failed", "Catalog sync server failed: {error}"),
    ("mapping.check.ok", "Mapping valid ({targets} targets, {mapped} mapped)."),
    ("mapping.check.invalid", "Mapping invalid: {count} violation(s)."),
    ("mapping.check.violation", "{path}: {message}"),
    ("mapping.check.violation_cause", "{path}: {message} ({cause})"),
    ("mapping.check.reference_failed", "Reference data lookup failed: {error}"),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Formats the template for `key`, substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

/// Returns the static catalog.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::messages::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::messages::translate($key, args)
    }};
}

// ============================================================================
// SECTION: Tests
// ============================================================================
