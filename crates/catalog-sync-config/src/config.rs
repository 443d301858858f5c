// catalog-sync-config/src/config.rs
// ============================================================================
// Module: Catalog Sync Configuration
// Description: Configuration loading and validation for the sync service.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: catalog-sync-core, catalog-sync-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then the `CATALOG_SYNC_CONFIG`
//! environment variable, then `catalog-sync.toml` in the working directory.
//! Every section validates itself; the first failure aborts loading.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use catalog_sync_core::KNOWN_SCOPES;
use catalog_sync_core::PaginationLimits;
use catalog_sync_core::ReferenceSeed;
use catalog_sync_core::StaticPermissionProvider;
use catalog_sync_core::runtime::pagination::DEFAULT_MAX_PAGE_LIMIT;
use catalog_sync_core::runtime::pagination::DEFAULT_PAGE_LIMIT;
use catalog_sync_store_sqlite::SqliteStoreConfig;
use catalog_sync_store_sqlite::SqliteStoreMode;
use catalog_sync_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "catalog-sync.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CATALOG_SYNC_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum reference seed file size in bytes.
pub const MAX_SEED_FILE_SIZE: usize = 16 * 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of server auth tokens.
pub const MAX_AUTH_TOKENS: usize = 64;
/// Maximum length of a server auth token.
pub const MAX_AUTH_TOKEN_LENGTH: usize = 256;
/// Maximum length of an owner code.
pub(crate) const MAX_OWNER_LENGTH: usize = 100;
/// Largest accepted request body.
pub(crate) const MAX_BODY_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Largest accepted `pagination.max_limit`.
pub(crate) const MAX_PAGE_LIMIT_CEILING: usize = 10_000;
/// Largest accepted `pagination.scan_batch_size`.
pub(crate) const MAX_SCAN_BATCH_SIZE: usize = 10_000;
/// Largest accepted reference cache TTL in milliseconds.
pub(crate) const MAX_CACHE_TTL_MS: u64 = 3_600_000;
/// Default reference cache TTL in milliseconds.
pub(crate) const DEFAULT_CACHE_TTL_MS: u64 = 30_000;
/// Default bind address.
pub(crate) const DEFAULT_BIND: &str = "127.0.0.1:8080";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Catalog sync service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSyncConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Catalog and product store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Product UUID pagination configuration.
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Reference data cache configuration.
    #[serde(default)]
    pub reference_cache: ReferenceCacheConfig,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Reference data seed configuration.
    #[serde(default)]
    pub reference_data: ReferenceDataConfig,
    /// Category permission grants.
    #[serde(default)]
    pub permissions: PermissionsConfig,
}

impl CatalogSyncConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::parse(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.pagination.validate()?;
        self.reference_cache.validate()?;
        self.audit.validate()?;
        self.reference_data.validate()?;
        self.permissions.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Bearer token authentication.
    #[serde(default)]
    pub auth: ServerAuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            auth: ServerAuthConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the bind address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind)))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_body_bytes exceeds limit of {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        let addr = self.bind_addr()?;
        self.auth.validate()?;
        if !addr.ip().is_loopback() && self.auth.tokens.is_empty() {
            return Err(ConfigError::Invalid(
                "non-loopback bind disallowed without auth tokens".to_string(),
            ));
        }
        Ok(())
    }
}

/// Bearer token authentication configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerAuthConfig {
    /// Accepted tokens with their owner and scopes.
    #[serde(default)]
    pub tokens: Vec<AuthTokenConfig>,
}

impl ServerAuthConfig {
    /// Validates token entries.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.len() > MAX_AUTH_TOKENS {
            return Err(ConfigError::Invalid("too many auth tokens".to_string()));
        }
        let mut seen = BTreeSet::new();
        for entry in &self.tokens {
            entry.validate()?;
            if !seen.insert(entry.token.as_str()) {
                return Err(ConfigError::Invalid("duplicate auth token".to_string()));
            }
        }
        Ok(())
    }
}

/// One accepted bearer token.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthTokenConfig {
    /// Token value presented in the `Authorization` header.
    pub token: String,
    /// Connection code the token authenticates as.
    pub owner: String,
    /// Scopes granted to the token.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl AuthTokenConfig {
    /// Validates one token entry.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::Invalid("auth token must be non-empty".to_string()));
        }
        if self.token.len() > MAX_AUTH_TOKEN_LENGTH {
            return Err(ConfigError::Invalid("auth token too long".to_string()));
        }
        if self.token.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid("auth token must not contain whitespace".to_string()));
        }
        validate_owner("auth token owner", &self.owner)?;
        if self.scopes.is_empty() {
            return Err(ConfigError::Invalid("auth token requires at least one scope".to_string()));
        }
        for scope in &self.scopes {
            if !KNOWN_SCOPES.contains(&scope.as_str()) {
                return Err(ConfigError::Invalid(format!("unknown auth scope: {scope}")));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Catalog and product store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Returns the `SQLite` store configuration for the sqlite backend.
    #[must_use]
    pub fn sqlite_config(&self, scan_batch_size: usize) -> Option<SqliteStoreConfig> {
        match self.store_type {
            StoreType::Memory => None,
            StoreType::Sqlite => self.path.as_ref().map(|path| SqliteStoreConfig {
                path: path.clone(),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
                scan_batch_size,
            }),
        }
    }

    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory store must not set path".to_string()));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires path".to_string())
                })?;
                validate_file_path("store path", path)
            }
        }
    }
}

/// Store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Use the in-memory store.
    #[default]
    Memory,
    /// Use the `SQLite`-backed durable store.
    Sqlite,
}

// ============================================================================
// SECTION: Pagination
// ============================================================================

/// Product UUID pagination configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationConfig {
    /// Page size when `limit` is omitted.
    #[serde(default = "default_page_limit")]
    pub default_limit: usize,
    /// Largest accepted `limit`.
    #[serde(default = "default_max_page_limit")]
    pub max_limit: usize,
    /// Product rows scanned per step by the sqlite product query.
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_page_limit(),
            max_limit: default_max_page_limit(),
            scan_batch_size: default_scan_batch_size(),
        }
    }
}

impl PaginationConfig {
    /// Returns the page size bounds.
    #[must_use]
    pub const fn limits(&self) -> PaginationLimits {
        PaginationLimits {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
        }
    }

    /// Validates pagination configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_limit == 0 || self.max_limit > MAX_PAGE_LIMIT_CEILING {
            return Err(ConfigError::Invalid(format!(
                "pagination.max_limit must be between 1 and {MAX_PAGE_LIMIT_CEILING}"
            )));
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(ConfigError::Invalid(
                "pagination.default_limit must be between 1 and pagination.max_limit".to_string(),
            ));
        }
        if self.scan_batch_size == 0 || self.scan_batch_size > MAX_SCAN_BATCH_SIZE {
            return Err(ConfigError::Invalid(format!(
                "pagination.scan_batch_size must be between 1 and {MAX_SCAN_BATCH_SIZE}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Reference Cache
// ============================================================================

/// Reference data cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceCacheConfig {
    /// Wrap reference data in a TTL cache.
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Entry lifetime in milliseconds.
    #[serde(default = "default_cache_ttl_ms")]
    pub ttl_ms: u64,
}

impl Default for ReferenceCacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_ms: default_cache_ttl_ms(),
        }
    }
}

impl ReferenceCacheConfig {
    /// Returns the entry lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Validates cache configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && (self.ttl_ms == 0 || self.ttl_ms > MAX_CACHE_TTL_MS) {
            return Err(ConfigError::Invalid(format!(
                "reference_cache.ttl_ms must be between 1 and {MAX_CACHE_TTL_MS}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink type.
    #[serde(rename = "type", default)]
    pub sink: AuditSinkType,
    /// JSON lines file path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkType::File, Some(path)) => validate_file_path("audit.path", path),
            (AuditSinkType::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires audit.path".to_string()))
            }
            (_, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only allowed for the file audit sink".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }
}

/// Audit sink type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkType {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// Append-only JSON lines file.
    File,
    /// Discard events.
    None,
}

// ============================================================================
// SECTION: Reference Data
// ============================================================================

/// Reference data seed configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceDataConfig {
    /// Optional JSON seed with attributes, channels, locales, families,
    /// categories, and products.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

impl ReferenceDataConfig {
    /// Loads the configured seed document, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the seed cannot be read or parsed.
    pub fn load_seed(&self) -> Result<Option<ReferenceSeed>, ConfigError> {
        let Some(path) = &self.seed_path else {
            return Ok(None);
        };
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_SEED_FILE_SIZE {
            return Err(ConfigError::Invalid("reference seed exceeds size limit".to_string()));
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| ConfigError::Parse(format!("reference seed: {err}")))
    }

    /// Validates reference data configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.seed_path {
            validate_file_path("reference_data.seed_path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Permissions
// ============================================================================

/// Category permission grants per owner.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionsConfig {
    /// Grants; owners without a grant see every category.
    #[serde(default)]
    pub grants: Vec<PermissionGrantConfig>,
}

impl PermissionsConfig {
    /// Builds the static permission provider.
    #[must_use]
    pub fn provider(&self) -> StaticPermissionProvider {
        self.grants.iter().fold(StaticPermissionProvider::new(), |provider, grant| {
            provider.with_grant(grant.owner.as_str(), grant.categories.iter().map(String::as_str))
        })
    }

    /// Validates permission grants.
    fn validate(&self) -> Result<(), ConfigError> {
        let mut owners = BTreeSet::new();
        for grant in &self.grants {
            validate_owner("permissions owner", &grant.owner)?;
            if !owners.insert(grant.owner.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate permissions grant for owner {}",
                    grant.owner
                )));
            }
            if grant.categories.iter().any(|code| code.trim().is_empty()) {
                return Err(ConfigError::Invalid(
                    "permissions categories must be non-empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Categories one owner may see.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionGrantConfig {
    /// Owner connection code.
    pub owner: String,
    /// Granted category codes.
    #[serde(default)]
    pub categories: Vec<String>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured file path against length constraints.
fn validate_file_path(field: &str, path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates an owner connection code.
fn validate_owner(field: &str, owner: &str) -> Result<(), ConfigError> {
    if owner.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if owner.len() > MAX_OWNER_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} too long")));
    }
    Ok(())
}

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default maximum request body size in bytes.
pub(crate) const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Default `SQLite` busy timeout in milliseconds.
pub(crate) const fn default_store_busy_timeout_ms() -> u64 {
    5_000
}

/// Default page size.
pub(crate) const fn default_page_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

/// Default maximum page size.
pub(crate) const fn default_max_page_limit() -> usize {
    DEFAULT_MAX_PAGE_LIMIT
}

/// Default product scan batch size.
pub(crate) const fn default_scan_batch_size() -> usize {
    500
}

/// Reference cache enabled by default.
pub(crate) const fn default_cache_enabled() -> bool {
    true
}

/// Default reference cache TTL.
pub(crate) const fn default_cache_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn default_config_validates() {
        let mut config = CatalogSyncConfig::default();
        config.validate().unwrap();
        assert_eq!(config.pagination.limits(), PaginationLimits::default());
        assert_eq!(config.server.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn pagination_rejects_default_above_max() {
        let config = PaginationConfig {
            default_limit: 50,
            max_limit: 10,
            scan_batch_size: 1,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn disabled_cache_ignores_ttl() {
        let config = ReferenceCacheConfig {
            enabled: false,
            ttl_ms: 0,
        };
        config.validate().unwrap();
    }

    #[test]
    fn sqlite_config_carries_tuning() {
        let store = StoreConfig {
            store_type: StoreType::Sqlite,
            path: Some(PathBuf::from("data/catalogs.sqlite")),
            busy_timeout_ms: 250,
            journal_mode: SqliteStoreMode::Delete,
            sync_mode: SqliteSyncMode::Normal,
        };
        let sqlite = store.sqlite_config(42).unwrap();
        assert_eq!(sqlite.busy_timeout_ms, 250);
        assert_eq!(sqlite.scan_batch_size, 42);
        assert_eq!(sqlite.journal_mode, SqliteStoreMode::Delete);
        assert!(StoreConfig::default().sqlite_config(1).is_none());
    }
}
