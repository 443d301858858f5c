// catalog-sync-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Catalog Store
// Description: Durable CatalogStore and ProductQuery backed by SQLite.
// Purpose: Persist catalogs with a reverse reference index and serve pages.
// Dependencies: catalog-sync-core, rusqlite, serde, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! [`SqliteCatalogStore`] keeps each catalog as a JSON snapshot with its
//! SHA-256 digest, plus one `catalog_references` row per reference-data key
//! the catalog depends on. Rows carry the catalog's creation sequence so
//! reverse lookups come back in creation order. Loads verify the digest and
//! the stored identifier and fail closed on mismatch.
//!
//! Products live in a separate table keyed by hyphenated UUID; text ordering
//! of that key is UUID ordering. Queries scan forward from the cursor in
//! fixed-size batches and evaluate the predicate on each decoded product.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use catalog_sync_core::Catalog;
use catalog_sync_core::CatalogId;
use catalog_sync_core::CatalogStore;
use catalog_sync_core::DisableCause;
use catalog_sync_core::OwnerCode;
use catalog_sync_core::Product;
use catalog_sync_core::ProductPredicate;
use catalog_sync_core::ProductQuery;
use catalog_sync_core::ProductUuid;
use catalog_sync_core::ReferenceKey;
use catalog_sync_core::StoreError;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 2;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default number of product rows read per scan step.
const DEFAULT_SCAN_BATCH_SIZE: usize = 500;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum catalog snapshot size accepted by the store.
pub const MAX_CATALOG_BYTES: usize = 1024 * 1024;
/// Maximum product snapshot size accepted by the store.
pub const MAX_PRODUCT_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` catalog store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
/// - `scan_batch_size` must be greater than zero.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Product rows read per scan step while filtering a page.
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: usize,
}

impl SqliteStoreConfig {
    /// Builds a configuration with default tuning for `path`.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default product scan batch size.
const fn default_scan_batch_size() -> usize {
    DEFAULT_SCAN_BATCH_SIZE
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw catalog or product payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Record already exists.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
    /// Record does not exist.
    #[error("sqlite store missing record: {0}")]
    NotFound(String),
    /// Store payload exceeded size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
            SqliteStoreError::NotFound(message) => Self::NotFound(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "payload exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

/// Maps a rusqlite error into a store error.
#[allow(clippy::needless_pass_by_value, reason = "Used directly as a map_err adapter.")]
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed catalog and product store.
///
/// # Invariants
/// - Catalog loads verify stored hashes before deserialization.
/// - Connection access is serialized through a mutex.
/// - Catalog rows and their reference rows change in one transaction.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    /// Opens an `SQLite`-backed catalog store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        if config.scan_batch_size == 0 {
            return Err(SqliteStoreError::Invalid(
                "scan_batch_size must be greater than zero".to_string(),
            ));
        }
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite connection mutex poisoned".to_string()))
    }

    /// Inserts or replaces a product snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the product cannot be encoded or
    /// written.
    pub fn upsert_product(&self, product: &Product) -> Result<(), SqliteStoreError> {
        let bytes = serde_json::to_vec(product)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        ensure_within_limit(bytes.len(), MAX_PRODUCT_BYTES)?;
        let connection = self.lock()?;
        connection
            .execute(
                "INSERT INTO products (uuid, product_json) VALUES (?1, ?2)
                 ON CONFLICT(uuid) DO UPDATE SET product_json = excluded.product_json",
                params![product.uuid.to_string(), bytes],
            )
            .map_err(db_error)?;
        Ok(())
    }

    /// Removes a product snapshot, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the delete fails.
    pub fn remove_product(&self, uuid: &ProductUuid) -> Result<bool, SqliteStoreError> {
        let connection = self.lock()?;
        let removed = connection
            .execute("DELETE FROM products WHERE uuid = ?1", params![uuid.to_string()])
            .map_err(db_error)?;
        Ok(removed > 0)
    }

    /// Loads one catalog, verifying its stored digest and identifier.
    fn load_catalog(
        connection: &Connection,
        id: &CatalogId,
    ) -> Result<Option<Catalog>, SqliteStoreError> {
        let row: Option<(Vec<u8>, String)> = connection
            .query_row(
                "SELECT catalog_json, catalog_hash FROM catalogs WHERE id = ?1",
                params![id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(db_error)?;
        row.map(|(bytes, hash)| decode_catalog(id, &bytes, &hash)).transpose()
    }

    /// Runs `apply` inside a write transaction.
    fn write<T>(
        &self,
        apply: impl FnOnce(&Transaction<'_>) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let mut connection = self.lock()?;
        let tx = connection.transaction().map_err(db_error)?;
        let result = apply(&tx)?;
        tx.commit().map_err(db_error)?;
        Ok(result)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn create(&self, catalog: &Catalog) -> Result<(), StoreError> {
        let prepared = PreparedCatalog::new(catalog)?;
        self.write(|tx| {
            let exists: Option<i64> = tx
                .query_row(
                    "SELECT seq FROM catalogs WHERE id = ?1",
                    params![catalog.id.to_string()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(db_error)?;
            if exists.is_some() {
                return Err(SqliteStoreError::Conflict(format!(
                    "catalog {} already exists",
                    catalog.id
                )));
            }
            tx.execute(
                "INSERT INTO catalogs (id, owner, enabled, catalog_json, catalog_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    catalog.id.to_string(),
                    catalog.owner.as_str(),
                    catalog.enabled,
                    prepared.bytes,
                    prepared.hash
                ],
            )
            .map_err(db_error)?;
            replace_references(tx, catalog)
        })
        .map_err(StoreError::from)
    }

    fn get(&self, id: &CatalogId) -> Result<Option<Catalog>, StoreError> {
        let connection = self.lock()?;
        Ok(Self::load_catalog(&connection, id)?)
    }

    fn list_by_owner(&self, owner: &OwnerCode) -> Result<Vec<Catalog>, StoreError> {
        let connection = self.lock()?;
        let mut stmt = connection
            .prepare("SELECT id, catalog_json, catalog_hash FROM catalogs WHERE owner = ?1 ORDER BY seq")
            .map_err(db_error)?;
        let rows = stmt
            .query_map(params![owner.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?, row.get::<_, String>(2)?))
            })
            .map_err(db_error)?;
        let mut catalogs = Vec::new();
        for row in rows {
            let (id, bytes, hash) = row.map_err(db_error)?;
            let id = parse_catalog_id(&id)?;
            catalogs.push(decode_catalog(&id, &bytes, &hash)?);
        }
        Ok(catalogs)
    }

    fn save(&self, catalog: &Catalog) -> Result<(), StoreError> {
        self.write(|tx| {
            let Some(stored) = Self::load_catalog(tx, &catalog.id)? else {
                return Err(SqliteStoreError::NotFound(format!("catalog {} not found", catalog.id)));
            };
            let mut merged = catalog.clone();
            merged.enabled = stored.enabled;
            merged.disable_cause = stored.disable_cause;
            let prepared = PreparedCatalog::new(&merged)?;
            tx.execute(
                "UPDATE catalogs SET catalog_json = ?2, catalog_hash = ?3 WHERE id = ?1",
                params![merged.id.to_string(), prepared.bytes, prepared.hash],
            )
            .map_err(db_error)?;
            replace_references(tx, &merged)
        })
        .map_err(StoreError::from)
    }

    fn set_enabled(
        &self,
        ids: &[CatalogId],
        enabled: bool,
        cause: Option<DisableCause>,
    ) -> Result<Vec<CatalogId>, StoreError> {
        self.write(|tx| {
            let mut changed = Vec::new();
            for id in ids {
                let Some(mut catalog) = Self::load_catalog(tx, id)? else {
                    continue;
                };
                if catalog.enabled == enabled {
                    continue;
                }
                catalog.enabled = enabled;
                catalog.disable_cause = if enabled { None } else { cause };
                let prepared = PreparedCatalog::new(&catalog)?;
                tx.execute(
                    "UPDATE catalogs SET enabled = ?2, catalog_json = ?3, catalog_hash = ?4 WHERE \
                     id = ?1",
                    params![id.to_string(), enabled, prepared.bytes, prepared.hash],
                )
                .map_err(db_error)?;
                changed.push(*id);
            }
            Ok(changed)
        })
        .map_err(StoreError::from)
    }

    fn find_enabled_referencing(&self, key: &ReferenceKey) -> Result<Vec<CatalogId>, StoreError> {
        let connection = self.lock()?;
        let mut stmt = connection
            .prepare(
                "SELECT c.id FROM catalog_references r
                 JOIN catalogs c ON c.id = r.catalog_id
                 WHERE r.kind = ?1 AND r.code = ?2 AND c.enabled = 1
                 ORDER BY c.seq",
            )
            .map_err(db_error)?;
        let rows = stmt
            .query_map(params![key.kind(), key.code()], |row| row.get::<_, String>(0))
            .map_err(db_error)?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(parse_catalog_id(&row.map_err(db_error)?)?);
        }
        Ok(ids)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        let connection = self.lock()?;
        connection.execute_batch("SELECT 1").map_err(db_error)?;
        Ok(())
    }
}

impl ProductQuery for SqliteCatalogStore {
    fn query_uuids(
        &self,
        predicate: &ProductPredicate,
        after: Option<&ProductUuid>,
        limit: usize,
    ) -> Result<Vec<ProductUuid>, StoreError> {
        let connection = self.lock()?;
        let batch = i64::try_from(self.config.scan_batch_size)
            .map_err(|_| SqliteStoreError::Invalid("scan_batch_size too large".to_string()))?;
        let mut stmt = connection
            .prepare(
                "SELECT uuid, product_json FROM products WHERE uuid > ?1 ORDER BY uuid LIMIT ?2",
            )
            .map_err(db_error)?;
        let mut cursor = after.map(ToString::to_string).unwrap_or_default();
        let mut matched = Vec::new();
        while matched.len() < limit {
            let rows = stmt
                .query_map(params![cursor, batch], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
                })
                .map_err(db_error)?;
            let mut scanned = 0_usize;
            for row in rows {
                let (uuid, bytes) = row.map_err(db_error)?;
                scanned += 1;
                let product: Product = serde_json::from_slice(&bytes).map_err(|err| {
                    SqliteStoreError::Corrupt(format!("product {uuid} failed to decode: {err}"))
                })?;
                if product.uuid.to_string() != uuid {
                    return Err(SqliteStoreError::Corrupt(format!(
                        "product {uuid} stored under mismatched key"
                    ))
                    .into());
                }
                if matched.len() < limit && predicate.matches(&product) {
                    matched.push(product.uuid);
                }
                cursor = uuid;
            }
            if scanned < self.config.scan_batch_size {
                break;
            }
        }
        Ok(matched)
    }
}

// ============================================================================
// SECTION: Catalog Encoding
// ============================================================================

/// Serialized catalog snapshot ready to write.
struct PreparedCatalog {
    /// JSON bytes.
    bytes: Vec<u8>,
    /// Hex SHA-256 digest of `bytes`.
    hash: String,
}

impl PreparedCatalog {
    /// Encodes a catalog and enforces the size limit.
    fn new(catalog: &Catalog) -> Result<Self, SqliteStoreError> {
        let bytes = serde_json::to_vec(catalog)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        ensure_within_limit(bytes.len(), MAX_CATALOG_BYTES)?;
        let hash = digest_hex(&bytes);
        Ok(Self {
            bytes,
            hash,
        })
    }
}

/// Returns the lowercase hex SHA-256 digest of `bytes`.
fn digest_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Decodes a stored catalog after integrity checks.
fn decode_catalog(id: &CatalogId, bytes: &[u8], hash: &str) -> Result<Catalog, SqliteStoreError> {
    ensure_within_limit(bytes.len(), MAX_CATALOG_BYTES)?;
    if digest_hex(bytes) != hash {
        return Err(SqliteStoreError::Corrupt(format!("catalog {id} hash mismatch")));
    }
    let catalog: Catalog = serde_json::from_slice(bytes)
        .map_err(|err| SqliteStoreError::Corrupt(format!("catalog {id} failed to decode: {err}")))?;
    if &catalog.id != id {
        return Err(SqliteStoreError::Corrupt(format!("catalog {id} stored under mismatched key")));
    }
    Ok(catalog)
}

/// Parses a stored catalog identifier.
fn parse_catalog_id(value: &str) -> Result<CatalogId, SqliteStoreError> {
    value
        .parse()
        .map_err(|_| SqliteStoreError::Corrupt(format!("invalid stored catalog id: {value}")))
}

/// Rejects payloads above `max_bytes`.
const fn ensure_within_limit(actual_bytes: usize, max_bytes: usize) -> Result<(), SqliteStoreError> {
    if actual_bytes > max_bytes {
        return Err(SqliteStoreError::TooLarge {
            max_bytes,
            actual_bytes,
        });
    }
    Ok(())
}

/// Rewrites the reverse reference rows of a catalog.
fn replace_references(tx: &Transaction<'_>, catalog: &Catalog) -> Result<(), SqliteStoreError> {
    let id = catalog.id.to_string();
    tx.execute("DELETE FROM catalog_references WHERE catalog_id = ?1", params![id])
        .map_err(db_error)?;
    let mut insert = tx
        .prepare("INSERT INTO catalog_references (kind, code, catalog_id) VALUES (?1, ?2, ?3)")
        .map_err(db_error)?;
    for key in catalog.references() {
        insert.execute(params![key.kind(), key.code(), id]).map_err(db_error)?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(db_error)?;
    Ok(())
}

/// Product table, added in schema version 2.
const PRODUCTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS products (
    uuid TEXT PRIMARY KEY NOT NULL,
    product_json BLOB NOT NULL
);";

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS catalogs (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    id TEXT NOT NULL UNIQUE,
                    owner TEXT NOT NULL,
                    enabled INTEGER NOT NULL,
                    catalog_json BLOB NOT NULL,
                    catalog_hash TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_catalogs_owner ON catalogs (owner, seq);
                CREATE TABLE IF NOT EXISTS catalog_references (
                    kind TEXT NOT NULL,
                    code TEXT NOT NULL,
                    catalog_id TEXT NOT NULL,
                    PRIMARY KEY (kind, code, catalog_id),
                    FOREIGN KEY (catalog_id) REFERENCES catalogs(id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_catalog_references_catalog
                    ON catalog_references (catalog_id);",
            )
            .map_err(db_error)?;
            tx.execute_batch(PRODUCTS_TABLE).map_err(db_error)?;
        }
        Some(1) => {
            tx.execute_batch(PRODUCTS_TABLE).map_err(db_error)?;
            tx.execute("UPDATE store_meta SET version = ?1", params![SCHEMA_VERSION])
                .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_large_maps_to_invalid_store_error() {
        let error: StoreError = SqliteStoreError::TooLarge {
            max_bytes: 1,
            actual_bytes: 2,
        }
        .into();
        assert!(matches!(error, StoreError::Invalid(message) if message.contains("2 bytes")));
    }

    #[test]
    fn digest_is_lowercase_hex() {
        let digest = digest_hex(b"catalog");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_digit() || ('a' ..= 'f').contains(&c)));
    }
}
