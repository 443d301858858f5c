// catalog-sync-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Catalog Store Tests
// Description: Path safety, schema versioning, integrity, index, and paging.
// Purpose: Keep the SQLite backend behaviorally equal to the in-memory one.
// Dependencies: catalog-sync-store-sqlite, catalog-sync-core, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Integration tests for [`SqliteCatalogStore`]:
//! - Path safety checks (empty, overlong, directory)
//! - Schema version validation and upgrade path
//! - Digest and identifier integrity on load
//! - Reverse reference index ordering and enabled filtering
//! - Ordered, exclusive product paging across scan batches

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;
use std::path::PathBuf;

use catalog_sync_core::Catalog;
use catalog_sync_core::CatalogId;
use catalog_sync_core::CatalogStore;
use catalog_sync_core::DisableCause;
use catalog_sync_core::Operator;
use catalog_sync_core::OwnerCode;
use catalog_sync_core::Product;
use catalog_sync_core::ProductCondition;
use catalog_sync_core::ProductPredicate;
use catalog_sync_core::ProductQuery;
use catalog_sync_core::ProductUuid;
use catalog_sync_core::ReferenceKey;
use catalog_sync_core::SelectionCriterion;
use catalog_sync_core::StoreError;
use catalog_sync_store_sqlite::SqliteCatalogStore;
use catalog_sync_store_sqlite::SqliteStoreConfig;
use catalog_sync_store_sqlite::SqliteStoreError;
use proptest::prelude::*;
use rusqlite::Connection;
use rusqlite::params;
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn store_for(path: &Path) -> SqliteCatalogStore {
    SqliteCatalogStore::new(SqliteStoreConfig::for_path(path)).expect("store init")
}

fn catalog(option: &str) -> Catalog {
    let mut catalog = Catalog::new(CatalogId::generate(), "Store", OwnerCode::new("erp"));
    catalog.enabled = true;
    catalog.product_selection_criteria =
        vec![SelectionCriterion::new("color", Operator::In, json!([option]))];
    catalog
}

fn red() -> ReferenceKey {
    ReferenceKey::AttributeOption {
        attribute: "color".into(),
        option: "red".into(),
    }
}

fn product(seed: u128, enabled: bool) -> Product {
    let mut product = Product::new(ProductUuid::new(Uuid::from_u128(seed)), format!("sku-{seed}"));
    product.enabled = enabled;
    product
}

// ============================================================================
// SECTION: Path Safety
// ============================================================================

#[test]
fn sqlite_store_rejects_directory_path() {
    let temp = TempDir::new().unwrap();
    let Err(err) = SqliteCatalogStore::new(SqliteStoreConfig::for_path(temp.path())) else {
        panic!("expected invalid directory path to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_empty_path() {
    let Err(err) = SqliteCatalogStore::new(SqliteStoreConfig::for_path(PathBuf::new())) else {
        panic!("expected empty path to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_overlong_component() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a".repeat(300));
    let Err(err) = SqliteCatalogStore::new(SqliteStoreConfig::for_path(path)) else {
        panic!("expected overlong component to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_zero_scan_batch() {
    let temp = TempDir::new().unwrap();
    let mut config = SqliteStoreConfig::for_path(temp.path().join("store.sqlite"));
    config.scan_batch_size = 0;
    assert!(matches!(SqliteCatalogStore::new(config), Err(SqliteStoreError::Invalid(_))));
}

// ============================================================================
// SECTION: Schema Versioning
// ============================================================================

#[test]
fn sqlite_store_rejects_unknown_schema_version() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.sqlite");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE store_meta (version INTEGER NOT NULL);").unwrap();
    conn.execute("INSERT INTO store_meta (version) VALUES (?1)", params![999_i64]).unwrap();
    drop(conn);

    let Err(err) = SqliteCatalogStore::new(SqliteStoreConfig::for_path(&path)) else {
        panic!("expected schema mismatch to fail");
    };
    assert!(matches!(err, SqliteStoreError::VersionMismatch(_)));
}

#[test]
fn sqlite_store_upgrades_schema_from_v1() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.sqlite");
    {
        let store = store_for(&path);
        store.create(&catalog("red")).unwrap();
    }
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("DROP TABLE products; UPDATE store_meta SET version = 1;").unwrap();
    drop(conn);

    let store = store_for(&path);
    store.upsert_product(&product(1, true)).unwrap();
    assert_eq!(store.find_enabled_referencing(&red()).unwrap().len(), 1);
    let conn = Connection::open(&path).unwrap();
    let version: i64 =
        conn.query_row("SELECT version FROM store_meta", [], |row| row.get(0)).unwrap();
    assert_eq!(version, 2);
}

#[test]
fn sqlite_store_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("store.sqlite");
    let original = catalog("red");
    store_for(&path).create(&original).unwrap();
    let loaded = store_for(&path).get(&original.id).unwrap();
    assert_eq!(loaded, Some(original));
}

// ============================================================================
// SECTION: Integrity
// ============================================================================

#[test]
fn sqlite_store_detects_hash_mismatch() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.sqlite");
    let store = store_for(&path);
    let stored = catalog("red");
    store.create(&stored).unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE catalogs SET catalog_hash = 'bad' WHERE id = ?1",
        params![stored.id.to_string()],
    )
    .unwrap();

    let err = store.get(&stored.id).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(message) if message.contains("hash mismatch")));
}

#[test]
fn sqlite_store_rejects_catalog_id_mismatch() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.sqlite");
    let store = store_for(&path);
    let first = catalog("red");
    let second = catalog("blue");
    store.create(&first).unwrap();
    store.create(&second).unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE catalogs SET catalog_json = (SELECT catalog_json FROM catalogs WHERE id = ?2), \
         catalog_hash = (SELECT catalog_hash FROM catalogs WHERE id = ?2) WHERE id = ?1",
        params![first.id.to_string(), second.id.to_string()],
    )
    .unwrap();

    let err = store.get(&first.id).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(message) if message.contains("mismatched key")));
}

// ============================================================================
// SECTION: Catalog Store
// ============================================================================

#[test]
fn create_conflicts_and_save_requires_existing() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    let stored = catalog("red");
    assert!(matches!(store.save(&stored), Err(StoreError::NotFound(_))));
    store.create(&stored).unwrap();
    assert!(matches!(store.create(&stored), Err(StoreError::Conflict(_))));
}

#[test]
fn reverse_index_returns_enabled_catalogs_in_creation_order() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    let catalogs: Vec<Catalog> = (0 .. 4).map(|_| catalog("red")).collect();
    for stored in &catalogs {
        store.create(stored).unwrap();
    }
    let changed = store
        .set_enabled(&[catalogs[2].id], false, Some(DisableCause::ReferenceDeleted))
        .unwrap();
    assert_eq!(changed, vec![catalogs[2].id]);

    assert_eq!(
        store.find_enabled_referencing(&red()).unwrap(),
        vec![catalogs[0].id, catalogs[1].id, catalogs[3].id]
    );
    let disabled = store.get(&catalogs[2].id).unwrap().unwrap();
    assert!(!disabled.enabled);
    assert_eq!(disabled.disable_cause, Some(DisableCause::ReferenceDeleted));
}

#[test]
fn save_replaces_index_rows() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    let mut stored = catalog("red");
    store.create(&stored).unwrap();
    stored.product_selection_criteria.clear();
    store.save(&stored).unwrap();
    assert!(store.find_enabled_referencing(&red()).unwrap().is_empty());
    assert!(
        store
            .find_enabled_referencing(&ReferenceKey::Attribute("color".into()))
            .unwrap()
            .is_empty()
    );
}

#[test]
fn save_keeps_the_stored_enabled_flag_and_cause() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    let mut stored = catalog("red");
    stored.enabled = true;
    store.create(&stored).unwrap();
    store.set_enabled(&[stored.id], false, Some(DisableCause::InvalidOnSync)).unwrap();

    stored.product_selection_criteria.clear();
    store.save(&stored).unwrap();

    let reloaded = store.get(&stored.id).unwrap().unwrap();
    assert!(!reloaded.enabled);
    assert_eq!(reloaded.disable_cause, Some(DisableCause::InvalidOnSync));
    assert!(reloaded.product_selection_criteria.is_empty());
}

#[test]
fn list_by_owner_is_scoped_and_ordered() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    let first = catalog("red");
    let mut foreign = catalog("red");
    foreign.owner = OwnerCode::new("other");
    let second = catalog("blue");
    for stored in [&first, &foreign, &second] {
        store.create(stored).unwrap();
    }
    let ids: Vec<CatalogId> = store
        .list_by_owner(&OwnerCode::new("erp"))
        .unwrap()
        .into_iter()
        .map(|stored| stored.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);
    store.readiness().unwrap();
}

// ============================================================================
// SECTION: Product Query
// ============================================================================

#[test]
fn product_query_filters_across_scan_batches() {
    let temp = TempDir::new().unwrap();
    let mut config = SqliteStoreConfig::for_path(temp.path().join("store.sqlite"));
    config.scan_batch_size = 2;
    let store = SqliteCatalogStore::new(config).unwrap();
    for seed in 1 ..= 9 {
        store.upsert_product(&product(seed, seed % 2 == 1)).unwrap();
    }
    let enabled = ProductPredicate::condition(ProductCondition::Enabled(true));

    let first = store.query_uuids(&enabled, None, 3).unwrap();
    let seeds: Vec<u128> = first.iter().map(|uuid| uuid.as_uuid().as_u128()).collect();
    assert_eq!(seeds, vec![1, 3, 5]);
    let rest = store.query_uuids(&enabled, first.last(), 3).unwrap();
    let seeds: Vec<u128> = rest.iter().map(|uuid| uuid.as_uuid().as_u128()).collect();
    assert_eq!(seeds, vec![7, 9]);

    assert!(store.remove_product(&ProductUuid::new(Uuid::from_u128(9))).unwrap());
    assert_eq!(store.query_uuids(&enabled, first.last(), 3).unwrap().len(), 1);
}

proptest! {
    #[test]
    fn product_query_matches_filtered_range(
        seeds in proptest::collection::btree_set(1_u128 .. 500, 0 .. 40),
        limit in 1_usize .. 10,
        batch in 1_usize .. 8,
    ) {
        let temp = TempDir::new().unwrap();
        let mut config = SqliteStoreConfig::for_path(temp.path().join("store.sqlite"));
        config.scan_batch_size = batch;
        let store = SqliteCatalogStore::new(config).unwrap();
        for seed in &seeds {
            store.upsert_product(&product(*seed, seed % 3 != 0)).unwrap();
        }
        let enabled = ProductPredicate::condition(ProductCondition::Enabled(true));
        let expected: Vec<u128> = seeds.iter().copied().filter(|seed| seed % 3 != 0).collect();

        let mut collected = Vec::new();
        let mut after: Option<ProductUuid> = None;
        loop {
            let page = store.query_uuids(&enabled, after.as_ref(), limit).unwrap();
            prop_assert!(page.len() <= limit);
            collected.extend(page.iter().map(|uuid| uuid.as_uuid().as_u128()));
            if page.len() < limit {
                break;
            }
            after = page.last().copied();
        }
        prop_assert_eq!(collected, expected);
    }
}
