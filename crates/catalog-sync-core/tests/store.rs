// catalog-sync-core/tests/store.rs
// ============================================================================
// Module: In-Memory Store Tests
// Description: Catalog store, reverse index, product query, and cache tests.
// Purpose: Pin ordering and index semantics shared with the SQLite backend.
// Dependencies: catalog-sync-core, serde_json
// ============================================================================
//! ## Overview
//! Exercises the in-memory backends directly, without the lifecycle layer.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use catalog_sync_core::Attribute;
use catalog_sync_core::AttributeCode;
use catalog_sync_core::AttributeType;
use catalog_sync_core::CachedReferenceData;
use catalog_sync_core::Catalog;
use catalog_sync_core::CatalogId;
use catalog_sync_core::CatalogLifecycle;
use catalog_sync_core::CatalogStore;
use catalog_sync_core::Category;
use catalog_sync_core::CategoryCode;
use catalog_sync_core::Channel;
use catalog_sync_core::ChannelCode;
use catalog_sync_core::DisableCause;
use catalog_sync_core::Family;
use catalog_sync_core::FamilyCode;
use catalog_sync_core::InMemoryCatalogStore;
use catalog_sync_core::InMemoryProductStore;
use catalog_sync_core::InMemoryReferenceData;
use catalog_sync_core::Locale;
use catalog_sync_core::LocaleCode;
use catalog_sync_core::Operator;
use catalog_sync_core::ProductPredicate;
use catalog_sync_core::ProductQuery;
use catalog_sync_core::ReferenceData;
use catalog_sync_core::ReferenceDeletion;
use catalog_sync_core::ReferenceError;
use catalog_sync_core::ReferenceKey;
use catalog_sync_core::SelectionCriterion;
use catalog_sync_core::SharedReferenceData;
use catalog_sync_core::StoreError;
use serde_json::json;

fn catalog_with_option(option: &str) -> Catalog {
    let mut catalog = Catalog::new(CatalogId::generate(), "C", common::owner());
    catalog.enabled = true;
    catalog.product_selection_criteria =
        vec![SelectionCriterion::new("color", Operator::In, json!([option]))];
    catalog
}

fn red_key() -> ReferenceKey {
    ReferenceKey::AttributeOption {
        attribute: "color".into(),
        option: "red".into(),
    }
}

#[test]
fn reverse_index_returns_enabled_catalogs_in_creation_order() {
    let store = InMemoryCatalogStore::new();
    let catalogs: Vec<Catalog> = (0 .. 4).map(|_| catalog_with_option("red")).collect();
    for catalog in &catalogs {
        store.create(catalog).unwrap();
    }
    store.set_enabled(&[catalogs[1].id], false, Some(DisableCause::ReferenceDeleted)).unwrap();

    let found = store.find_enabled_referencing(&red_key()).unwrap();
    assert_eq!(found, vec![catalogs[0].id, catalogs[2].id, catalogs[3].id]);
    assert_eq!(
        store.find_enabled_referencing(&ReferenceKey::Attribute("color".into())).unwrap().len(),
        3
    );
}

#[test]
fn saving_a_catalog_replaces_its_index_entries() {
    let store = InMemoryCatalogStore::new();
    let mut catalog = catalog_with_option("red");
    store.create(&catalog).unwrap();
    catalog.product_selection_criteria =
        vec![SelectionCriterion::new("color", Operator::In, json!(["blue"]))];
    store.save(&catalog).unwrap();

    assert!(store.find_enabled_referencing(&red_key()).unwrap().is_empty());
    let blue = ReferenceKey::AttributeOption {
        attribute: "color".into(),
        option: "blue".into(),
    };
    assert_eq!(store.find_enabled_referencing(&blue).unwrap(), vec![catalog.id]);
}

#[test]
fn saving_keeps_the_stored_enabled_flag_and_cause() {
    let store = InMemoryCatalogStore::new();
    let mut catalog = catalog_with_option("red");
    catalog.enabled = true;
    store.create(&catalog).unwrap();
    store.set_enabled(&[catalog.id], false, Some(DisableCause::ReferenceDeleted)).unwrap();

    catalog.product_selection_criteria.clear();
    store.save(&catalog).unwrap();

    let stored = store.get(&catalog.id).unwrap().unwrap();
    assert!(!stored.enabled);
    assert_eq!(stored.disable_cause, Some(DisableCause::ReferenceDeleted));
    assert!(stored.product_selection_criteria.is_empty());
}

#[test]
fn create_conflicts_and_save_requires_existing() {
    let store = InMemoryCatalogStore::new();
    let catalog = catalog_with_option("red");
    assert!(matches!(store.save(&catalog), Err(StoreError::NotFound(_))));
    store.create(&catalog).unwrap();
    assert!(matches!(store.create(&catalog), Err(StoreError::Conflict(_))));
}

#[test]
fn enabling_clears_the_disable_cause() {
    let store = InMemoryCatalogStore::new();
    let catalog = catalog_with_option("red");
    store.create(&catalog).unwrap();
    store.set_enabled(&[catalog.id], false, Some(DisableCause::InvalidOnSync)).unwrap();
    assert_eq!(
        store.get(&catalog.id).unwrap().unwrap().disable_cause,
        Some(DisableCause::InvalidOnSync)
    );
    assert_eq!(store.set_enabled(&[catalog.id], true, None).unwrap(), vec![catalog.id]);
    assert_eq!(store.get(&catalog.id).unwrap().unwrap().disable_cause, None);
}

#[test]
fn product_query_is_ordered_and_exclusive() {
    let products = InMemoryProductStore::with_products((1 ..= 5).rev().map(common::product));
    let all = products.query_uuids(&ProductPredicate::all(), None, 10).unwrap();
    assert_eq!(all, (1 ..= 5).map(common::product_uuid).collect::<Vec<_>>());
    let after = common::product_uuid(2);
    let tail = products.query_uuids(&ProductPredicate::all(), Some(&after), 2).unwrap();
    assert_eq!(tail, vec![common::product_uuid(3), common::product_uuid(4)]);
}

#[test]
fn category_roots_have_no_parent() {
    let reference = common::reference();
    let master = reference.category(&CategoryCode::new("master")).unwrap().unwrap();
    let men = reference.category(&CategoryCode::new("men")).unwrap().unwrap();
    assert!(master.is_root());
    assert!(!men.is_root());
    assert_eq!(
        reference.category_children(&CategoryCode::new("master")).unwrap(),
        vec![CategoryCode::new("men"), CategoryCode::new("women")]
    );
}

#[test]
fn locale_deletion_detaches_locale_from_channels() {
    let reference = common::reference();
    let changed = reference
        .apply_deletion(&ReferenceDeletion(ReferenceKey::Locale("fr_FR".into())))
        .unwrap();
    assert!(changed);
    let ecommerce = reference.channel(&ChannelCode::new("ecommerce")).unwrap().unwrap();
    assert!(!ecommerce.has_locale(&LocaleCode::new("fr_FR")));
    assert!(reference.locale(&LocaleCode::new("fr_FR")).unwrap().is_none());
}

// ============================================================================
// SECTION: Reference Cache
// ============================================================================

/// Reference source counting attribute lookups.
struct CountingReference {
    /// Backing data.
    inner: InMemoryReferenceData,
    /// Number of attribute lookups served.
    attribute_reads: AtomicUsize,
}

impl ReferenceData for CountingReference {
    fn attribute(&self, code: &AttributeCode) -> Result<Option<Attribute>, ReferenceError> {
        self.attribute_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.attribute(code)
    }

    fn channel(&self, code: &ChannelCode) -> Result<Option<Channel>, ReferenceError> {
        self.inner.channel(code)
    }

    fn channels(&self) -> Result<Vec<Channel>, ReferenceError> {
        self.inner.channels()
    }

    fn locale(&self, code: &LocaleCode) -> Result<Option<Locale>, ReferenceError> {
        self.inner.locale(code)
    }

    fn family(&self, code: &FamilyCode) -> Result<Option<Family>, ReferenceError> {
        self.inner.family(code)
    }

    fn category(&self, code: &CategoryCode) -> Result<Option<Category>, ReferenceError> {
        self.inner.category(code)
    }

    fn category_children(&self, code: &CategoryCode) -> Result<Vec<CategoryCode>, ReferenceError> {
        self.inner.category_children(code)
    }
}

fn counting() -> CachedReferenceData<CountingReference> {
    CachedReferenceData::new(
        CountingReference {
            inner: common::reference(),
            attribute_reads: AtomicUsize::new(0),
        },
        Duration::from_secs(60),
    )
}

#[test]
fn cache_serves_repeated_hits_and_never_caches_misses() {
    let cache = counting();
    let sku = AttributeCode::new("sku");
    let ghost = AttributeCode::new("ghost");
    for _ in 0 .. 3 {
        assert!(cache.attribute(&sku).unwrap().is_some());
        assert!(cache.attribute(&ghost).unwrap().is_none());
    }
    assert_eq!(cache.inner().attribute_reads.load(Ordering::SeqCst), 4);
}

#[test]
fn invalidation_drops_deleted_entries() {
    let cache = counting();
    let sku = AttributeCode::new("sku");
    assert!(cache.attribute(&sku).unwrap().is_some());

    let deletion = ReferenceDeletion(ReferenceKey::Attribute(sku.clone()));
    cache.inner().inner.apply_deletion(&deletion).unwrap();
    assert!(cache.attribute(&sku).unwrap().is_some(), "stale until invalidated");
    cache.invalidate(deletion.key());
    assert!(cache.attribute(&sku).unwrap().is_none());
}

/// Reference source that parks its first attribute lookup after reading.
struct ParkedReference {
    /// Backing data.
    inner: InMemoryReferenceData,
    /// Read signal and release handle, taken by the first lookup.
    gate: Mutex<Option<(mpsc::Sender<()>, mpsc::Receiver<()>)>>,
}

impl ReferenceData for ParkedReference {
    fn attribute(&self, code: &AttributeCode) -> Result<Option<Attribute>, ReferenceError> {
        let loaded = self.inner.attribute(code);
        let gate = self.gate.lock().unwrap().take();
        if let Some((read, release)) = gate {
            read.send(()).unwrap();
            release.recv().unwrap();
        }
        loaded
    }

    fn channel(&self, code: &ChannelCode) -> Result<Option<Channel>, ReferenceError> {
        self.inner.channel(code)
    }

    fn channels(&self) -> Result<Vec<Channel>, ReferenceError> {
        self.inner.channels()
    }

    fn locale(&self, code: &LocaleCode) -> Result<Option<Locale>, ReferenceError> {
        self.inner.locale(code)
    }

    fn family(&self, code: &FamilyCode) -> Result<Option<Family>, ReferenceError> {
        self.inner.family(code)
    }

    fn category(&self, code: &CategoryCode) -> Result<Option<Category>, ReferenceError> {
        self.inner.category(code)
    }

    fn category_children(&self, code: &CategoryCode) -> Result<Vec<CategoryCode>, ReferenceError> {
        self.inner.category_children(code)
    }
}

#[test]
fn lookup_in_flight_during_deletion_is_not_cached() {
    let data = common::reference();
    let (read_tx, read_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let cache = Arc::new(CachedReferenceData::new(
        ParkedReference {
            inner: data.clone(),
            gate: Mutex::new(Some((read_tx, release_rx))),
        },
        Duration::from_secs(60),
    ));
    let store = InMemoryCatalogStore::new();
    let catalog = catalog_with_option("red");
    store.create(&catalog).unwrap();
    let lifecycle = CatalogLifecycle::new(
        store.clone(),
        SharedReferenceData::new(cache.clone()),
        common::RecordingAudit::default(),
    );

    let reader = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || cache.attribute(&AttributeCode::new("color")).unwrap())
    };
    read_rx.recv().unwrap();
    let deletion = ReferenceDeletion(ReferenceKey::AttributeOption {
        attribute: "color".into(),
        option: "red".into(),
    });
    data.apply_deletion(&deletion).unwrap();
    cache.invalidate(deletion.key());
    release_tx.send(()).unwrap();
    let in_flight = reader.join().unwrap().unwrap();
    assert!(in_flight.options.iter().any(|option| option.as_str() == "red"));

    let cached = cache.attribute(&AttributeCode::new("color")).unwrap().unwrap();
    assert!(!cached.options.iter().any(|option| option.as_str() == "red"));
    let report = lifecycle.reconcile(&deletion).unwrap();
    assert_eq!(report.disabled, vec![catalog.id]);
    let stored = store.get(&catalog.id).unwrap().unwrap();
    assert_eq!(stored.disable_cause, Some(DisableCause::ReferenceDeleted));
}

#[test]
fn expired_entries_are_reloaded() {
    let cache = CachedReferenceData::new(common::reference(), Duration::ZERO);
    let color = AttributeCode::new("color");
    assert!(cache.attribute(&color).unwrap().is_some());
    cache
        .inner()
        .upsert_attribute(Attribute::new("color", AttributeType::SimpleSelect).with_options(["green"]))
        .unwrap();
    let reloaded = cache.attribute(&color).unwrap().unwrap();
    assert_eq!(reloaded.options.len(), 1);
}
