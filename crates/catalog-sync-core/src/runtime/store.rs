// catalog-sync-core/src/runtime/store.rs
// ============================================================================
// Module: Catalog Sync In-Memory Stores
// Description: In-memory catalog, product, reference, and permission backends.
// Purpose: Provide deterministic backends and shared trait-object wrappers.
// Dependencies: crate::core, crate::interfaces, serde
// ============================================================================

//! ## Overview
//! In-memory implementations of every collaborator interface, used by tests,
//! local demos, and the `memory` store mode of the server. The catalog store
//! maintains the same reverse reference index as the SQLite backend so that
//! reconciliation behaves identically on both.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::ops::Bound;
use std::sync::Arc;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;

use crate::core::Attribute;
use crate::core::AttributeCode;
use crate::core::Catalog;
use crate::core::CatalogId;
use crate::core::Category;
use crate::core::CategoryCode;
use crate::core::Channel;
use crate::core::ChannelCode;
use crate::core::DisableCause;
use crate::core::Family;
use crate::core::FamilyCode;
use crate::core::LifecycleEvent;
use crate::core::Locale;
use crate::core::LocaleCode;
use crate::core::OwnerCode;
use crate::core::PermissionScope;
use crate::core::Product;
use crate::core::ProductPredicate;
use crate::core::ProductUuid;
use crate::core::ReferenceDeletion;
use crate::core::ReferenceKey;
use crate::interfaces::CatalogStore;
use crate::interfaces::LifecycleAuditSink;
use crate::interfaces::PermissionProvider;
use crate::interfaces::ProductQuery;
use crate::interfaces::ReferenceData;
use crate::interfaces::ReferenceError;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Catalog Store
// ============================================================================

/// Catalog store state guarded by one mutex.
#[derive(Debug, Default)]
struct CatalogState {
    /// Catalogs with their creation sequence number.
    catalogs: BTreeMap<CatalogId, (u64, Catalog)>,
    /// Reverse index from reference to creation sequence numbers.
    index: BTreeMap<ReferenceKey, BTreeSet<u64>>,
    /// Creation sequence number to catalog identifier.
    order: BTreeMap<u64, CatalogId>,
    /// Next creation sequence number.
    next_seq: u64,
}

impl CatalogState {
    /// Replaces the index entries of a catalog.
    fn reindex(&mut self, seq: u64, previous: Option<&Catalog>, next: &Catalog) {
        if let Some(previous) = previous {
            for key in previous.references() {
                if let Some(entries) = self.index.get_mut(&key) {
                    entries.remove(&seq);
                    if entries.is_empty() {
                        self.index.remove(&key);
                    }
                }
            }
        }
        for key in next.references() {
            self.index.entry(key).or_default().insert(seq);
        }
    }
}

/// In-memory catalog store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogStore {
    /// Store state protected by a mutex.
    state: Arc<Mutex<CatalogState>>,
}

impl InMemoryCatalogStore {
    /// Creates an empty in-memory catalog store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the store state.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CatalogState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Store("catalog store mutex poisoned".to_string()))
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn create(&self, catalog: &Catalog) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.catalogs.contains_key(&catalog.id) {
            return Err(StoreError::Conflict(format!("catalog {} already exists", catalog.id)));
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.reindex(seq, None, catalog);
        state.order.insert(seq, catalog.id);
        state.catalogs.insert(catalog.id, (seq, catalog.clone()));
        Ok(())
    }

    fn get(&self, id: &CatalogId) -> Result<Option<Catalog>, StoreError> {
        Ok(self.lock()?.catalogs.get(id).map(|(_, catalog)| catalog.clone()))
    }

    fn list_by_owner(&self, owner: &OwnerCode) -> Result<Vec<Catalog>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .order
            .values()
            .filter_map(|id| state.catalogs.get(id))
            .map(|(_, catalog)| catalog)
            .filter(|catalog| &catalog.owner == owner)
            .cloned()
            .collect())
    }

    fn save(&self, catalog: &Catalog) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let Some((seq, previous)) = state.catalogs.get(&catalog.id).cloned() else {
            return Err(StoreError::NotFound(format!("catalog {} not found", catalog.id)));
        };
        let mut merged = catalog.clone();
        merged.enabled = previous.enabled;
        merged.disable_cause = previous.disable_cause;
        state.reindex(seq, Some(&previous), &merged);
        state.catalogs.insert(merged.id, (seq, merged));
        Ok(())
    }

    fn set_enabled(
        &self,
        ids: &[CatalogId],
        enabled: bool,
        cause: Option<DisableCause>,
    ) -> Result<Vec<CatalogId>, StoreError> {
        let mut state = self.lock()?;
        let mut changed = Vec::new();
        for id in ids {
            let Some((_, catalog)) = state.catalogs.get_mut(id) else {
                continue;
            };
            if catalog.enabled == enabled {
                continue;
            }
            catalog.enabled = enabled;
            catalog.disable_cause = if enabled { None } else { cause };
            changed.push(*id);
        }
        Ok(changed)
    }

    fn find_enabled_referencing(&self, key: &ReferenceKey) -> Result<Vec<CatalogId>, StoreError> {
        let state = self.lock()?;
        let Some(entries) = state.index.get(key) else {
            return Ok(Vec::new());
        };
        Ok(entries
            .iter()
            .filter_map(|seq| state.order.get(seq))
            .filter(|id| state.catalogs.get(id).is_some_and(|(_, catalog)| catalog.enabled))
            .copied()
            .collect())
    }
}

// ============================================================================
// SECTION: In-Memory Product Store
// ============================================================================

/// In-memory product store ordered by UUID.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductStore {
    /// Products keyed by UUID.
    products: Arc<Mutex<BTreeMap<ProductUuid, Product>>>,
}

impl InMemoryProductStore {
    /// Creates an empty product store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a product store holding the given products.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products.into_iter().map(|product| (product.uuid, product)).collect();
        Self {
            products: Arc::new(Mutex::new(products)),
        }
    }

    /// Inserts or replaces a product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the store lock is poisoned.
    pub fn upsert(&self, product: Product) -> Result<(), StoreError> {
        self.products
            .lock()
            .map_err(|_| StoreError::Store("product store mutex poisoned".to_string()))?
            .insert(product.uuid, product);
        Ok(())
    }

    /// Removes a product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the store lock is poisoned.
    pub fn remove(&self, uuid: &ProductUuid) -> Result<Option<Product>, StoreError> {
        Ok(self
            .products
            .lock()
            .map_err(|_| StoreError::Store("product store mutex poisoned".to_string()))?
            .remove(uuid))
    }
}

impl ProductQuery for InMemoryProductStore {
    fn query_uuids(
        &self,
        predicate: &ProductPredicate,
        after: Option<&ProductUuid>,
        limit: usize,
    ) -> Result<Vec<ProductUuid>, StoreError> {
        let guard = self
            .products
            .lock()
            .map_err(|_| StoreError::Store("product store mutex poisoned".to_string()))?;
        let lower = after.map_or(Bound::Unbounded, Bound::Excluded);
        Ok(guard
            .range((lower, Bound::Unbounded))
            .filter(|(_, product)| predicate.matches(product))
            .map(|(uuid, _)| *uuid)
            .take(limit)
            .collect())
    }
}

// ============================================================================
// SECTION: In-Memory Reference Data
// ============================================================================

/// Reference data seed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceSeed {
    /// Attributes.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Channels.
    #[serde(default)]
    pub channels: Vec<Channel>,
    /// Locales.
    #[serde(default)]
    pub locales: Vec<Locale>,
    /// Families.
    #[serde(default)]
    pub families: Vec<Family>,
    /// Categories.
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Products.
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Reference data state guarded by one mutex.
#[derive(Debug, Default)]
struct ReferenceState {
    /// Attributes by code.
    attributes: BTreeMap<AttributeCode, Attribute>,
    /// Channels by code, including soft-deleted ones.
    channels: BTreeMap<ChannelCode, Channel>,
    /// Locales by code.
    locales: BTreeMap<LocaleCode, Locale>,
    /// Families by code.
    families: BTreeMap<FamilyCode, Family>,
    /// Categories by code.
    categories: BTreeMap<CategoryCode, Category>,
}

/// Mutable in-memory PIM reference data.
#[derive(Debug, Default, Clone)]
pub struct InMemoryReferenceData {
    /// Reference state protected by a mutex.
    state: Arc<Mutex<ReferenceState>>,
}

impl InMemoryReferenceData {
    /// Creates empty reference data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates reference data from a seed document; products are ignored.
    #[must_use]
    pub fn from_seed(seed: &ReferenceSeed) -> Self {
        let state = ReferenceState {
            attributes: seed.attributes.iter().map(|item| (item.code.clone(), item.clone())).collect(),
            channels: seed.channels.iter().map(|item| (item.code.clone(), item.clone())).collect(),
            locales: seed.locales.iter().map(|item| (item.code.clone(), item.clone())).collect(),
            families: seed.families.iter().map(|item| (item.code.clone(), item.clone())).collect(),
            categories: seed.categories.iter().map(|item| (item.code.clone(), item.clone())).collect(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Locks the reference state.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ReferenceState>, ReferenceError> {
        self.state
            .lock()
            .map_err(|_| ReferenceError::Unavailable("reference data mutex poisoned".to_string()))
    }

    /// Inserts or replaces an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Unavailable`] when the lock is poisoned.
    pub fn upsert_attribute(&self, attribute: Attribute) -> Result<(), ReferenceError> {
        self.lock()?.attributes.insert(attribute.code.clone(), attribute);
        Ok(())
    }

    /// Inserts or replaces a channel.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Unavailable`] when the lock is poisoned.
    pub fn upsert_channel(&self, channel: Channel) -> Result<(), ReferenceError> {
        self.lock()?.channels.insert(channel.code.clone(), channel);
        Ok(())
    }

    /// Inserts or replaces a locale.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Unavailable`] when the lock is poisoned.
    pub fn upsert_locale(&self, locale: Locale) -> Result<(), ReferenceError> {
        self.lock()?.locales.insert(locale.code.clone(), locale);
        Ok(())
    }

    /// Inserts or replaces a family.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Unavailable`] when the lock is poisoned.
    pub fn upsert_family(&self, family: Family) -> Result<(), ReferenceError> {
        self.lock()?.families.insert(family.code.clone(), family);
        Ok(())
    }

    /// Inserts or replaces a category.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Unavailable`] when the lock is poisoned.
    pub fn upsert_category(&self, category: Category) -> Result<(), ReferenceError> {
        self.lock()?.categories.insert(category.code.clone(), category);
        Ok(())
    }

    /// Applies a reference deletion.
    ///
    /// Channels are soft-deleted; deleted locales are also removed from
    /// every channel. Returns true when anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Unavailable`] when the lock is poisoned.
    pub fn apply_deletion(&self, deletion: &ReferenceDeletion) -> Result<bool, ReferenceError> {
        let mut state = self.lock()?;
        let changed = match deletion.key() {
            ReferenceKey::Attribute(code) => state.attributes.remove(code).is_some(),
            ReferenceKey::AttributeOption {
                attribute,
                option,
            } => state
                .attributes
                .get_mut(attribute)
                .is_some_and(|attribute| attribute.options.remove(option)),
            ReferenceKey::Channel(code) => match state.channels.get_mut(code) {
                Some(channel) if !channel.deleted => {
                    channel.deleted = true;
                    true
                }
                _ => false,
            },
            ReferenceKey::Locale(code) => {
                let removed = state.locales.remove(code).is_some();
                let mut detached = false;
                for channel in state.channels.values_mut() {
                    detached |= channel.locales.remove(code);
                }
                removed || detached
            }
            ReferenceKey::Family(code) => state.families.remove(code).is_some(),
            ReferenceKey::Category(code) => state.categories.remove(code).is_some(),
        };
        Ok(changed)
    }
}

impl ReferenceData for InMemoryReferenceData {
    fn attribute(&self, code: &AttributeCode) -> Result<Option<Attribute>, ReferenceError> {
        Ok(self.lock()?.attributes.get(code).cloned())
    }

    fn channel(&self, code: &ChannelCode) -> Result<Option<Channel>, ReferenceError> {
        Ok(self.lock()?.channels.get(code).cloned())
    }

    fn channels(&self) -> Result<Vec<Channel>, ReferenceError> {
        Ok(self.lock()?.channels.values().filter(|channel| !channel.deleted).cloned().collect())
    }

    fn locale(&self, code: &LocaleCode) -> Result<Option<Locale>, ReferenceError> {
        Ok(self.lock()?.locales.get(code).cloned())
    }

    fn family(&self, code: &FamilyCode) -> Result<Option<Family>, ReferenceError> {
        Ok(self.lock()?.families.get(code).cloned())
    }

    fn category(&self, code: &CategoryCode) -> Result<Option<Category>, ReferenceError> {
        Ok(self.lock()?.categories.get(code).cloned())
    }

    fn category_children(&self, code: &CategoryCode) -> Result<Vec<CategoryCode>, ReferenceError> {
        Ok(self
            .lock()?
            .categories
            .values()
            .filter(|category| category.parent.as_ref() == Some(code))
            .map(|category| category.code.clone())
            .collect())
    }
}

// ============================================================================
// SECTION: Static Permissions
// ============================================================================

/// Permission provider backed by a fixed owner grant table.
///
/// Owners without an entry see every product.
#[derive(Debug, Default, Clone)]
pub struct StaticPermissionProvider {
    /// Granted categories per restricted owner.
    grants: BTreeMap<OwnerCode, BTreeSet<CategoryCode>>,
}

impl StaticPermissionProvider {
    /// Creates a provider granting everything to everyone.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts an owner to the given categories.
    #[must_use]
    pub fn with_grant<I, S>(mut self, owner: impl Into<OwnerCode>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CategoryCode>,
    {
        self.grants.insert(owner.into(), categories.into_iter().map(Into::into).collect());
        self
    }
}

impl PermissionProvider for StaticPermissionProvider {
    fn permission_scope(&self, owner: &OwnerCode) -> Result<PermissionScope, ReferenceError> {
        Ok(self.grants.get(owner).map_or_else(PermissionScope::unrestricted, |granted| {
            PermissionScope {
                granted_categories: Some(granted.clone()),
            }
        }))
    }
}

// ============================================================================
// SECTION: Shared Wrappers
// ============================================================================

/// Shared catalog store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedCatalogStore {
    /// Inner store implementation.
    inner: Arc<dyn CatalogStore + Send + Sync>,
}

impl SharedCatalogStore {
    /// Wraps a catalog store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl CatalogStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn CatalogStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl CatalogStore for SharedCatalogStore {
    fn create(&self, catalog: &Catalog) -> Result<(), StoreError> {
        self.inner.create(catalog)
    }

    fn get(&self, id: &CatalogId) -> Result<Option<Catalog>, StoreError> {
        self.inner.get(id)
    }

    fn list_by_owner(&self, owner: &OwnerCode) -> Result<Vec<Catalog>, StoreError> {
        self.inner.list_by_owner(owner)
    }

    fn save(&self, catalog: &Catalog) -> Result<(), StoreError> {
        self.inner.save(catalog)
    }

    fn set_enabled(
        &self,
        ids: &[CatalogId],
        enabled: bool,
        cause: Option<DisableCause>,
    ) -> Result<Vec<CatalogId>, StoreError> {
        self.inner.set_enabled(ids, enabled, cause)
    }

    fn find_enabled_referencing(&self, key: &ReferenceKey) -> Result<Vec<CatalogId>, StoreError> {
        self.inner.find_enabled_referencing(key)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.inner.readiness()
    }
}

/// Shared product query backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedProductQuery {
    /// Inner query implementation.
    inner: Arc<dyn ProductQuery + Send + Sync>,
}

impl SharedProductQuery {
    /// Wraps a product query in a shared, clonable wrapper.
    #[must_use]
    pub fn from_query(query: impl ProductQuery + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(query),
        }
    }

    /// Wraps an existing shared query.
    #[must_use]
    pub const fn new(query: Arc<dyn ProductQuery + Send + Sync>) -> Self {
        Self {
            inner: query,
        }
    }
}

impl ProductQuery for SharedProductQuery {
    fn query_uuids(
        &self,
        predicate: &ProductPredicate,
        after: Option<&ProductUuid>,
        limit: usize,
    ) -> Result<Vec<ProductUuid>, StoreError> {
        self.inner.query_uuids(predicate, after, limit)
    }
}

/// Shared reference data backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedReferenceData {
    /// Inner reference implementation.
    inner: Arc<dyn ReferenceData + Send + Sync>,
}

impl SharedReferenceData {
    /// Wraps reference data in a shared, clonable wrapper.
    #[must_use]
    pub fn from_reference(reference: impl ReferenceData + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(reference),
        }
    }

    /// Wraps existing shared reference data.
    #[must_use]
    pub const fn new(reference: Arc<dyn ReferenceData + Send + Sync>) -> Self {
        Self {
            inner: reference,
        }
    }
}

impl ReferenceData for SharedReferenceData {
    fn attribute(&self, code: &AttributeCode) -> Result<Option<Attribute>, ReferenceError> {
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

/// Shared permission provider backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedPermissionProvider {
    /// Inner provider implementation.
    inner: Arc<dyn PermissionProvider + Send + Sync>,
}

impl SharedPermissionProvider {
    /// Wraps a permission provider in a shared, clonable wrapper.
    #[must_use]
    pub fn from_provider(provider: impl PermissionProvider + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Wraps an existing shared provider.
    #[must_use]
    pub const fn new(provider: Arc<dyn PermissionProvider + Send + Sync>) -> Self {
        Self {
            inner: provider,
        }
    }
}

impl PermissionProvider for SharedPermissionProvider {
    fn permission_scope(&self, owner: &OwnerCode) -> Result<PermissionScope, ReferenceError> {
        self.inner.permission_scope(owner)
    }
}

/// Shared lifecycle audit sink backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedLifecycleAuditSink {
    /// Inner sink implementation.
    inner: Arc<dyn LifecycleAuditSink>,
}

impl SharedLifecycleAuditSink {
    /// Wraps an audit sink in a shared, clonable wrapper.
    #[must_use]
    pub fn from_sink(sink: impl LifecycleAuditSink + 'static) -> Self {
        Self {
            inner: Arc::new(sink),
        }
    }

    /// Wraps an existing shared sink.
    #[must_use]
    pub const fn new(sink: Arc<dyn LifecycleAuditSink>) -> Self {
        Self {
            inner: sink,
        }
    }
}

impl LifecycleAuditSink for SharedLifecycleAuditSink {
    fn record_lifecycle(&self, event: &LifecycleEvent) {
        self.inner.record_lifecycle(event);
    }
}
