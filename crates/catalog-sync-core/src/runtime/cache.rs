// catalog-sync-core/src/runtime/cache.rs
// ============================================================================
// Module: Reference Data Cache
// Description: TTL cache in front of a reference data source.
// Purpose: Avoid repeated reference lookups during validation bursts.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`CachedReferenceData`] memoizes positive lookups for a fixed TTL. Misses
//! are never cached, so an entity that does not exist is always re-read, and
//! a deletion notice invalidates the affected entries before reconciliation
//! re-validates catalogs. Every invalidation bumps a generation counter, and
//! a value loaded under an older generation is returned but never stored, so
//! a lookup racing a deletion cannot re-insert the deleted entity. The cache
//! is advisory: a poisoned lock falls back to the inner source.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use crate::core::Attribute;
use crate::core::AttributeCode;
use crate::core::Category;
use crate::core::CategoryCode;
use crate::core::Channel;
use crate::core::ChannelCode;
use crate::core::Family;
use crate::core::FamilyCode;
use crate::core::Locale;
use crate::core::LocaleCode;
use crate::core::ReferenceKey;
use crate::interfaces::ReferenceData;
use crate::interfaces::ReferenceError;

// ============================================================================
// SECTION: Entries
// ============================================================================

/// Cached entries keyed by code.
struct TtlMap<K, V> {
    /// Entries with their insertion instant.
    entries: BTreeMap<K, (Instant, V)>,
}

impl<K: Ord + Clone, V: Clone> TtlMap<K, V> {
    /// Creates an empty map.
    const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Returns a live entry, evicting it when expired.
    fn get(&mut self, key: &K, ttl: Duration) -> Option<V> {
        let (inserted, value) = self.entries.get(key)?;
        if inserted.elapsed() < ttl {
            return Some(value.clone());
        }
        self.entries.remove(key);
        None
    }

    /// Stores an entry.
    fn put(&mut self, key: K, value: V) {
        self.entries.insert(key, (Instant::now(), value));
    }
}

/// All cached lookups.
struct CacheState {
    /// Bumped by every invalidation.
    generation: u64,
    /// Attribute lookups.
    attributes: TtlMap<AttributeCode, Attribute>,
    /// Channel lookups.
    channels: TtlMap<ChannelCode, Channel>,
    /// Locale lookups.
    locales: TtlMap<LocaleCode, Locale>,
    /// Family lookups.
    families: TtlMap<FamilyCode, Family>,
    /// Category lookups.
    categories: TtlMap<CategoryCode, Category>,
    /// Category children lookups.
    children: TtlMap<CategoryCode, Vec<CategoryCode>>,
}

impl CacheState {
    /// Creates an empty cache.
    const fn new(generation: u64) -> Self {
        Self {
            generation,
            attributes: TtlMap::new(),
            channels: TtlMap::new(),
            locales: TtlMap::new(),
            families: TtlMap::new(),
            categories: TtlMap::new(),
            children: TtlMap::new(),
        }
    }
}

// ============================================================================
// SECTION: Cached Reference Data
// ============================================================================

/// Reference data source with a TTL cache of positive lookups.
pub struct CachedReferenceData<R> {
    /// Underlying source.
    inner: R,
    /// Entry lifetime.
    ttl: Duration,
    /// Cached entries.
    state: Mutex<CacheState>,
}

impl<R: ReferenceData> CachedReferenceData<R> {
    /// Wraps a reference source with the given TTL.
    #[must_use]
    pub const fn new(inner: R, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            state: Mutex::new(CacheState::new(0)),
        }
    }

    /// Returns the underlying source.
    #[must_use]
    pub const fn inner(&self) -> &R {
        &self.inner
    }

    /// Drops the entries a deleted reference may have affected.
    ///
    /// Locale deletions also drop every channel, since channels carry their
    /// activated locales. Category deletions drop all children lists.
    pub fn invalidate(&self, key: &ReferenceKey) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        state.generation = state.generation.wrapping_add(1);
        match key {
            ReferenceKey::Attribute(code)
            | ReferenceKey::AttributeOption {
                attribute: code,
                ..
            } => {
                state.attributes.entries.remove(code);
            }
            ReferenceKey::Channel(code) => {
                state.channels.entries.remove(code);
            }
            ReferenceKey::Locale(code) => {
                state.locales.entries.remove(code);
                state.channels.entries.clear();
            }
            ReferenceKey::Family(code) => {
                state.families.entries.remove(code);
            }
            ReferenceKey::Category(code) => {
                state.categories.entries.remove(code);
                state.children.entries.clear();
            }
        }
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            *state = CacheState::new(state.generation.wrapping_add(1));
        }
    }

    /// Reads through the cache for one entity kind.
    fn read_through<K, V>(
        &self,
        key: &K,
        select: fn(&mut CacheState) -> &mut TtlMap<K, V>,
        load: impl FnOnce() -> Result<Option<V>, ReferenceError>,
    ) -> Result<Option<V>, ReferenceError>
    where
        K: Ord + Clone,
        V: Clone,
    {
        let generation = match self.state.lock() {
            Ok(mut state) => {
                if let Some(hit) = select(&mut state).get(key, self.ttl) {
                    return Ok(Some(hit));
                }
                Some(state.generation)
            }
            Err(_) => None,
        };
        let loaded = load()?;
        if let Some(value) = &loaded
            && let Ok(mut state) = self.state.lock()
            && generation == Some(state.generation)
        {
            select(&mut state).put(key.clone(), value.clone());
        }
        Ok(loaded)
    }
}

impl<R: ReferenceData> ReferenceData for CachedReferenceData<R> {
    fn attribute(&self, code: &AttributeCode) -> Result<Option<Attribute>, ReferenceError> {
        self.read_through(code, |state| &mut state.attributes, || self.inner.attribute(code))
    }

    fn channel(&self, code: &ChannelCode) -> Result<Option<Channel>, ReferenceError> {
        self.read_through(code, |state| &mut state.channels, || self.inner.channel(code))
    }

    fn channels(&self) -> Result<Vec<Channel>, ReferenceError> {
        self.inner.channels()
    }

    fn locale(&self, code: &LocaleCode) -> Result<Option<Locale>, ReferenceError> {
        self.read_through(code, |state| &mut state.locales, || self.inner.locale(code))
    }

    fn family(&self, code: &FamilyCode) -> Result<Option<Family>, ReferenceError> {
        self.read_through(code, |state| &mut state.families, || self.inner.family(code))
    }

    fn category(&self, code: &CategoryCode) -> Result<Option<Category>, ReferenceError> {
        self.read_through(code, |state| &mut state.categories, || self.inner.category(code))
    }

    fn category_children(&self, code: &CategoryCode) -> Result<Vec<CategoryCode>, ReferenceError> {
        let cached = self.read_through(
            code,
            |state| &mut state.children,
            || self.inner.category_children(code).map(Some),
        )?;
        Ok(cached.unwrap_or_default())
    }
}
