// catalog-sync-core/tests/common/mod.rs
// ============================================================================
// Module: Shared Test Fixtures
// Description: Reference data, products, and runtime builders for core tests.
// Purpose: Keep fixture catalogs consistent across integration tests.
// Dependencies: catalog-sync-core, serde_json
// ============================================================================
//! ## Overview
//! A small PIM: two channels, three locales (one disabled), a category tree
//! rooted at `master`, and one attribute per supported type.

#![allow(dead_code, reason = "Fixtures are shared by several test binaries.")]

use std::sync::Arc;
use std::sync::Mutex;

use catalog_sync_core::Attribute;
use catalog_sync_core::AttributeType;
use catalog_sync_core::CatalogLifecycle;
use catalog_sync_core::Category;
use catalog_sync_core::CategoryCode;
use catalog_sync_core::Channel;
use catalog_sync_core::Family;
use catalog_sync_core::FamilyCode;
use catalog_sync_core::InMemoryCatalogStore;
use catalog_sync_core::InMemoryReferenceData;
use catalog_sync_core::LifecycleAuditSink;
use catalog_sync_core::LifecycleEvent;
use catalog_sync_core::LifecycleEventKind;
use catalog_sync_core::Locale;
use catalog_sync_core::LocaleCode;
use catalog_sync_core::OwnerCode;
use catalog_sync_core::Product;
use catalog_sync_core::ProductUuid;
use serde_json::Value;
use serde_json::json;
use uuid::Uuid;

/// Owner used by most tests.
pub const OWNER: &str = "erp_connection";

/// Returns the default owner code.
pub fn owner() -> OwnerCode {
    OwnerCode::new(OWNER)
}

/// Builds the fixture reference data.
pub fn reference() -> InMemoryReferenceData {
    let reference = InMemoryReferenceData::new();
    let attributes = [
        Attribute::new("sku", AttributeType::Identifier),
        Attribute::new("name", AttributeType::Text).with_flags(false, true),
        Attribute::new("description", AttributeType::Textarea).with_flags(true, true),
        Attribute::new("size_count", AttributeType::Number),
        Attribute::new("is_new", AttributeType::Boolean),
        Attribute::new("release_date", AttributeType::Date),
        Attribute::new("color", AttributeType::SimpleSelect).with_options(["red", "blue"]),
        Attribute::new("tags", AttributeType::MultiSelect).with_options(["summer", "winter"]),
        Attribute::new("weight", AttributeType::Metric).with_units(["KILOGRAM", "GRAM"]),
        Attribute::new("price", AttributeType::PriceCollection),
        Attribute::new("picture", AttributeType::Image),
    ];
    for attribute in attributes {
        reference.upsert_attribute(attribute).unwrap();
    }
    reference
        .upsert_channel(
            Channel::new("ecommerce", ["en_US", "fr_FR"]).with_currencies(["EUR", "USD"]),
        )
        .unwrap();
    reference.upsert_channel(Channel::new("mobile", ["en_US"]).with_currencies(["USD"])).unwrap();
    for (code, enabled) in [("en_US", true), ("fr_FR", true), ("de_DE", false)] {
        reference
            .upsert_locale(Locale {
                code: LocaleCode::new(code),
                enabled,
            })
            .unwrap();
    }
    for code in ["shoes", "shirts"] {
        reference
            .upsert_family(Family {
                code: FamilyCode::new(code),
            })
            .unwrap();
    }
    for (code, parent) in [
        ("master", None),
        ("men", Some("master")),
        ("men_shoes", Some("men")),
        ("women", Some("master")),
    ] {
        reference
            .upsert_category(Category {
                code: CategoryCode::new(code),
                parent: parent.map(CategoryCode::new),
            })
            .unwrap();
    }
    reference
}

/// Returns a deterministic product UUID.
pub fn product_uuid(seed: u128) -> ProductUuid {
    ProductUuid::new(Uuid::from_u128(seed))
}

/// Builds a product with a deterministic UUID.
pub fn product(seed: u128) -> Product {
    Product::new(product_uuid(seed), format!("product_{seed}"))
}

/// Version 0.0.2 mapping schema with a few typed targets.
pub fn mapping_schema() -> Value {
    json!({
        "$id": "https://example.com/product",
        "$schema": "https://api.akeneo.com/mapping/product/0.0.2/schema",
        "$comment": "fixture",
        "title": "Product Mapping",
        "description": "JSON Schema describing the structure of products expected by the app",
        "type": "object",
        "properties": {
            "uuid": { "type": "string" },
            "title": { "type": "string" },
            "body": { "type": "string", "description": "Long text" },
            "color": { "type": "string" },
            "weight": { "type": "number" },
            "released_at": { "type": "string", "format": "date-time" },
            "is_new": { "type": "boolean" }
        }
    })
}

/// Mapping accepted by [`mapping_schema`].
pub fn valid_mapping() -> Value {
    json!({
        "uuid": null,
        "title": { "source": "name", "scope": null, "locale": "en_US" },
        "body": { "source": "description", "scope": "ecommerce", "locale": "fr_FR" },
        "color": {
            "source": "color",
            "scope": null,
            "locale": null,
            "parameters": { "label_locale": "en_US" }
        },
        "weight": {
            "source": "weight",
            "scope": null,
            "locale": null,
            "parameters": { "unit": "KILOGRAM" }
        },
        "released_at": { "source": "release_date", "scope": null, "locale": null },
        "is_new": { "source": "is_new", "scope": null, "locale": null }
    })
}

/// Audit sink collecting events in memory.
#[derive(Clone, Default)]
pub struct RecordingAudit {
    /// Recorded events.
    pub events: Arc<Mutex<Vec<LifecycleEvent>>>,
}

impl RecordingAudit {
    /// Returns the kinds recorded so far.
    pub fn kinds(&self) -> Vec<LifecycleEventKind> {
        self.events.lock().unwrap().iter().map(|event| event.kind).collect()
    }
}

impl LifecycleAuditSink for RecordingAudit {
    fn record_lifecycle(&self, event: &LifecycleEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Lifecycle over clonable in-memory backends.
pub type TestLifecycle = CatalogLifecycle<InMemoryCatalogStore, InMemoryReferenceData, RecordingAudit>;

/// Builds a lifecycle plus handles on its backends.
pub fn lifecycle() -> (TestLifecycle, InMemoryCatalogStore, InMemoryReferenceData, RecordingAudit) {
    let store = InMemoryCatalogStore::new();
    let reference = reference();
    let audit = RecordingAudit::default();
    let lifecycle = CatalogLifecycle::new(store.clone(), reference.clone(), audit.clone());
    (lifecycle, store, reference, audit)
}
