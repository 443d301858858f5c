// catalog-sync-core/src/core/mod.rs
// ============================================================================
// Module: Catalog Sync Core Types
// Description: Canonical catalog, criterion, mapping, and reference types.
// Purpose: Provide stable, serializable types shared by every surface.
// Dependencies: serde, serde_json, uuid
// ============================================================================

//! ## Overview
//! Core types are the canonical source of truth for the HTTP API, the
//! `SQLite` store, and the CLI. They carry no behavior beyond pure
//! derivations (reference collection, target extraction).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod catalog;
pub mod criterion;
pub mod identifiers;
pub mod mapping;
pub mod predicate;
pub mod product;
pub mod reference;
pub mod violation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::LifecycleEvent;
pub use audit::LifecycleEventKind;
pub use catalog::Catalog;
pub use catalog::DisableCause;
pub use catalog::NewCatalog;
pub use catalog::disabled_catalog_message;
pub use criterion::CriterionField;
pub use criterion::Operator;
pub use criterion::ReferenceDeletion;
pub use criterion::ReferenceKey;
pub use criterion::ReservedField;
pub use criterion::SelectionCriterion;
pub use identifiers::AttributeCode;
pub use identifiers::CatalogId;
pub use identifiers::CategoryCode;
pub use identifiers::ChannelCode;
pub use identifiers::CurrencyCode;
pub use identifiers::FamilyCode;
pub use identifiers::LocaleCode;
pub use identifiers::OptionCode;
pub use identifiers::OwnerCode;
pub use identifiers::ProductUuid;
pub use identifiers::UnitCode;
pub use mapping::AttributeSource;
pub use mapping::ProductMapping;
pub use mapping::SourceKind;
pub use mapping::SourceParameter;
pub use mapping::SourceParameters;
pub use mapping::SourceRules;
pub use mapping::TargetProperty;
pub use mapping::TargetType;
pub use predicate::Comparison;
pub use predicate::PermissionScope;
pub use predicate::ProductCondition;
pub use predicate::ProductPredicate;
pub use predicate::ValueTest;
pub use product::CompletenessEntry;
pub use product::Product;
pub use product::ProductValue;
pub use reference::Attribute;
pub use reference::AttributeType;
pub use reference::Category;
pub use reference::Channel;
pub use reference::Family;
pub use reference::Locale;
pub use violation::Violation;
