// catalog-sync-core/tests/selection_compiler.rs
// ============================================================================
// Module: Selection Compiler Tests
// Description: Compiles criteria and evaluates predicates against products.
// Purpose: Ensure compiled predicates select exactly the intended products.
// Dependencies: catalog-sync-core, serde_json
// ============================================================================
//! ## Overview
//! Each test compiles typed criteria and checks which fixture products the
//! predicate matches, including permission scoping and category expansion.

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

use std::collections::BTreeSet;

use catalog_sync_core::CategoryCode;
use catalog_sync_core::CompilationError;
use catalog_sync_core::CompletenessEntry;
use catalog_sync_core::FamilyCode;
use catalog_sync_core::Operator;
use catalog_sync_core::PermissionScope;
use catalog_sync_core::Product;
use catalog_sync_core::ProductPredicate;
use catalog_sync_core::ReferenceDeletion;
use catalog_sync_core::ReferenceKey;
use catalog_sync_core::SelectionCriterion;
use catalog_sync_core::compile_selection;
use catalog_sync_core::runtime::expand_descendants;
use serde_json::json;

fn compile(criteria: &[SelectionCriterion]) -> ProductPredicate {
    compile_selection(criteria, &common::reference(), &PermissionScope::unrestricted()).unwrap()
}

fn in_categories(seed: u128, categories: &[&str]) -> Product {
    let mut product = common::product(seed);
    product.categories = categories.iter().copied().map(CategoryCode::new).collect();
    product
}

#[test]
fn empty_criteria_match_every_product() {
    let predicate = compile(&[]);
    assert!(predicate.matches(&common::product(1)));
    assert!(predicate.matches(&in_categories(2, &["men"])));
}

#[test]
fn enabled_not_equal_inverts_operand() {
    let predicate = compile(&[SelectionCriterion::new("enabled", Operator::NotEqual, json!(true))]);
    let mut disabled = common::product(1);
    disabled.enabled = false;
    assert!(predicate.matches(&disabled));
    assert!(!predicate.matches(&common::product(2)));
}

#[test]
fn family_operators() {
    let mut shoes = common::product(1);
    shoes.family = Some(FamilyCode::new("shoes"));
    let orphan = common::product(2);

    let not_in = compile(&[SelectionCriterion::new("family", Operator::NotIn, json!(["shoes"]))]);
    assert!(!not_in.matches(&shoes));
    assert!(not_in.matches(&orphan));

    let empty = compile(&[SelectionCriterion::new("family", Operator::Empty, json!(null))]);
    assert!(empty.matches(&orphan));
    assert!(!empty.matches(&shoes));
}

#[test]
fn in_children_expands_descendants() {
    let predicate =
        compile(&[SelectionCriterion::new("categories", Operator::InChildren, json!(["men"]))]);
    assert!(predicate.matches(&in_categories(1, &["men_shoes"])));
    assert!(predicate.matches(&in_categories(2, &["men"])));
    assert!(!predicate.matches(&in_categories(3, &["women"])));
    assert!(!predicate.matches(&common::product(4)));
}

#[test]
fn descendant_expansion_covers_the_whole_subtree() {
    let roots: BTreeSet<CategoryCode> = [CategoryCode::new("master")].into_iter().collect();
    let expanded = expand_descendants(&common::reference(), &roots).unwrap();
    let codes: Vec<&str> = expanded.iter().map(CategoryCode::as_str).collect();
    assert_eq!(codes, vec!["master", "men", "men_shoes", "women"]);
}

#[test]
fn in_or_unclassified_accepts_unclassified_products() {
    let predicate = compile(&[SelectionCriterion::new(
        "categories",
        Operator::InOrUnclassified,
        json!(["women"]),
    )]);
    assert!(predicate.matches(&common::product(1)));
    assert!(predicate.matches(&in_categories(2, &["women"])));
    assert!(!predicate.matches(&in_categories(3, &["men"])));
}

#[test]
fn completeness_compares_per_channel_and_locale() {
    let predicate = compile(&[SelectionCriterion::new("completeness", Operator::Greater, json!(80))
        .with_context(Some("ecommerce"), Some("en_US"))]);
    let mut complete = common::product(1);
    complete.completeness.push(CompletenessEntry {
        channel: "ecommerce".into(),
        locale: "en_US".into(),
        ratio: 100,
    });
    let mut partial = common::product(2);
    partial.completeness.push(CompletenessEntry {
        channel: "ecommerce".into(),
        locale: "en_US".into(),
        ratio: 50,
    });
    assert!(predicate.matches(&complete));
    assert!(!predicate.matches(&partial));
    assert!(!predicate.matches(&common::product(3)));
}

#[test]
fn text_negations_require_a_value() {
    let predicate = compile(&[SelectionCriterion::new("sku", Operator::NotEqual, json!("A-1"))]);
    let other = common::product(1).with_value("sku", None, None, json!("B-2"));
    let same = common::product(2).with_value("sku", None, None, json!("A-1"));
    assert!(predicate.matches(&other));
    assert!(!predicate.matches(&same));
    assert!(!predicate.matches(&common::product(3)));
}

#[test]
fn localized_text_matches_only_in_its_locale() {
    let predicate = compile(&[SelectionCriterion::new("name", Operator::StartsWith, json!("Run"))
        .with_context(None, Some("en_US"))]);
    let english = common::product(1).with_value("name", None, Some("en_US"), json!("Runner"));
    let french = common::product(2).with_value("name", None, Some("fr_FR"), json!("Runner"));
    assert!(predicate.matches(&english));
    assert!(!predicate.matches(&french));
}

#[test]
fn select_in_list_matches_simple_and_multi_values() {
    let color = compile(&[SelectionCriterion::new("color", Operator::In, json!(["red"]))]);
    assert!(color.matches(&common::product(1).with_value("color", None, None, json!("red"))));
    assert!(!color.matches(&common::product(2).with_value("color", None, None, json!("blue"))));

    let tags = compile(&[SelectionCriterion::new("tags", Operator::NotIn, json!(["winter"]))]);
    let summer = common::product(3).with_value("tags", None, None, json!(["summer"]));
    let both = common::product(4).with_value("tags", None, None, json!(["summer", "winter"]));
    assert!(tags.matches(&summer));
    assert!(!tags.matches(&both));
}

#[test]
fn number_date_and_metric_comparisons() {
    let predicate = compile(&[
        SelectionCriterion::new("size_count", Operator::GreaterOrEqual, json!(3)),
        SelectionCriterion::new("release_date", Operator::Lower, json!("2024-06-01")),
        SelectionCriterion::new("weight", Operator::Lower, json!({"amount": 5, "unit": "KILOGRAM"})),
    ]);
    let matching = common::product(1)
        .with_value("size_count", None, None, json!(4))
        .with_value("release_date", None, None, json!("2024-01-15"))
        .with_value("weight", None, None, json!({"amount": "1.5", "unit": "KILOGRAM"}));
    let other_unit = common::product(2)
        .with_value("size_count", None, None, json!(4))
        .with_value("release_date", None, None, json!("2024-01-15"))
        .with_value("weight", None, None, json!({"amount": 1, "unit": "GRAM"}));
    assert!(predicate.matches(&matching));
    assert!(!predicate.matches(&other_unit));
}

#[test]
fn empty_operator_matches_missing_and_null_values() {
    let predicate = compile(&[SelectionCriterion::new("is_new", Operator::Empty, json!(null))]);
    assert!(predicate.matches(&common::product(1)));
    assert!(predicate.matches(&common::product(2).with_value("is_new", None, None, json!(null))));
    assert!(!predicate.matches(&common::product(3).with_value("is_new", None, None, json!(false))));
}

#[test]
fn permission_scope_hides_products_outside_granted_categories() {
    let scope = PermissionScope::restricted(["women"]);
    let predicate = compile_selection(&[], &common::reference(), &scope).unwrap();
    assert!(predicate.matches(&common::product(1)));
    assert!(predicate.matches(&in_categories(2, &["women", "men"])));
    assert!(!predicate.matches(&in_categories(3, &["men"])));
}

#[test]
fn deleted_option_fails_compilation() {
    let reference = common::reference();
    reference
        .apply_deletion(&ReferenceDeletion(ReferenceKey::AttributeOption {
            attribute: "color".into(),
            option: "red".into(),
        }))
        .unwrap();
    let criteria = [SelectionCriterion::new("color", Operator::In, json!(["red"]))];
    let err = compile_selection(&criteria, &reference, &PermissionScope::unrestricted())
        .expect_err("deleted option must not compile");
    let CompilationError::Invalid(violations) = err else {
        panic!("expected invalid criteria");
    };
    assert_eq!(violations[0].property_path, "[0][value]");
}

#[test]
fn deleted_attribute_fails_compilation() {
    let reference = common::reference();
    reference.apply_deletion(&ReferenceDeletion(ReferenceKey::Attribute("sku".into()))).unwrap();
    let criteria = [SelectionCriterion::new("sku", Operator::Equal, json!("A"))];
    assert!(matches!(
        compile_selection(&criteria, &reference, &PermissionScope::unrestricted()),
        Err(CompilationError::Invalid(_))
    ));
}
