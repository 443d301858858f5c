// catalog-sync-api/tests/audit_auth.rs
// ============================================================================
// Module: Audit and Authentication Tests
// Description: Audit log contents and the local-only authentication mode.
// Purpose: Ensure audit records omit raw tokens and cover every event type.
// Dependencies: catalog-sync-api, axum, tower
// ============================================================================

//! Audit log and authentication mode tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions use unwrap for clarity."
)]

mod common;

use axum::http::StatusCode;
use catalog_sync_api::LOCAL_OWNER;
use catalog_sync_api::auth::token_fingerprint;
use catalog_sync_core::ReferenceDeletion;
use common::ERP_TOKEN;
use common::RED_1;
use common::RED_2;
use common::TestServer;
use common::uuids_uri;
use serde_json::Value;
use serde_json::json;

/// Audit lines with the given `event` field.
fn events<'a>(lines: &'a [Value], event: &str) -> Vec<&'a Value> {
    lines.iter().filter(|line| line["event"] == json!(event)).collect()
}

#[tokio::test]
async fn request_events_carry_fingerprints_not_tokens() {
    let server = TestServer::start();
    let id = server.enabled_color_catalog("red").await;
    let (status, _) = server.send("GET", &uuids_uri(&id, ""), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let raw = std::fs::read_to_string(&server.audit_path).unwrap();
    assert!(!raw.contains(ERP_TOKEN));

    let lines = server.audit_lines();
    let requests = events(&lines, "api_request");
    let created = requests
        .iter()
        .find(|line| line["method"] == json!("POST") && line["route"] == json!("/api/rest/v1/catalogs"))
        .unwrap();
    assert_eq!(created["status"], json!(201));
    assert_eq!(created["outcome"], json!("success"));
    assert_eq!(created["owner"], json!("erp_connection"));
    assert_eq!(created["token_fingerprint"], json!(token_fingerprint(ERP_TOKEN)));

    let rejected = requests.last().unwrap();
    assert_eq!(rejected["status"], json!(401));
    assert_eq!(rejected["outcome"], json!("rejected"));
    assert!(rejected["owner"].is_null());
    assert_eq!(rejected["catalog_id"], json!(id));
}

#[tokio::test]
async fn lifecycle_and_reconciliation_events_share_the_audit_log() {
    let server = TestServer::start();
    let id = server.enabled_color_catalog("red").await;
    let deletion: ReferenceDeletion =
        serde_json::from_value(json!({ "attribute_option": { "attribute": "color", "option": "red" } }))
            .unwrap();
    server.reconcile.reconcile(deletion).await.unwrap();

    let lines = server.audit_lines();
    let kinds: Vec<&Value> = events(&lines, "catalog_lifecycle")
        .into_iter()
        .filter(|line| line["catalog_id"] == json!(id))
        .map(|line| &line["kind"])
        .collect();
    assert_eq!(
        kinds,
        vec![
            &json!("catalog_created"),
            &json!("criteria_updated"),
            &json!("catalog_enabled"),
            &json!("catalog_disabled")
        ]
    );

    let sweeps = events(&lines, "reference_reconciliation");
    assert_eq!(sweeps.len(), 1);
    assert_eq!(sweeps[0]["reference_kind"], json!("attribute_option"));
    assert_eq!(sweeps[0]["reference_code"], json!("color.red"));
    assert_eq!(sweeps[0]["reference_changed"], json!(true));
    assert_eq!(sweeps[0]["disabled"], json!([id]));
}

#[tokio::test]
async fn disabled_catalog_requests_are_audited_as_unavailable() {
    let server = TestServer::start();
    let id = server.create_catalog("Dormant").await;
    let (status, _) = server.send("GET", &uuids_uri(&id, ""), Some(ERP_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);

    let lines = server.audit_lines();
    let last = events(&lines, "api_request").pop().unwrap();
    assert_eq!(last["outcome"], json!("unavailable"));
    assert_eq!(last["status"], json!(200));
}

#[tokio::test]
async fn local_only_mode_serves_requests_without_credentials() {
    let server = TestServer::start_with("[server]\nbind = \"127.0.0.1:0\"\n", |_, _| {});

    let (status, body) =
        server.send("POST", "/api/rest/v1/catalogs", None, Some(json!({ "name": "Local" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();
    let (status, _) = server
        .send(
            "PUT",
            &format!("/api/rest/v1/catalogs/{id}/product-selection-criteria"),
            None,
            Some(json!([{ "field": "color", "operator": "IN_LIST", "value": ["red"] }])),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server
        .send("PATCH", &format!("/api/rest/v1/catalogs/{id}"), None, Some(json!({ "enabled": true })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.send("GET", &uuids_uri(&id, ""), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_embedded"]["items"], json!([RED_1, RED_2]));

    let lines = server.audit_lines();
    let last = events(&lines, "api_request").pop().unwrap();
    assert_eq!(last["owner"], json!(LOCAL_OWNER));
    assert!(last["token_fingerprint"].is_null());
}
