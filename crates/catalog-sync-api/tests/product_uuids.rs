// catalog-sync-api/tests/product_uuids.rs
// ============================================================================
// Module: Product UUID Route Tests
// Description: HTTP behavior of the product UUID sync route.
// Purpose: Check auth, scopes, pagination, links, and disabled catalogs.
// Dependencies: catalog-sync-api, axum, tower
// ============================================================================

//! Product UUID sync route tests.

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
use common::BLUE_1;
use common::ERP_TOKEN;
use common::OTHER_TOKEN;
use common::READER_TOKEN;
use common::RED_1;
use common::RED_2;
use common::TestServer;
use common::disabled_message;
use common::uuids_uri;
use serde_json::json;

#[tokio::test]
async fn missing_or_unknown_tokens_are_unauthenticated() {
    let server = TestServer::start();
    let id = server.enabled_color_catalog("red").await;

    let (status, body) = server.send("GET", &uuids_uri(&id, ""), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = server.send("GET", &uuids_uri(&id, ""), Some("wrong"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn both_read_scopes_are_required() {
    let server = TestServer::start();
    let id = server.enabled_color_catalog("red").await;

    let (status, body) = server.send("GET", &uuids_uri(&id, ""), Some(READER_TOKEN), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("read_products"));
}

#[tokio::test]
async fn foreign_unknown_and_malformed_catalogs_are_not_found() {
    let server = TestServer::start();
    let id = server.enabled_color_catalog("red").await;

    let (status, _) = server.send("GET", &uuids_uri(&id, ""), Some(OTHER_TOKEN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let unknown = "db1079b6-f397-4a6a-bae4-8658e64ad47c";
    let (status, _) = server.send("GET", &uuids_uri(unknown, ""), Some(ERP_TOKEN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.send("GET", &uuids_uri("not-a-uuid", ""), Some(ERP_TOKEN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn disabled_catalog_answers_200_with_the_disabled_message() {
    let server = TestServer::start();
    let id = server.create_catalog("Fresh").await;

    let (status, body) = server.send("GET", &uuids_uri(&id, ""), Some(ERP_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": disabled_message(&id) }));
}

#[tokio::test]
async fn limit_two_returns_exactly_the_two_matching_uuids() {
    let server = TestServer::start();
    let id = server.enabled_color_catalog("red").await;

    let (status, body) =
        server.send("GET", &uuids_uri(&id, "limit=2"), Some(ERP_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_embedded"]["items"], json!([RED_1, RED_2]));
    assert!(body["_links"].get("next").is_none());
    assert_eq!(
        body["_links"]["self"]["href"],
        json!(format!("/api/rest/v1/catalogs/{id}/product-uuids?limit=2"))
    );
}

#[tokio::test]
async fn next_links_walk_every_match_once() {
    let server = TestServer::start();
    let id = server.enabled_color_catalog("red").await;

    let (status, first) =
        server.send("GET", &uuids_uri(&id, "limit=1"), Some(ERP_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["_embedded"]["items"], json!([RED_1]));
    let next = first["_links"]["next"]["href"].as_str().unwrap().to_string();
    assert_eq!(first["_links"]["first"]["href"], first["_links"]["self"]["href"]);

    let (status, second) = server.send("GET", &next, Some(ERP_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["_embedded"]["items"], json!([RED_2]));
    assert_eq!(second["_links"]["self"]["href"], json!(next));
    assert_eq!(second["_links"]["first"]["href"], first["_links"]["self"]["href"]);
    assert!(second["_links"].get("next").is_none());
}

#[tokio::test]
async fn default_limit_applies_when_omitted() {
    let server = TestServer::start();
    let id = server.enabled_color_catalog("blue").await;

    let (status, body) = server.send("GET", &uuids_uri(&id, ""), Some(ERP_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_embedded"]["items"], json!([BLUE_1]));
    assert_eq!(
        body["_links"]["first"]["href"],
        json!(format!("/api/rest/v1/catalogs/{id}/product-uuids?limit=100"))
    );
}

#[tokio::test]
async fn invalid_pagination_is_422_with_field_detail() {
    let server = TestServer::start();
    let id = server.enabled_color_catalog("red").await;

    for query in ["limit=0", "limit=-1", "limit=abc", "limit=1001"] {
        let (status, body) =
            server.send("GET", &uuids_uri(&id, query), Some(ERP_TOKEN), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{query}");
        assert_eq!(body["errors"][0]["property_path"], json!("[limit]"), "{query}");
        assert!(body["_embedded"].is_null());
    }

    let (status, body) =
        server.send("GET", &uuids_uri(&id, "search_after=%21%21"), Some(ERP_TOKEN), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], json!("Validation failed."));
    assert_eq!(body["errors"][0]["property_path"], json!("[search_after]"));
}

#[tokio::test]
async fn sqlite_store_serves_seeded_products() {
    let toml = r#"
[server]
bind = "127.0.0.1:0"

[[server.auth.tokens]]
token = "erp-token"
owner = "erp_connection"
scopes = ["read_catalogs", "read_products", "write_catalogs"]

[store]
type = "sqlite"
path = '{dir}/catalogs.db'

[pagination]
scan_batch_size = 1
"#;
    let server = TestServer::start_with(toml, |_, _| {});
    let id = server.enabled_color_catalog("red").await;

    let (status, body) =
        server.send("GET", &uuids_uri(&id, "limit=5"), Some(ERP_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_embedded"]["items"], json!([RED_1, RED_2]));
    assert!(server.dir().join("catalogs.db").is_file());
}
