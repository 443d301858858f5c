// catalog-sync-api/tests/common/mod.rs
// ============================================================================
// Module: API Test Harness
// Description: Builds a configured server router and drives it in-process.
// Purpose: Exercise HTTP routes through `tower::ServiceExt::oneshot`.
// Dependencies: catalog-sync-api, catalog-sync-config, axum, tower
// ============================================================================

//! ## Overview
//! Each test gets a temp directory holding the reference seed and the audit
//! log, a validated config with three bearer tokens, and a router whose
//! reconciliation worker runs on the test runtime.

#![allow(dead_code, reason = "Not every test binary uses every helper.")]

use std::path::Path;
use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use catalog_sync_api::CatalogSyncServer;
use catalog_sync_api::ReconcileHandle;
use catalog_sync_config::CatalogSyncConfig;
use http_body_util::BodyExt;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

/// Token with every scope for `erp_connection`.
pub const ERP_TOKEN: &str = "erp-token";
/// Token holding only `read_catalogs` for `erp_connection`.
pub const READER_TOKEN: &str = "reader-token";
/// Token with every scope for `other_connection`.
pub const OTHER_TOKEN: &str = "other-token";

/// Product selected by the `red` criterion.
pub const RED_1: &str = "00000000-0000-0000-0000-000000000001";
/// Second product selected by the `red` criterion.
pub const RED_2: &str = "00000000-0000-0000-0000-000000000002";
/// Product selected by the `blue` criterion.
pub const BLUE_1: &str = "00000000-0000-0000-0000-000000000003";

/// Config shared by most tests; paths are appended per test.
const BASE_TOML: &str = r#"
[server]
bind = "127.0.0.1:0"

[[server.auth.tokens]]
token = "erp-token"
owner = "erp_connection"
scopes = ["read_catalogs", "read_products", "write_catalogs", "manage_reference_data"]

[[server.auth.tokens]]
token = "reader-token"
owner = "erp_connection"
scopes = ["read_catalogs"]

[[server.auth.tokens]]
token = "other-token"
owner = "other_connection"
scopes = ["read_catalogs", "read_products", "write_catalogs", "manage_reference_data"]
"#;

/// Reference seed: one select attribute, one text attribute, three products.
pub fn seed() -> Value {
    json!({
        "attributes": [
            { "code": "color", "type": "pim_catalog_simpleselect", "options": ["red", "blue"] },
            { "code": "name", "type": "pim_catalog_text", "localizable": true }
        ],
        "channels": [
            { "code": "ecommerce", "locales": ["en_US"], "currencies": ["USD"] }
        ],
        "locales": [
            { "code": "en_US", "enabled": true }
        ],
        "products": [
            {
                "uuid": RED_1,
                "identifier": "red_1",
                "values": { "color": [{ "scope": null, "locale": null, "data": "red" }] }
            },
            {
                "uuid": BLUE_1,
                "identifier": "blue_1",
                "values": { "color": [{ "scope": null, "locale": null, "data": "blue" }] }
            },
            {
                "uuid": RED_2,
                "identifier": "red_2",
                "values": { "color": [{ "scope": null, "locale": null, "data": "red" }] }
            }
        ]
    })
}

/// Running in-process server.
pub struct TestServer {
    /// Router under test.
    pub app: Router,
    /// Reconciliation queue handle.
    pub reconcile: ReconcileHandle,
    /// Audit log path.
    pub audit_path: PathBuf,
    /// Temp directory holding the seed, audit log and store files.
    dir: TempDir,
}

impl TestServer {
    /// Starts a server with the base config.
    pub fn start() -> Self {
        Self::start_with(BASE_TOML, |_, _| {})
    }

    /// Starts a server from TOML, letting the test adjust the parsed config.
    ///
    /// `{dir}` in the TOML is replaced by the server's temp directory before
    /// parsing, so paths that validation requires can point inside it.
    pub fn start_with(toml: &str, configure: impl FnOnce(&mut CatalogSyncConfig, &Path)) -> Self {
        let dir = TempDir::new().unwrap();
        let seed_path = dir.path().join("seed.json");
        std::fs::write(&seed_path, seed().to_string()).unwrap();
        let audit_path = dir.path().join("audit.jsonl");
        let toml = toml.replace("{dir}", &dir.path().to_string_lossy());
        let mut config = CatalogSyncConfig::parse(&toml).unwrap();
        config.reference_data.seed_path = Some(seed_path);
        config.audit.sink = catalog_sync_config::AuditSinkType::File;
        config.audit.path = Some(audit_path.clone());
        configure(&mut config, dir.path());
        let server = CatalogSyncServer::from_config(config).unwrap();
        let (app, reconcile) = server.into_router();
        Self {
            app,
            reconcile,
            audit_path,
            dir,
        }
    }

    /// Returns the server's temp directory.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Sends one request and decodes the response; non-JSON bodies become a
    /// JSON string.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    /// Creates a catalog as `erp_connection` and returns its id.
    pub async fn create_catalog(&self, name: &str) -> String {
        let (status, body) = self
            .send("POST", "/api/rest/v1/catalogs", Some(ERP_TOKEN), Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    /// Creates an enabled catalog selecting one color.
    pub async fn enabled_color_catalog(&self, color: &str) -> String {
        let id = self.create_catalog(color).await;
        let (status, _) = self
            .send(
                "PUT",
                &format!("/api/rest/v1/catalogs/{id}/product-selection-criteria"),
                Some(ERP_TOKEN),
                Some(json!([{ "field": "color", "operator": "IN_LIST", "value": [color] }])),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = self
            .send(
                "PATCH",
                &format!("/api/rest/v1/catalogs/{id}"),
                Some(ERP_TOKEN),
                Some(json!({ "enabled": true })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enabled"], json!(true));
        id
    }

    /// Reads the audit log as JSON lines.
    pub fn audit_lines(&self) -> Vec<Value> {
        std::fs::read_to_string(&self.audit_path)
            .unwrap_or_default()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

/// Product UUID route for a catalog.
pub fn uuids_uri(id: &str, query: &str) -> String {
    if query.is_empty() {
        format!("/api/rest/v1/catalogs/{id}/product-uuids")
    } else {
        format!("/api/rest/v1/catalogs/{id}/product-uuids?{query}")
    }
}

/// Message served for a disabled catalog.
pub fn disabled_message(id: &str) -> String {
    format!(
        "No products to synchronize. The catalog {id} has been disabled on the PIM side. Note \
         that you can get catalogs status with the GET /api/rest/v1/catalogs endpoint."
    )
}
