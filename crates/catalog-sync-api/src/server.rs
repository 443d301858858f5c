// catalog-sync-api/src/server.rs
// ============================================================================
// Module: Catalog Sync HTTP Server
// Description: REST routes for catalogs, product UUID sync, and deletions.
// Purpose: Map HTTP requests onto the catalog lifecycle and sync handler.
// Dependencies: catalog-sync-{config, core, store-sqlite}, axum, tokio
// ============================================================================

//! ## Overview
//! The server authenticates every request, checks route scopes, runs the
//! synchronous store work through [`run_blocking`], and maps results onto
//! HTTP. Errors carry `{"error": "..."}` bodies; validation failures carry
//! `{"message", "errors": [{"property_path", "message"}]}`. A disabled catalog
//! answers the sync route with a 200 and an `error` body. Every request is
//! audited once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use catalog_sync_config::AuditConfig;
use catalog_sync_config::AuditSinkType;
use catalog_sync_config::CatalogSyncConfig;
use catalog_sync_config::StoreType;
use catalog_sync_core::Catalog;
use catalog_sync_core::CatalogId;
use catalog_sync_core::CatalogLifecycle;
use catalog_sync_core::InMemoryCatalogStore;
use catalog_sync_core::InMemoryProductStore;
use catalog_sync_core::InMemoryReferenceData;
use catalog_sync_core::LifecycleAuditSink;
use catalog_sync_core::LifecycleError;
use catalog_sync_core::MANAGE_REFERENCE_DATA_SCOPE;
use catalog_sync_core::NewCatalog;
use catalog_sync_core::Product;
use catalog_sync_core::READ_CATALOGS_SCOPE;
use catalog_sync_core::ReferenceDeletion;
use catalog_sync_core::SharedCatalogStore;
use catalog_sync_core::SharedLifecycleAuditSink;
use catalog_sync_core::SharedPermissionProvider;
use catalog_sync_core::SharedProductQuery;
use catalog_sync_core::SharedReferenceData;
use catalog_sync_core::SyncError;
use catalog_sync_core::SyncHandler;
use catalog_sync_core::SyncOutcome;
use catalog_sync_core::UuidPage;
use catalog_sync_core::Violation;
use catalog_sync_core::WRITE_CATALOGS_SCOPE;
use catalog_sync_core::core::violation::messages;
use catalog_sync_store_sqlite::SqliteCatalogStore;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::audit::ApiAuditEvent;
use crate::audit::ApiAuditEventParams;
use crate::audit::ApiAuditSink;
use crate::audit::ApiOutcome;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::auth::AuthContext;
use crate::auth::AuthError;
use crate::auth::BearerAuthenticator;
use crate::auth::LOCAL_OWNER;
use crate::reconcile::RECONCILE_QUEUE_CAPACITY;
use crate::reconcile::ReconcileHandle;
use crate::reconcile::ReconcileQueueError;
use crate::reconcile::Reconciler;
use crate::reconcile::ReferenceRuntime;

// ============================================================================
// SECTION: Routes
// ============================================================================

/// Catalog collection.
pub const CATALOGS_PATH: &str = "/api/rest/v1/catalogs";
/// Single catalog.
pub const CATALOG_PATH: &str = "/api/rest/v1/catalogs/{id}";
/// Product UUIDs selected by a catalog.
pub const PRODUCT_UUIDS_PATH: &str = "/api/rest/v1/catalogs/{id}/product-uuids";
/// Product selection criteria of a catalog.
pub const CRITERIA_PATH: &str = "/api/rest/v1/catalogs/{id}/product-selection-criteria";
/// Product mapping schema of a catalog.
pub const MAPPING_SCHEMA_PATH: &str = "/api/rest/v1/catalogs/{id}/mapping-schemas/product";
/// Product mapping of a catalog.
pub const MAPPING_PATH: &str = "/api/rest/v1/catalogs/{id}/mappings/product";
/// Reference deletion intake.
pub const REFERENCE_DELETIONS_PATH: &str = "/internal/reference-deletions";

/// Message for a malformed UUID in a request body.
const INVALID_UUID: &str = "This is not a valid UUID.";
/// Message for an unreadable reference deletion.
const INVALID_DELETION: &str = "This value is not a valid reference deletion.";

// ============================================================================
// SECTION: Server
// ============================================================================

/// Sync handler over the shared collaborator wrappers.
pub type ApiSyncHandler = SyncHandler<
    SharedCatalogStore,
    SharedReferenceData,
    SharedLifecycleAuditSink,
    SharedProductQuery,
    SharedPermissionProvider,
>;

/// Catalog sync HTTP server.
pub struct CatalogSyncServer {
    /// Socket address to listen on.
    bind: SocketAddr,
    /// Maximum accepted request body size.
    max_body_bytes: usize,
    /// Bearer authenticator.
    authenticator: BearerAuthenticator,
    /// Request audit sink.
    audit: Arc<dyn ApiAuditSink>,
    /// Catalog lifecycle and sync handler.
    sync: Arc<ApiSyncHandler>,
    /// Reference data updated by deletions.
    reference: Arc<ReferenceRuntime>,
}

impl CatalogSyncServer {
    /// Builds a server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when configuration is invalid or a store,
    /// seed, or audit sink cannot be initialized.
    pub fn from_config(mut config: CatalogSyncConfig) -> Result<Self, ApiServerError> {
        config.validate().map_err(|err| ApiServerError::Config(err.to_string()))?;
        let bind = config.server.bind_addr().map_err(|err| ApiServerError::Config(err.to_string()))?;
        let seed = config
            .reference_data
            .load_seed()
            .map_err(|err| ApiServerError::Init(err.to_string()))?
            .unwrap_or_default();
        let (audit, lifecycle_audit) = build_audit_sinks(&config.audit)?;
        let (catalogs, products) = build_stores(&config, &seed.products)?;
        let cache_ttl = config.reference_cache.enabled.then(|| config.reference_cache.ttl());
        let reference =
            Arc::new(ReferenceRuntime::new(InMemoryReferenceData::from_seed(&seed), cache_ttl));
        let lifecycle = CatalogLifecycle::new(catalogs, reference.shared(), lifecycle_audit);
        let permissions = SharedPermissionProvider::from_provider(config.permissions.provider());
        let sync = Arc::new(SyncHandler::new(
            lifecycle,
            products,
            permissions,
            config.pagination.limits(),
        ));
        Ok(Self {
            bind,
            max_body_bytes: config.server.max_body_bytes,
            authenticator: BearerAuthenticator::from_config(&config.server.auth),
            audit,
            sync,
            reference,
        })
    }

    /// Returns the configured bind address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Builds the router and starts the reconciliation worker.
    ///
    /// Must be called from within a `tokio` runtime.
    #[must_use]
    pub fn into_router(self) -> (Router, ReconcileHandle) {
        let reconciler = Reconciler::new(
            Arc::clone(&self.sync),
            Arc::clone(&self.reference),
            Arc::clone(&self.audit),
        );
        let (reconcile, _worker) = reconciler.spawn(RECONCILE_QUEUE_CAPACITY);
        let state = Arc::new(AppState {
            sync: self.sync,
            authenticator: self.authenticator,
            audit: self.audit,
            reconcile: reconcile.clone(),
        });
        (build_router(state, self.max_body_bytes), reconcile)
    }

    /// Serves HTTP requests until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError::Transport`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ApiServerError> {
        let bind = self.bind;
        if self.authenticator.is_local_only() {
            emit_local_only_warning();
        }
        let (app, _reconcile) = self.into_router();
        let listener = tokio::net::TcpListener::bind(bind)
            .await
            .map_err(|_| ApiServerError::Transport("http bind failed".to_string()))?;
        axum::serve(listener, app.into_make_service())
            .await
            .map_err(|_| ApiServerError::Transport("http server failed".to_string()))
    }
}

/// Builds the request and lifecycle audit sinks from configuration.
fn build_audit_sinks(
    config: &AuditConfig,
) -> Result<(Arc<dyn ApiAuditSink>, SharedLifecycleAuditSink), ApiServerError> {
    match config.sink {
        AuditSinkType::Stderr => Ok(shared_sinks(Arc::new(StderrAuditSink))),
        AuditSinkType::None => Ok(shared_sinks(Arc::new(NoopAuditSink))),
        AuditSinkType::File => {
            let path = config
                .path
                .as_ref()
                .ok_or_else(|| ApiServerError::Config("file audit sink requires path".to_string()))?;
            let sink = FileAuditSink::new(path)
                .map_err(|err| ApiServerError::Init(format!("audit log open failed: {err}")))?;
            Ok(shared_sinks(Arc::new(sink)))
        }
    }
}

/// Shares one sink between the request and lifecycle audit paths.
fn shared_sinks<T>(sink: Arc<T>) -> (Arc<dyn ApiAuditSink>, SharedLifecycleAuditSink)
where
    T: ApiAuditSink + LifecycleAuditSink + 'static,
{
    let api: Arc<dyn ApiAuditSink> = sink.clone();
    (api, SharedLifecycleAuditSink::new(sink))
}

/// Builds the catalog store and product query, loading seed products.
fn build_stores(
    config: &CatalogSyncConfig,
    products: &[Product],
) -> Result<(SharedCatalogStore, SharedProductQuery), ApiServerError> {
    match config.store.store_type {
        StoreType::Memory => Ok((
            SharedCatalogStore::from_store(InMemoryCatalogStore::new()),
            SharedProductQuery::from_query(InMemoryProductStore::with_products(
                products.iter().cloned(),
            )),
        )),
        StoreType::Sqlite => {
            let sqlite_config = config
                .store
                .sqlite_config(config.pagination.scan_batch_size)
                .ok_or_else(|| ApiServerError::Config("sqlite store requires path".to_string()))?;
            let store = SqliteCatalogStore::new(sqlite_config)
                .map_err(|err| ApiServerError::Init(err.to_string()))?;
            for product in products {
                store.upsert_product(product).map_err(|err| ApiServerError::Init(err.to_string()))?;
            }
            Ok((SharedCatalogStore::from_store(store.clone()), SharedProductQuery::from_query(store)))
        }
    }
}

/// Builds the HTTP router.
fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route(CATALOGS_PATH, get(list_catalogs).post(create_catalog))
        .route(CATALOG_PATH, get(get_catalog).patch(patch_catalog))
        .route(PRODUCT_UUIDS_PATH, get(get_product_uuids))
        .route(CRITERIA_PATH, get(get_criteria).put(put_criteria))
        .route(MAPPING_SCHEMA_PATH, get(get_mapping_schema).put(put_mapping_schema))
        .route(MAPPING_PATH, get(get_mapping).put(put_mapping))
        .route(REFERENCE_DELETIONS_PATH, post(post_reference_deletion))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Warns that requests are served without authentication.
fn emit_local_only_warning() {
    let _ = writeln!(
        std::io::stderr(),
        "catalog-sync: WARNING: no auth tokens configured; every request acts as owner \
         \"{LOCAL_OWNER}\" with all scopes"
    );
}

/// Runs synchronous store work, shifting to a blocking context when available.
pub(crate) fn run_blocking<T>(operation: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(operation)
        }
        _ => operation(),
    }
}

// ============================================================================
// SECTION: Request Handling
// ============================================================================

/// Shared server state for handlers.
struct AppState {
    /// Catalog lifecycle and sync handler.
    sync: Arc<ApiSyncHandler>,
    /// Bearer authenticator.
    authenticator: BearerAuthenticator,
    /// Request audit sink.
    audit: Arc<dyn ApiAuditSink>,
    /// Reconciliation queue.
    reconcile: ReconcileHandle,
}

/// Route identity used for scope checks and auditing.
struct RouteRequest {
    /// HTTP method.
    method: &'static str,
    /// Route template.
    route: &'static str,
    /// Catalog identifier from the path.
    catalog_id: Option<String>,
    /// Scopes required before the operation runs.
    scopes: &'static [&'static str],
}

/// Successful or mapped response.
struct Reply {
    /// HTTP status.
    status: StatusCode,
    /// JSON body.
    body: Value,
    /// Audit outcome.
    outcome: ApiOutcome,
    /// Audited error message.
    error: Option<String>,
}

impl Reply {
    /// 200 with a body.
    const fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            outcome: ApiOutcome::Success,
            error: None,
        }
    }

    /// Success with a specific status.
    const fn with_status(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            outcome: ApiOutcome::Success,
            error: None,
        }
    }

    /// 200 carrying the disabled-catalog message.
    fn unavailable(message: String) -> Self {
        Self {
            status: StatusCode::OK,
            body: json!({ "error": message }),
            outcome: ApiOutcome::Unavailable,
            error: Some(message),
        }
    }
}

impl AppState {
    /// Authenticates, checks scopes, runs the operation, and audits.
    fn handle<F>(&self, request: RouteRequest, headers: &HeaderMap, operation: F) -> Response
    where
        F: FnOnce(&AuthContext) -> Result<Reply, ApiError>,
    {
        let auth_header = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
        let (context, result) = match self.authenticator.authenticate(auth_header) {
            Ok(context) => {
                let result = match context.require_scopes(request.scopes) {
                    Ok(()) => run_blocking(|| operation(&context)),
                    Err(err) => Err(err.into()),
                };
                (Some(context), result)
            }
            Err(err) => (None, Err(err.into())),
        };
        let reply = result.unwrap_or_else(ApiError::into_reply);
        let (owner, token_fingerprint) = context.map_or((None, None), |context| {
            (Some(context.caller.owner.to_string()), context.token_fingerprint)
        });
        self.audit.record(&ApiAuditEvent::new(ApiAuditEventParams {
            method: request.method,
            route: request.route,
            status: reply.status.as_u16(),
            outcome: reply.outcome,
            owner,
            token_fingerprint,
            catalog_id: request.catalog_id,
            error: reply.error,
        }));
        (reply.status, Json(reply.body)).into_response()
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Shared handler state.
type AppStateRef = State<Arc<AppState>>;

/// Query parameters of the product UUID route.
#[derive(Debug, Default, Deserialize)]
struct ProductUuidsQuery {
    /// Raw page size.
    limit: Option<String>,
    /// Raw search-after cursor.
    search_after: Option<String>,
}

/// `GET /api/rest/v1/catalogs`.
async fn list_catalogs(State(state): AppStateRef, headers: HeaderMap) -> Response {
    let request = RouteRequest {
        method: "GET",
        route: CATALOGS_PATH,
        catalog_id: None,
        scopes: &[READ_CATALOGS_SCOPE],
    };
    state.handle(request, &headers, |context| {
        let catalogs = state.sync.lifecycle().list(&context.caller.owner)?;
        Ok(Reply::ok(json!({
            "_links": { "self": { "href": CATALOGS_PATH } },
            "_embedded": { "items": catalogs.iter().map(catalog_body).collect::<Vec<_>>() },
        })))
    })
}

/// `POST /api/rest/v1/catalogs`.
async fn create_catalog(State(state): AppStateRef, headers: HeaderMap, body: Bytes) -> Response {
    let request = RouteRequest {
        method: "POST",
        route: CATALOGS_PATH,
        catalog_id: None,
        scopes: &[WRITE_CATALOGS_SCOPE],
    };
    state.handle(request, &headers, |context| {
        let new_catalog = parse_new_catalog(&parse_json(&body)?)?;
        let catalog = state.sync.lifecycle().create(&context.caller.owner, new_catalog)?;
        Ok(Reply::with_status(StatusCode::CREATED, catalog_body(&catalog)))
    })
}

/// `GET /api/rest/v1/catalogs/{id}`.
async fn get_catalog(
    State(state): AppStateRef,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let request = catalog_request("GET", CATALOG_PATH, &id, &[READ_CATALOGS_SCOPE]);
    state.handle(request, &headers, |context| {
        let catalog = state.sync.lifecycle().get(&context.caller.owner, &parse_catalog_id(&id)?)?;
        Ok(Reply::ok(catalog_body(&catalog)))
    })
}

/// `PATCH /api/rest/v1/catalogs/{id}` toggles `enabled`.
async fn patch_catalog(
    State(state): AppStateRef,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = catalog_request("PATCH", CATALOG_PATH, &id, &[WRITE_CATALOGS_SCOPE]);
    state.handle(request, &headers, |context| {
        let catalog_id = parse_catalog_id(&id)?;
        let enabled = parse_enabled(&parse_json(&body)?)?;
        let catalog =
            state.sync.lifecycle().set_enabled(&context.caller.owner, &catalog_id, enabled)?;
        Ok(Reply::ok(catalog_body(&catalog)))
    })
}

/// `GET /api/rest/v1/catalogs/{id}/product-uuids`.
async fn get_product_uuids(
    State(state): AppStateRef,
    Path(id): Path<String>,
    Query(query): Query<ProductUuidsQuery>,
    headers: HeaderMap,
) -> Response {
    let request = catalog_request("GET", PRODUCT_UUIDS_PATH, &id, &[]);
    state.handle(request, &headers, |context| {
        let catalog_id = parse_catalog_id(&id)?;
        let outcome = state.sync.product_uuids(
            &context.caller,
            &catalog_id,
            query.limit.as_deref(),
            query.search_after.as_deref(),
        )?;
        match outcome {
            SyncOutcome::Page(page) => {
                let limit = query
                    .limit
                    .as_deref()
                    .and_then(|raw| raw.trim().parse::<usize>().ok())
                    .unwrap_or(state.sync.limits().default_limit);
                Ok(Reply::ok(product_uuids_body(
                    &catalog_id,
                    &page,
                    limit,
                    query.search_after.as_deref(),
                )))
            }
            SyncOutcome::Unavailable(message) => Ok(Reply::unavailable(message)),
        }
    })
}

/// `GET /api/rest/v1/catalogs/{id}/product-selection-criteria`.
async fn get_criteria(
    State(state): AppStateRef,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let request = catalog_request("GET", CRITERIA_PATH, &id, &[READ_CATALOGS_SCOPE]);
    state.handle(request, &headers, |context| {
        let catalog = state.sync.lifecycle().get(&context.caller.owner, &parse_catalog_id(&id)?)?;
        Ok(Reply::ok(to_json(&catalog.product_selection_criteria)?))
    })
}

/// `PUT /api/rest/v1/catalogs/{id}/product-selection-criteria`.
async fn put_criteria(
    State(state): AppStateRef,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = catalog_request("PUT", CRITERIA_PATH, &id, &[WRITE_CATALOGS_SCOPE]);
    state.handle(request, &headers, |context| {
        let catalog_id = parse_catalog_id(&id)?;
        let raw = parse_json(&body)?;
        let catalog = state.sync.lifecycle().update_product_selection(
            &context.caller.owner,
            &catalog_id,
            &raw,
        )?;
        Ok(Reply::ok(to_json(&catalog.product_selection_criteria)?))
    })
}

/// `GET /api/rest/v1/catalogs/{id}/mapping-schemas/product`.
async fn get_mapping_schema(
    State(state): AppStateRef,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let request = catalog_request("GET", MAPPING_SCHEMA_PATH, &id, &[READ_CATALOGS_SCOPE]);
    state.handle(request, &headers, |context| {
        let catalog_id = parse_catalog_id(&id)?;
        let catalog = state.sync.lifecycle().get(&context.caller.owner, &catalog_id)?;
        let schema = catalog.product_mapping_schema.ok_or_else(|| {
            ApiError::NotFound(format!("product mapping schema not found for catalog {catalog_id}"))
        })?;
        Ok(Reply::ok(schema))
    })
}

/// `PUT /api/rest/v1/catalogs/{id}/mapping-schemas/product`.
async fn put_mapping_schema(
    State(state): AppStateRef,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = catalog_request("PUT", MAPPING_SCHEMA_PATH, &id, &[WRITE_CATALOGS_SCOPE]);
    state.handle(request, &headers, |context| {
        let catalog_id = parse_catalog_id(&id)?;
        let schema = parse_json(&body)?;
        let catalog =
            state.sync.lifecycle().update_mapping_schema(&context.caller.owner, &catalog_id, schema)?;
        Ok(Reply::ok(catalog.product_mapping_schema.unwrap_or(Value::Null)))
    })
}

/// `GET /api/rest/v1/catalogs/{id}/mappings/product`.
async fn get_mapping(
    State(state): AppStateRef,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let request = catalog_request("GET", MAPPING_PATH, &id, &[READ_CATALOGS_SCOPE]);
    state.handle(request, &headers, |context| {
        let catalog = state.sync.lifecycle().get(&context.caller.owner, &parse_catalog_id(&id)?)?;
        Ok(Reply::ok(catalog.product_mapping.to_value()))
    })
}

/// `PUT /api/rest/v1/catalogs/{id}/mappings/product`.
async fn put_mapping(
    State(state): AppStateRef,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = catalog_request("PUT", MAPPING_PATH, &id, &[WRITE_CATALOGS_SCOPE]);
    state.handle(request, &headers, |context| {
        let catalog_id = parse_catalog_id(&id)?;
        let raw = parse_json(&body)?;
        let catalog =
            state.sync.lifecycle().update_mapping(&context.caller.owner, &catalog_id, &raw)?;
        Ok(Reply::ok(catalog.product_mapping.to_value()))
    })
}

/// `POST /internal/reference-deletions` queues a deletion for reconciliation.
async fn post_reference_deletion(
    State(state): AppStateRef,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = RouteRequest {
        method: "POST",
        route: REFERENCE_DELETIONS_PATH,
        catalog_id: None,
        scopes: &[MANAGE_REFERENCE_DATA_SCOPE],
    };
    state.handle(request, &headers, |_| {
        let deletion: ReferenceDeletion = serde_json::from_value(parse_json(&body)?)
            .map_err(|_| ApiError::Validation(vec![Violation::new("", INVALID_DELETION)]))?;
        let key = deletion.key();
        let accepted = json!({ "kind": key.kind(), "code": key.code(), "status": "accepted" });
        state.reconcile.submit(deletion)?;
        Ok(Reply::with_status(StatusCode::ACCEPTED, accepted))
    })
}

// ============================================================================
// SECTION: Request Parsing
// ============================================================================

/// Builds a route request for a catalog-scoped path.
fn catalog_request(
    method: &'static str,
    route: &'static str,
    id: &str,
    scopes: &'static [&'static str],
) -> RouteRequest {
    RouteRequest {
        method,
        route,
        catalog_id: Some(id.to_string()),
        scopes,
    }
}

/// Parses a path catalog id; malformed ids are reported as not found.
fn parse_catalog_id(raw: &str) -> Result<CatalogId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound(format!("catalog {raw} not found")))
}

/// Parses a JSON request body.
fn parse_json(body: &Bytes) -> Result<Value, ApiError> {
    serde_json::from_slice(body.as_ref())
        .map_err(|_| ApiError::BadRequest("invalid json body".to_string()))
}

/// Serializes a response value.
fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|err| ApiError::Internal(err.to_string()))
}

/// Reads a catalog creation body: `name` required, `id` optional.
fn parse_new_catalog(body: &Value) -> Result<NewCatalog, ApiError> {
    let Some(object) = body.as_object() else {
        return Err(ApiError::Validation(vec![Violation::new("", messages::TYPE_OBJECT)]));
    };
    let mut violations = unexpected_keys(object, &["id", "name"]);
    let name = match object.get("name") {
        None => {
            violations.push(Violation::new("[name]", messages::FIELD_MISSING));
            None
        }
        Some(Value::String(name)) => Some(name.clone()),
        Some(_) => {
            violations.push(Violation::new("[name]", messages::TYPE_STRING));
            None
        }
    };
    let id = match object.get("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => {
            let parsed = raw.parse::<CatalogId>().ok();
            if parsed.is_none() {
                violations.push(Violation::new("[id]", INVALID_UUID));
            }
            parsed
        }
        Some(_) => {
            violations.push(Violation::new("[id]", messages::TYPE_STRING));
            None
        }
    };
    match name {
        Some(name) if violations.is_empty() => Ok(NewCatalog {
            id,
            name,
        }),
        _ => Err(ApiError::Validation(violations)),
    }
}

/// Reads a catalog patch body: exactly `{"enabled": bool}`.
fn parse_enabled(body: &Value) -> Result<bool, ApiError> {
    let Some(object) = body.as_object() else {
        return Err(ApiError::Validation(vec![Violation::new("", messages::TYPE_OBJECT)]));
    };
    let mut violations = unexpected_keys(object, &["enabled"]);
    let enabled = match object.get("enabled") {
        None => {
            violations.push(Violation::new("[enabled]", messages::FIELD_MISSING));
            None
        }
        Some(Value::Bool(enabled)) => Some(*enabled),
        Some(_) => {
            violations.push(Violation::new("[enabled]", messages::TYPE_BOOLEAN));
            None
        }
    };
    match enabled {
        Some(enabled) if violations.is_empty() => Ok(enabled),
        _ => Err(ApiError::Validation(violations)),
    }
}

/// Reports keys outside the allowed set.
fn unexpected_keys(object: &Map<String, Value>, allowed: &[&str]) -> Vec<Violation> {
    object
        .keys()
        .filter(|key| !allowed.contains(&key.as_str()))
        .map(|key| Violation::new(format!("[{key}]"), messages::FIELD_NOT_EXPECTED))
        .collect()
}

// ============================================================================
// SECTION: Response Bodies
// ============================================================================

/// Public catalog representation.
fn catalog_body(catalog: &Catalog) -> Value {
    json!({
        "id": catalog.id.to_string(),
        "name": catalog.name,
        "enabled": catalog.enabled,
    })
}

/// Product UUID page with `self`, `first`, and optional `next` links.
fn product_uuids_body(
    id: &CatalogId,
    page: &UuidPage,
    limit: usize,
    search_after: Option<&str>,
) -> Value {
    let base = format!("/api/rest/v1/catalogs/{id}/product-uuids?limit={limit}");
    let href = |cursor: Option<&str>| match cursor {
        Some(cursor) => json!({ "href": format!("{base}&search_after={cursor}") }),
        None => json!({ "href": base }),
    };
    let mut links = Map::new();
    links.insert("self".to_string(), href(search_after));
    links.insert("first".to_string(), href(None));
    if let Some(next) = &page.next {
        links.insert("next".to_string(), href(Some(next)));
    }
    json!({
        "_links": links,
        "_embedded": {
            "items": page.items.iter().map(ToString::to_string).collect::<Vec<_>>(),
        },
    })
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Request errors mapped onto HTTP responses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthenticated(String),
    /// Missing scope.
    #[error("{0}")]
    Forbidden(String),
    /// Unknown or foreign resource.
    #[error("{0}")]
    NotFound(String),
    /// Identifier already taken.
    #[error("{0}")]
    Conflict(String),
    /// Unreadable request body.
    #[error("{0}")]
    BadRequest(String),
    /// Field-scoped validation failures.
    #[error("validation failed: {} violation(s)", .0.len())]
    Validation(Vec<Violation>),
    /// Temporarily unable to accept work.
    #[error("{0}")]
    Unavailable(String),
    /// Storage or reference data fault.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status for the error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the JSON body for the error; internal details stay in audit.
    #[must_use]
    pub fn body(&self) -> Value {
        match self {
            Self::Validation(violations) => json!({
                "message": "Validation failed.",
                "errors": violations
                    .iter()
                    .map(|violation| json!({
                        "property_path": violation.property_path,
                        "message": violation.message,
                    }))
                    .collect::<Vec<_>>(),
            }),
            Self::Internal(_) => json!({ "error": "internal server error" }),
            other => json!({ "error": other.to_string() }),
        }
    }

    /// Converts the error into an audited reply.
    fn into_reply(self) -> Reply {
        let status = self.status();
        Reply {
            status,
            body: self.body(),
            outcome: if status.is_server_error() { ApiOutcome::Failed } else { ApiOutcome::Rejected },
            error: Some(self.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Unauthenticated(message) => Self::Unauthenticated(message),
            AuthError::Unauthorized(message) => Self::Forbidden(message),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(error: SyncError) -> Self {
        match error {
            SyncError::Forbidden(message) => Self::Forbidden(message),
            SyncError::Validation(violations) => Self::Validation(violations),
            SyncError::NotFound(id) => Self::NotFound(format!("catalog {id} not found")),
            SyncError::Reference(error) => Self::Internal(error.to_string()),
            SyncError::Store(error) => Self::Internal(error.to_string()),
        }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(error: LifecycleError) -> Self {
        match error {
            LifecycleError::NotFound(id) => Self::NotFound(format!("catalog {id} not found")),
            LifecycleError::Conflict(message) => Self::Conflict(message),
            LifecycleError::Validation(violations) => Self::Validation(violations),
            LifecycleError::Reference(error) => Self::Internal(error.to_string()),
            LifecycleError::Store(error) => Self::Internal(error.to_string()),
        }
    }
}

impl From<ReconcileQueueError> for ApiError {
    fn from(error: ReconcileQueueError) -> Self {
        Self::Unavailable(error.to_string())
    }
}

/// Catalog sync server errors.
#[derive(Debug, Error)]
pub enum ApiServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
