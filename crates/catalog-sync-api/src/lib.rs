// catalog-sync-api/src/lib.rs
// ============================================================================
// Module: Catalog Sync API
// Description: HTTP server for catalog management and product UUID sync.
// Purpose: Expose the catalog sync core over authenticated REST routes.
// Dependencies: catalog-sync-{config, core, store-sqlite}, axum, tokio
// ============================================================================

//! ## Overview
//! Catalog sync API serves the public catalog routes and the product UUID
//! sync route on top of [`catalog_sync_core`], authenticates callers with
//! bearer tokens, audits every request, and runs the reference deletion
//! reconciliation worker.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod reconcile;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ApiAuditEvent;
pub use audit::ApiAuditSink;
pub use audit::ApiOutcome;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::ReconcileAuditEvent;
pub use audit::StderrAuditSink;
pub use auth::AuthContext;
pub use auth::AuthError;
pub use auth::BearerAuthenticator;
pub use auth::LOCAL_OWNER;
pub use reconcile::ReconcileHandle;
pub use reconcile::ReconcileQueueError;
pub use reconcile::Reconciler;
pub use reconcile::ReferenceRuntime;
pub use server::ApiError;
pub use server::ApiServerError;
pub use server::ApiSyncHandler;
pub use server::CatalogSyncServer;
