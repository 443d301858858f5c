// catalog-sync-api/src/audit.rs
// ============================================================================
// Module: API Audit Logging
// Description: Structured audit events for HTTP requests and reconciliation.
// Purpose: Emit JSON-line audit records without a logging framework.
// Dependencies: catalog-sync-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Request and reconciliation events are plain serializable structs routed
//! through [`ApiAuditSink`]. The stderr, file, and no-op sinks also implement
//! [`LifecycleAuditSink`] so one configured sink receives catalog lifecycle
//! events from the core as well. Events never carry bearer tokens, only their
//! sha256 fingerprint.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use catalog_sync_core::LifecycleAuditSink;
use catalog_sync_core::LifecycleEvent;
use catalog_sync_core::ReconcileReport;
use catalog_sync_core::ReferenceDeletion;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Request outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiOutcome {
    /// Request served.
    Success,
    /// Catalog disabled; served as a 200 with an `error` body.
    Unavailable,
    /// Client error (4xx).
    Rejected,
    /// Server error (5xx).
    Failed,
}

/// HTTP request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ApiAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// HTTP method.
    pub method: &'static str,
    /// Route template.
    pub route: &'static str,
    /// Response status code.
    pub status: u16,
    /// Request outcome.
    pub outcome: ApiOutcome,
    /// Authenticated owner when known.
    pub owner: Option<String>,
    /// Bearer token fingerprint (sha256) when present.
    pub token_fingerprint: Option<String>,
    /// Catalog identifier from the path, as sent.
    pub catalog_id: Option<String>,
    /// Error message for non-success outcomes.
    pub error: Option<String>,
}

/// Reconciliation audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Deleted reference kind.
    pub reference_kind: &'static str,
    /// Deleted reference code.
    pub reference_code: String,
    /// Whether local reference data changed.
    pub reference_changed: bool,
    /// Number of candidate catalogs examined.
    pub examined: usize,
    /// Catalogs disabled by the sweep.
    pub disabled: Vec<String>,
    /// Number of candidates that failed.
    pub failures: usize,
    /// Error that aborted the sweep.
    pub error: Option<String>,
}

/// Inputs required to construct a request audit event.
pub struct ApiAuditEventParams {
    /// HTTP method.
    pub method: &'static str,
    /// Route template.
    pub route: &'static str,
    /// Response status code.
    pub status: u16,
    /// Request outcome.
    pub outcome: ApiOutcome,
    /// Authenticated owner when known.
    pub owner: Option<String>,
    /// Bearer token fingerprint when present.
    pub token_fingerprint: Option<String>,
    /// Catalog identifier from the path.
    pub catalog_id: Option<String>,
    /// Error message for non-success outcomes.
    pub error: Option<String>,
}

/// Inputs required to construct a reconciliation audit event.
pub struct ReconcileAuditEventParams<'a> {
    /// Deletion being processed.
    pub deletion: &'a ReferenceDeletion,
    /// Whether local reference data changed.
    pub reference_changed: bool,
    /// Sweep report when the sweep ran.
    pub report: Option<&'a ReconcileReport>,
    /// Error that aborted the sweep.
    pub error: Option<String>,
}

impl ApiAuditEvent {
    /// Creates a new request audit event.
    #[must_use]
    pub fn new(params: ApiAuditEventParams) -> Self {
        Self {
            event: "api_request",
            timestamp_ms: now_ms(),
            method: params.method,
            route: params.route,
            status: params.status,
            outcome: params.outcome,
            owner: params.owner,
            token_fingerprint: params.token_fingerprint,
            catalog_id: params.catalog_id,
            error: params.error,
        }
    }
}

impl ReconcileAuditEvent {
    /// Creates a new reconciliation audit event.
    #[must_use]
    pub fn new(params: ReconcileAuditEventParams<'_>) -> Self {
        let key = params.deletion.key();
        Self {
            event: "reference_reconciliation",
            timestamp_ms: now_ms(),
            reference_kind: key.kind(),
            reference_code: key.code(),
            reference_changed: params.reference_changed,
            examined: params.report.map_or(0, |report| report.examined.len()),
            disabled: params
                .report
                .map(|report| report.disabled.iter().map(ToString::to_string).collect())
                .unwrap_or_default(),
            failures: params.report.map_or(0, |report| report.failures.len()),
            error: params.error,
        }
    }
}

/// Milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for API request events.
pub trait ApiAuditSink: Send + Sync {
    /// Record a request audit event.
    fn record(&self, event: &ApiAuditEvent);

    /// Record a reconciliation audit event.
    fn record_reconcile(&self, _event: &ReconcileAuditEvent) {}
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl StderrAuditSink {
    /// Writes one serialized event line.
    fn emit<T: Serialize>(event: &T) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

impl ApiAuditSink for StderrAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        Self::emit(event);
    }

    fn record_reconcile(&self, event: &ReconcileAuditEvent) {
        Self::emit(event);
    }
}

impl LifecycleAuditSink for StderrAuditSink {
    fn record_lifecycle(&self, event: &LifecycleEvent) {
        Self::emit(event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event line.
    fn emit<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl ApiAuditSink for FileAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        self.emit(event);
    }

    fn record_reconcile(&self, event: &ReconcileAuditEvent) {
        self.emit(event);
    }
}

impl LifecycleAuditSink for FileAuditSink {
    fn record_lifecycle(&self, event: &LifecycleEvent) {
        self.emit(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl ApiAuditSink for NoopAuditSink {
    fn record(&self, _event: &ApiAuditEvent) {}

    fn record_reconcile(&self, _event: &ReconcileAuditEvent) {}
}

impl LifecycleAuditSink for NoopAuditSink {
    fn record_lifecycle(&self, _event: &LifecycleEvent) {}
}
