// catalog-sync-api/src/reconcile.rs
// ============================================================================
// Module: Reconciliation Worker
// Description: Consumes reference deletions and reconciles catalogs.
// Purpose: Apply deletions to reference data and disable dangling catalogs.
// Dependencies: catalog-sync-core, thiserror, tokio
// ============================================================================

//! ## Overview
//! Reference deletions travel over a bounded `tokio` mpsc channel to a single
//! worker task. For each deletion the worker applies it to the local
//! reference data, drops the affected cache entries, then runs the lifecycle
//! reconciliation sweep and audits the result. Jobs are processed in order,
//! so awaiting one job means every earlier job has finished.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use catalog_sync_core::CachedReferenceData;
use catalog_sync_core::InMemoryReferenceData;
use catalog_sync_core::ReconcileReport;
use catalog_sync_core::ReferenceDeletion;
use catalog_sync_core::ReferenceError;
use catalog_sync_core::SharedReferenceData;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::audit::ApiAuditSink;
use crate::audit::ReconcileAuditEvent;
use crate::audit::ReconcileAuditEventParams;
use crate::server::ApiSyncHandler;
use crate::server::run_blocking;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Pending deletions accepted before submissions are refused.
pub const RECONCILE_QUEUE_CAPACITY: usize = 1024;

// ============================================================================
// SECTION: Reference Runtime
// ============================================================================

/// Mutable reference data with its optional read cache.
pub struct ReferenceRuntime {
    /// Authoritative in-memory reference data.
    data: InMemoryReferenceData,
    /// Positive-lookup cache in front of `data`.
    cache: Option<Arc<CachedReferenceData<InMemoryReferenceData>>>,
}

impl ReferenceRuntime {
    /// Wraps reference data, caching lookups for `cache_ttl` when set.
    #[must_use]
    pub fn new(data: InMemoryReferenceData, cache_ttl: Option<Duration>) -> Self {
        let cache = cache_ttl.map(|ttl| Arc::new(CachedReferenceData::new(data.clone(), ttl)));
        Self {
            data,
            cache,
        }
    }

    /// Returns the reference source validators should read through.
    #[must_use]
    pub fn shared(&self) -> SharedReferenceData {
        match &self.cache {
            Some(cache) => SharedReferenceData::new(cache.clone()),
            None => SharedReferenceData::from_reference(self.data.clone()),
        }
    }

    /// Applies a deletion, then drops the cache entries it affects.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] when the reference data cannot be updated.
    pub fn apply_deletion(&self, deletion: &ReferenceDeletion) -> Result<bool, ReferenceError> {
        let changed = self.data.apply_deletion(deletion)?;
        if let Some(cache) = &self.cache {
            cache.invalidate(deletion.key());
        }
        Ok(changed)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reconciliation queue errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileQueueError {
    /// Queue at capacity.
    #[error("reconciliation queue full")]
    Full,
    /// Worker stopped.
    #[error("reconciliation worker stopped")]
    Closed,
    /// Sweep failed.
    #[error("reconciliation failed: {0}")]
    Failed(String),
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Queued deletion with an optional completion reply.
struct ReconcileJob {
    /// Deletion to process.
    deletion: ReferenceDeletion,
    /// Receives the sweep result when the submitter waits.
    reply: Option<oneshot::Sender<Result<ReconcileReport, String>>>,
}

/// Sending side of the reconciliation queue.
#[derive(Clone)]
pub struct ReconcileHandle {
    /// Job sender.
    sender: mpsc::Sender<ReconcileJob>,
}

impl ReconcileHandle {
    /// Enqueues a deletion without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileQueueError::Full`] or [`ReconcileQueueError::Closed`]
    /// when the deletion cannot be queued.
    pub fn submit(&self, deletion: ReferenceDeletion) -> Result<(), ReconcileQueueError> {
        self.sender
            .try_send(ReconcileJob {
                deletion,
                reply: None,
            })
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => ReconcileQueueError::Full,
                mpsc::error::TrySendError::Closed(_) => ReconcileQueueError::Closed,
            })
    }

    /// Enqueues a deletion and waits for its sweep report.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileQueueError`] when the worker is gone or the sweep
    /// fails.
    pub async fn reconcile(
        &self,
        deletion: ReferenceDeletion,
    ) -> Result<ReconcileReport, ReconcileQueueError> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(ReconcileJob {
                deletion,
                reply: Some(reply),
            })
            .await
            .map_err(|_| ReconcileQueueError::Closed)?;
        receiver.await.map_err(|_| ReconcileQueueError::Closed)?.map_err(ReconcileQueueError::Failed)
    }
}

// ============================================================================
// SECTION: Worker
// ============================================================================

/// Reconciliation worker state.
pub struct Reconciler {
    /// Sync handler owning the catalog lifecycle.
    sync: Arc<ApiSyncHandler>,
    /// Reference data updated by deletions.
    reference: Arc<ReferenceRuntime>,
    /// Audit sink for sweep results.
    audit: Arc<dyn ApiAuditSink>,
}

impl Reconciler {
    /// Creates a reconciler.
    #[must_use]
    pub fn new(
        sync: Arc<ApiSyncHandler>,
        reference: Arc<ReferenceRuntime>,
        audit: Arc<dyn ApiAuditSink>,
    ) -> Self {
        Self {
            sync,
            reference,
            audit,
        }
    }

    /// Processes one deletion synchronously.
    ///
    /// # Errors
    ///
    /// Returns a message when reference data or the reverse index fails;
    /// per-catalog failures stay in the report.
    pub fn process(&self, deletion: &ReferenceDeletion) -> Result<ReconcileReport, String> {
        let reference_changed = match self.reference.apply_deletion(deletion) {
            Ok(changed) => changed,
            Err(err) => return Err(self.record_failure(deletion, false, err.to_string())),
        };
        match self.sync.lifecycle().reconcile(deletion) {
            Ok(report) => {
                self.audit.record_reconcile(&ReconcileAuditEvent::new(ReconcileAuditEventParams {
                    deletion,
                    reference_changed,
                    report: Some(&report),
                    error: None,
                }));
                Ok(report)
            }
            Err(err) => Err(self.record_failure(deletion, reference_changed, err.to_string())),
        }
    }

    /// Audits an aborted sweep and returns its message.
    fn record_failure(
        &self,
        deletion: &ReferenceDeletion,
        reference_changed: bool,
        message: String,
    ) -> String {
        self.audit.record_reconcile(&ReconcileAuditEvent::new(ReconcileAuditEventParams {
            deletion,
            reference_changed,
            report: None,
            error: Some(message.clone()),
        }));
        message
    }

    /// Spawns the worker task; it stops once every handle is dropped.
    ///
    /// Must be called from within a `tokio` runtime.
    #[must_use]
    pub fn spawn(self, capacity: usize) -> (ReconcileHandle, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<ReconcileJob>(capacity.max(1));
        let task = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                let result = run_blocking(|| self.process(&job.deletion));
                if let Some(reply) = job.reply {
                    let _ = reply.send(result);
                }
            }
        });
        (
            ReconcileHandle {
                sender,
            },
            task,
        )
    }
}
