//! Connectivity-driven sync dispatcher.

use crate::config::SyncConfig;
use crate::exchange::CredentialClient;
use crate::http::HttpClient;
use crate::oplog::OperationLog;
use crate::remote::DocumentClient;
use docrelay_protocol::{
    resolve, AttemptOutcome, Disposition, DocumentMetadata, OperationKind, PendingOperation,
    SyncError,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Observer receiving one result per processed pending operation.
///
/// Exactly one of the success metadata or the error is produced per
/// recognized entry. Registration can change at any time; with no observer
/// the log disposition still applies and delivery is skipped.
pub trait SyncObserver: Send + Sync {
    /// Called once per processed entry after its log disposition is applied.
    fn on_result(&self, kind: OperationKind, result: Result<DocumentMetadata, SyncError>);
}

/// The drain state of the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainState {
    /// No drain in progress.
    Idle,
    /// A drain pass is walking the queue.
    Draining,
}

/// Counters describing dispatcher activity.
#[derive(Debug, Clone, Default)]
pub struct DrainStats {
    /// Completed drain passes.
    pub drains_completed: u64,
    /// Entries pushed through the full pipeline.
    pub operations_processed: u64,
    /// Entries finalized (success or terminal failure).
    pub operations_finalized: u64,
    /// Entries discarded after a conflict.
    pub operations_discarded: u64,
    /// Entries retained for a later drain.
    pub operations_retained: u64,
    /// Unrecognized entries skipped.
    pub operations_skipped: u64,
    /// Last failure delivered, as text.
    pub last_error: Option<String>,
}

/// Orchestrates queue drains on connectivity transitions.
///
/// An online edge triggers one synchronous drain pass on the signalling
/// thread: tables are walked in the configured order, and within a table
/// entries run strictly in enqueue order, each through the full
/// exchange → remote command → policy pipeline before the next starts.
/// An offline edge never issues remote calls; arriving mid-drain it lets
/// the in-flight entry finish and suppresses the entries after it.
pub struct SyncDispatcher<C: HttpClient, L: OperationLog> {
    config: SyncConfig,
    oplog: Arc<L>,
    credentials: CredentialClient<C>,
    documents: DocumentClient<C>,
    online: AtomicBool,
    draining: AtomicBool,
    observer: RwLock<Option<Arc<dyn SyncObserver>>>,
    stats: RwLock<DrainStats>,
}

impl<C: HttpClient, L: OperationLog> SyncDispatcher<C, L> {
    /// Creates a dispatcher over the given transport and operation log.
    pub fn new(config: SyncConfig, client: Arc<C>, oplog: Arc<L>) -> Self {
        let credentials = CredentialClient::new(
            config.exchange_url.clone(),
            config.app_key.clone(),
            Arc::clone(&client),
        );
        let documents = DocumentClient::new(config.api_version.clone(), client);
        Self {
            config,
            oplog,
            credentials,
            documents,
            online: AtomicBool::new(false),
            draining: AtomicBool::new(false),
            observer: RwLock::new(None),
            stats: RwLock::new(DrainStats::default()),
        }
    }

    /// Registers the observer, replacing any previous registration.
    pub fn register_observer(&self, observer: Arc<dyn SyncObserver>) {
        *self.observer.write() = Some(observer);
    }

    /// Clears the observer slot.
    pub fn unregister_observer(&self) {
        *self.observer.write() = None;
    }

    /// Returns the current drain state.
    pub fn state(&self) -> DrainState {
        if self.draining.load(Ordering::SeqCst) {
            DrainState::Draining
        } else {
            DrainState::Idle
        }
    }

    /// Returns a snapshot of the activity counters.
    pub fn stats(&self) -> DrainStats {
        self.stats.read().clone()
    }

    /// Returns the operation log shared with the write path.
    pub fn oplog(&self) -> Arc<L> {
        Arc::clone(&self.oplog)
    }

    /// Handles a connectivity transition.
    ///
    /// An online edge runs one drain pass; repeated edges are harmless
    /// because finalized entries are no longer listed as pending, and a
    /// guard keeps two drain workers from overlapping. An offline edge only
    /// clears the online flag.
    pub fn on_connectivity_changed(&self, is_online: bool) {
        self.online.store(is_online, Ordering::SeqCst);
        if !is_online {
            debug!("connectivity lost; queued mutations stay pending");
            return;
        }

        if self
            .draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("drain already in progress; ignoring duplicate online edge");
            return;
        }

        self.drain();
        self.draining.store(false, Ordering::SeqCst);
    }

    fn drain(&self) {
        info!("connectivity restored; draining pending operations");
        for table in &self.config.tables {
            if !self.online.load(Ordering::SeqCst) {
                warn!("connectivity lost mid-drain; stopping before table {table}");
                break;
            }
            self.drain_table(table);
        }
        self.stats.write().drains_completed += 1;
    }

    fn drain_table(&self, table: &str) {
        let pending = match self.oplog.list_pending(table) {
            Ok(pending) => pending,
            Err(e) => {
                warn!("failed to list pending operations for table {table}: {e}");
                return;
            }
        };
        if pending.is_empty() {
            return;
        }

        debug!("draining {} pending operations for table {table}", pending.len());
        for op in pending {
            if !self.online.load(Ordering::SeqCst) {
                warn!(
                    "connectivity lost mid-drain; {} stays pending in table {table}",
                    op.document_id
                );
                break;
            }
            self.process(&op);
        }
    }

    /// Runs one entry through the full pipeline. Never propagates a fault:
    /// one entry's failure must not abort the entries after it.
    fn process(&self, op: &PendingOperation) {
        if !op.kind.is_supported() {
            debug!(
                "skipping unrecognized operation kind {:?} for document {}",
                op.kind, op.document_id
            );
            self.stats.write().operations_skipped += 1;
            return;
        }

        let outcome = match self.credentials.exchange(&op.table, &op.partition) {
            Ok(credential) => self.documents.execute(&credential, op),
            Err(message) => AttemptOutcome::ExchangeFailed { message },
        };

        let resolution = resolve(&op.kind, outcome);
        self.apply_disposition(op, &resolution.disposition);
        self.record(&resolution);
        self.deliver(op.kind.clone(), resolution.result);
    }

    fn apply_disposition(&self, op: &PendingOperation, disposition: &Disposition) {
        match disposition {
            Disposition::Retain => {}
            Disposition::Finalize { etag, document } => {
                if let Err(e) = self.oplog.finalize(op, etag.as_deref(), document.as_ref()) {
                    warn!(
                        "failed to finalize {} in table {}: {e}",
                        op.document_id, op.table
                    );
                }
            }
            Disposition::Discard => {
                if let Err(e) = self.oplog.discard(op) {
                    warn!(
                        "failed to discard {} in table {}: {e}",
                        op.document_id, op.table
                    );
                }
            }
        }
    }

    fn record(&self, resolution: &docrelay_protocol::Resolution) {
        let mut stats = self.stats.write();
        stats.operations_processed += 1;
        match &resolution.disposition {
            Disposition::Retain => stats.operations_retained += 1,
            Disposition::Finalize { .. } => stats.operations_finalized += 1,
            Disposition::Discard => stats.operations_discarded += 1,
        }
        if let Err(e) = &resolution.result {
            stats.last_error = Some(e.to_string());
        }
    }

    fn deliver(&self, kind: OperationKind, result: Result<DocumentMetadata, SyncError>) {
        // Clone the slot out so no lock is held across the callback.
        let observer = self.observer.read().clone();
        if let Some(observer) = observer {
            observer.on_result(kind, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpClient;
    use crate::oplog::MemoryOperationLog;

    fn dispatcher() -> SyncDispatcher<MockHttpClient, MemoryOperationLog> {
        SyncDispatcher::new(
            SyncConfig::new("https://exchange.example.com", "app-1").with_table("notes"),
            Arc::new(MockHttpClient::new()),
            Arc::new(MemoryOperationLog::new()),
        )
    }

    #[test]
    fn starts_idle_and_offline() {
        let dispatcher = dispatcher();
        assert_eq!(dispatcher.state(), DrainState::Idle);
        assert_eq!(dispatcher.stats().drains_completed, 0);
    }

    #[test]
    fn offline_edge_never_drains() {
        let dispatcher = dispatcher();
        dispatcher.on_connectivity_changed(false);
        assert_eq!(dispatcher.stats().drains_completed, 0);
    }

    #[test]
    fn online_edge_completes_a_pass() {
        let dispatcher = dispatcher();
        dispatcher.on_connectivity_changed(true);
        assert_eq!(dispatcher.state(), DrainState::Idle);
        assert_eq!(dispatcher.stats().drains_completed, 1);
    }

    #[test]
    fn observer_slot_can_be_cleared() {
        struct Nop;
        impl SyncObserver for Nop {
            fn on_result(
                &self,
                _kind: OperationKind,
                _result: Result<DocumentMetadata, SyncError>,
            ) {
            }
        }

        let dispatcher = dispatcher();
        dispatcher.register_observer(Arc::new(Nop));
        assert!(dispatcher.observer.read().is_some());
        dispatcher.unregister_observer();
        assert!(dispatcher.observer.read().is_none());
    }
}
