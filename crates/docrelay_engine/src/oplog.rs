//! Durable operation log.
//!
//! The log is the only shared mutable resource in the core. Implementations
//! wrap whatever row storage the host application provides and must be
//! atomic and durable at row granularity before returning. A row is
//! identified by (table, document id).

use crate::error::{EngineError, EngineResult};
use docrelay_protocol::PendingOperation;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

/// Durable queue of pending mutations, keyed by table.
pub trait OperationLog: Send + Sync {
    /// Appends a new pending operation. Storage errors propagate; an
    /// enqueue never fails silently.
    fn enqueue(&self, op: PendingOperation) -> EngineResult<()>;

    /// Returns all live pending entries for a table in enqueue order.
    fn list_pending(&self, table: &str) -> EngineResult<Vec<PendingOperation>>;

    /// Clears the pending marker on the row, optionally overwriting the
    /// stored etag/document with values from a remote response. The row
    /// persists as last-known local state but is never replayed.
    fn finalize(
        &self,
        op: &PendingOperation,
        etag: Option<&str>,
        document: Option<&Value>,
    ) -> EngineResult<()>;

    /// Removes the row entirely. Used only when the queued intent is void.
    fn discard(&self, op: &PendingOperation) -> EngineResult<()>;
}

#[derive(Debug, Clone)]
struct Row {
    op: PendingOperation,
    pending: bool,
}

/// An in-memory operation log for tests and embedding.
///
/// Rows live in per-table vectors in enqueue order. Enqueueing a second
/// mutation for a (table, document id) that already has a live row replaces
/// that row in place, so the later mutation supersedes the earlier one
/// without losing its queue position.
#[derive(Debug, Default)]
pub struct MemoryOperationLog {
    tables: Mutex<HashMap<String, Vec<Row>>>,
}

impl MemoryOperationLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored row for (table, document id), pending or not.
    pub fn row(&self, table: &str, document_id: &str) -> Option<PendingOperation> {
        self.tables
            .lock()
            .get(table)
            .and_then(|rows| rows.iter().find(|r| r.op.document_id == document_id))
            .map(|r| r.op.clone())
    }

    /// Returns true if the row exists and is still pending.
    pub fn is_pending(&self, table: &str, document_id: &str) -> bool {
        self.tables
            .lock()
            .get(table)
            .and_then(|rows| rows.iter().find(|r| r.op.document_id == document_id))
            .map(|r| r.pending)
            .unwrap_or(false)
    }

    /// Returns the number of rows stored for a table, pending or not.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.lock().get(table).map(Vec::len).unwrap_or(0)
    }
}

impl OperationLog for MemoryOperationLog {
    fn enqueue(&self, op: PendingOperation) -> EngineResult<()> {
        let mut tables = self.tables.lock();
        let rows = tables.entry(op.table.clone()).or_default();

        if let Some(existing) = rows.iter_mut().find(|r| r.op.document_id == op.document_id) {
            existing.op = op;
            existing.pending = true;
        } else {
            rows.push(Row { op, pending: true });
        }
        Ok(())
    }

    fn list_pending(&self, table: &str) -> EngineResult<Vec<PendingOperation>> {
        Ok(self
            .tables
            .lock()
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.pending)
                    .map(|r| r.op.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn finalize(
        &self,
        op: &PendingOperation,
        etag: Option<&str>,
        document: Option<&Value>,
    ) -> EngineResult<()> {
        let mut tables = self.tables.lock();
        let row = tables
            .get_mut(&op.table)
            .and_then(|rows| rows.iter_mut().find(|r| r.op.document_id == op.document_id))
            .ok_or_else(|| {
                EngineError::Storage(format!(
                    "no row for {} in table {}",
                    op.document_id, op.table
                ))
            })?;

        row.pending = false;
        if let Some(etag) = etag {
            row.op.etag = Some(etag.to_string());
        }
        if let Some(document) = document {
            row.op.document = Some(document.clone());
        }
        Ok(())
    }

    fn discard(&self, op: &PendingOperation) -> EngineResult<()> {
        let mut tables = self.tables.lock();
        if let Some(rows) = tables.get_mut(&op.table) {
            rows.retain(|r| r.op.document_id != op.document_id);
        }
        Ok(())
    }
}
