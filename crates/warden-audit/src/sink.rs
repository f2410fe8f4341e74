//! The audit sink seam and its in-memory reference implementation.
//!
//! Any durable, queryable store can back the audit trail — the engine only
//! requires `insert` to acknowledge before returning. The in-memory sink is
//! the reference implementation used by tests and the demo.

use std::fmt;
use std::sync::{Arc, Mutex};

use warden_contracts::audit::AuditRecord;

/// A failed sink insert.
///
/// `transient` tells the logger whether retrying can help: a full disk or
/// closed connection may recover, a schema rejection will not.
#[derive(Debug, Clone)]
pub struct SinkError {
    pub reason: String,
    pub transient: bool,
}

impl SinkError {
    pub fn transient(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            transient: true,
        }
    }

    pub fn permanent(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            transient: false,
        }
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.reason,
            if self.transient { "transient" } else { "permanent" }
        )
    }
}

/// An append-only audit store.
///
/// `insert` must not return `Ok` until the record is durable by the sink's
/// own definition — the logger treats the acknowledgment as permission to
/// release the evaluation result.
pub trait AuditSink: Send + Sync {
    fn insert(&self, record: &AuditRecord) -> Result<(), SinkError>;
}

/// In-memory, append-only audit sink.
///
/// Thread-safe via an internal `Mutex`; clones share the same backing
/// store, so a test can keep a handle while the logger owns another.
#[derive(Clone, Default)]
pub struct InMemoryAuditSink {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records in append order.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().expect("audit sink lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("audit sink lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for InMemoryAuditSink {
    fn insert(&self, record: &AuditRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .map_err(|e| SinkError::permanent(format!("audit sink lock poisoned: {e}")))?
            .push(record.clone());
        Ok(())
    }
}
