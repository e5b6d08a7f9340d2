//! Per-document processing leases.
//!
//! The two document stages mutate their row with plain last-writer-wins
//! updates, so two concurrent runs for the same document would silently
//! clobber each other. The trigger endpoints take a lease before spawning a
//! stage and refuse a second trigger while one is held. In-process only:
//! a single worker instance owns a document's pipeline.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// Registry of documents with a stage currently in flight.
#[derive(Debug, Default)]
pub struct DocumentLeases {
    held: Mutex<HashSet<Uuid>>,
}

impl DocumentLeases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the lease for `document_id`.
    ///
    /// Returns `None` when a stage already holds it. The lease is released
    /// when the returned guard drops.
    pub fn acquire(self: Arc<Self>, document_id: Uuid) -> Option<DocumentLease> {
        let mut held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        if !held.insert(document_id) {
            return None;
        }
        drop(held);
        Some(DocumentLease {
            registry: self,
            document_id,
        })
    }

    fn release(&self, document_id: Uuid) {
        self.held
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&document_id);
    }
}

/// RAII guard for one document's pipeline slot.
#[derive(Debug)]
pub struct DocumentLease {
    registry: Arc<DocumentLeases>,
    document_id: Uuid,
}

impl Drop for DocumentLease {
    fn drop(&mut self) {
        self.registry.release(self.document_id);
    }
}
