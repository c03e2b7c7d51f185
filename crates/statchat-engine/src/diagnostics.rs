//! Diagnostics sink for the most recent call's processing details.
//!
//! Last writer wins: under concurrent calls the value is whichever call
//! published last. Callers that need their own call's details should read
//! them from the returned response instead.

use statchat_core::ProcessingDetails;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct DiagnosticsSink {
    tx: Arc<watch::Sender<Option<ProcessingDetails>>>,
}

impl DiagnosticsSink {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn publish(&self, details: ProcessingDetails) {
        self.tx.send_replace(Some(details));
    }

    pub fn latest(&self) -> Option<ProcessingDetails> {
        self.tx.borrow().clone()
    }

    /// Notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<Option<ProcessingDetails>> {
        self.tx.subscribe()
    }
}

impl Default for DiagnosticsSink {
    fn default() -> Self {
        Self::new()
    }
}
