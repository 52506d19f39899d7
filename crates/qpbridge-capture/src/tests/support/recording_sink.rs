//! Log sink double that keeps every dispatched entry.

use std::sync::{Arc, Mutex};

use crate::{LogSink, Severity};

/// Entry as received by the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEntry {
    /// Dispatch severity.
    pub severity: Severity,
    /// Origin reported by the host.
    pub origin: String,
    /// Message text.
    pub message: String,
}

/// Test double recording every `log` call.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    entries: Arc<Mutex<Vec<RecordedEntry>>>,
}

impl RecordingSink {
    /// Entries received so far, in dispatch order.
    pub fn entries(&self) -> Vec<RecordedEntry> {
        self.entries.lock().expect("sink mutex poisoned").clone()
    }

    /// Severities received so far, in dispatch order.
    pub fn severities(&self) -> Vec<Severity> {
        self.entries().into_iter().map(|entry| entry.severity).collect()
    }

    /// Number of entries received.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("sink mutex poisoned").len()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, severity: Severity, origin: &str, message: &str) {
        self.entries
            .lock()
            .expect("sink mutex poisoned")
            .push(RecordedEntry {
                severity,
                origin: origin.to_owned(),
                message: message.to_owned(),
            });
    }
}
