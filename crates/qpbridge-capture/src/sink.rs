//! Destination for parsed host log entries.

use tracing::{debug, error, info, warn};

use crate::entry::Severity;

/// Tracing target under which host records are re-emitted.
pub const HOST_LOG_TARGET: &str = "qupath";

/// Leveled logging facility receiving one call per parsed entry.
pub trait LogSink: Send + Sync {
    /// Records `message` attributed to `origin` at `severity`.
    fn log(&self, severity: Severity, origin: &str, message: &str);
}

/// Sink that re-emits host records as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, severity: Severity, origin: &str, message: &str) {
        match severity {
            Severity::Debug => debug!(target: HOST_LOG_TARGET, origin, "{message}"),
            Severity::Info => info!(target: HOST_LOG_TARGET, origin, "{message}"),
            Severity::Warning => warn!(target: HOST_LOG_TARGET, origin, "{message}"),
            // Host errors are reported, never raised.
            Severity::Error => error!(target: HOST_LOG_TARGET, origin, "{message}"),
        }
    }
}
