//! Capture of an embedded host's console output as structured log records.
//!
//! A long-lived host application (a JVM desktop application, typically)
//! writes its diagnostics to two output channels. This crate temporarily
//! points those channels at in-memory [`DrainBuffer`]s, splits what the host
//! wrote into [`LogEntry`] records, and re-emits each one through a
//! [`LogSink`] at the matching [`Severity`].
//!
//! Capture is reentrant. Every channel has one [`CapturedStream`] per
//! process, held by a [`CaptureRegistry`]; nested or concurrent users only
//! deepen its reentrancy count, and the host's original targets return when
//! the last user releases. [`RedirectScope`] engages both channels at once
//! behind a guard, so call sites never pair acquisitions by hand.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use qpbridge_capture::{Channel, CaptureRegistry, InProcessConsole, RedirectScope, TracingSink};
//! use qpbridge_config::CaptureConfig;
//!
//! let console = Arc::new(InProcessConsole::new());
//! let registry = Arc::new(CaptureRegistry::new(console.clone(), Arc::new(TracingSink)));
//! let scope = RedirectScope::new(registry.clone(), CaptureConfig::both());
//!
//! scope.run(|| {
//!     console
//!         .write(Channel::Primary, b"12:00:00.000 [main] [INFO] q.App - started\n")
//!         .ok();
//!     assert!(registry.stream(Channel::Primary).pending_bytes() > 0);
//! })?;
//! assert_eq!(registry.stream(Channel::Primary).active_count(), 0);
//! # Ok::<(), qpbridge_capture::CaptureError>(())
//! ```

mod buffer;
mod channel;
mod console;
mod entry;
mod errors;
mod parser;
mod registry;
mod rollback;
mod scope;
mod sink;
mod stream;
pub mod telemetry;

/// Tracing target for the capture layer's own lifecycle events.
pub(crate) const CAPTURE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::capture");

pub use buffer::DrainBuffer;
pub use channel::Channel;
pub use console::{HostConsole, HostConsoleError, InProcessConsole, OutputTarget};
pub use entry::{LogEntry, Severity, UNMATCHED};
pub use errors::{CaptureError, ConsoleOperation};
pub use parser::parse_entries;
pub use registry::{CaptureRegistry, acquire, flush, global, install_global, release};
pub use scope::{RedirectGuard, RedirectScope};
pub use sink::{HOST_LOG_TARGET, LogSink, TracingSink};
pub use stream::CapturedStream;

#[cfg(test)]
mod tests;
