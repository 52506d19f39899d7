//! Process-wide pair of captured streams.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::channel::Channel;
use crate::console::HostConsole;
use crate::errors::CaptureError;
use crate::sink::LogSink;
use crate::stream::CapturedStream;

static GLOBAL_REGISTRY: OnceCell<Arc<CaptureRegistry>> = OnceCell::new();

/// The two captured streams of one host, sharing a console and a sink.
#[derive(Debug)]
pub struct CaptureRegistry {
    primary: CapturedStream,
    error: CapturedStream,
}

impl CaptureRegistry {
    /// Builds idle streams for both channels of `console`.
    #[must_use]
    pub fn new(console: Arc<dyn HostConsole>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            primary: CapturedStream::new(Channel::Primary, Arc::clone(&console), Arc::clone(&sink)),
            error: CapturedStream::new(Channel::Error, console, sink),
        }
    }

    /// Stream capturing `channel`.
    #[must_use]
    pub const fn stream(&self, channel: Channel) -> &CapturedStream {
        match channel {
            Channel::Primary => &self.primary,
            Channel::Error => &self.error,
        }
    }

    /// See [`CapturedStream::acquire`].
    pub fn acquire(&self, channel: Channel) -> Result<usize, CaptureError> {
        self.stream(channel).acquire()
    }

    /// See [`CapturedStream::release`].
    pub fn release(&self, channel: Channel) -> Result<usize, CaptureError> {
        self.stream(channel).release()
    }

    /// See [`CapturedStream::flush`].
    pub fn flush(&self, channel: Channel) -> usize {
        self.stream(channel).flush()
    }

    /// Flushes both channels, error first, and returns the entry count.
    pub fn flush_all(&self) -> usize {
        self.error.flush() + self.primary.flush()
    }
}

/// Installs the process-wide registry for `console`.
///
/// A process drives a single host, so only the first call succeeds.
pub fn install_global(
    console: Arc<dyn HostConsole>,
    sink: Arc<dyn LogSink>,
) -> Result<Arc<CaptureRegistry>, CaptureError> {
    let registry = Arc::new(CaptureRegistry::new(console, sink));
    GLOBAL_REGISTRY
        .set(Arc::clone(&registry))
        .map_err(|_| CaptureError::AlreadyInstalled)?;
    Ok(registry)
}

/// Returns the process-wide registry.
pub fn global() -> Result<Arc<CaptureRegistry>, CaptureError> {
    GLOBAL_REGISTRY
        .get()
        .map(Arc::clone)
        .ok_or(CaptureError::NotInstalled)
}

/// Acquires `channel` on the process-wide registry.
pub fn acquire(channel: Channel) -> Result<usize, CaptureError> {
    global()?.acquire(channel)
}

/// Releases `channel` on the process-wide registry.
pub fn release(channel: Channel) -> Result<usize, CaptureError> {
    global()?.release(channel)
}

/// Flushes `channel` on the process-wide registry.
///
/// Without an installed registry there is nothing to flush.
#[must_use]
pub fn flush(channel: Channel) -> usize {
    GLOBAL_REGISTRY
        .get()
        .map_or(0, |registry| registry.flush(channel))
}
