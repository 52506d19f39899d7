//! Boundary to the host process's output channels.
//!
//! A host exposes, per [`Channel`], a live output target that it writes
//! into. The capture layer reads that target, swaps in its own drain buffer,
//! and later puts the original back. [`HostConsole`] is the seam: a JVM bridge
//! implements it over `System.setOut`/`System.setErr`, while
//! [`InProcessConsole`] serves hosts that run inside the embedding process and
//! write through swappable handles.

use std::error::Error;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use qpbridge_config::HostLogLevel;
use thiserror::Error;

use crate::channel::Channel;

/// Shareable byte sink a host channel can point at.
///
/// Clones refer to the same underlying writer; [`OutputTarget::same_as`]
/// compares that identity.
#[derive(Clone)]
pub struct OutputTarget {
    writer: Arc<Mutex<dyn Write + Send>>,
}

impl OutputTarget {
    /// Wraps a writer as an installable target.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// Target writing to the embedding process's stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Target writing to the embedding process's stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Whether both handles refer to the same writer.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.writer), Arc::as_ptr(&other.writer))
    }

    /// Writes all bytes and flushes the underlying writer.
    pub fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(bytes)?;
        writer.flush()
    }
}

impl fmt::Debug for OutputTarget {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("OutputTarget")
            .field("writer", &Arc::as_ptr(&self.writer).cast::<()>())
            .finish()
    }
}

/// Errors reported by [`HostConsole`] implementations.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HostConsoleError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl HostConsoleError {
    /// Builds an error without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-friendly description without the optional source.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Access to a host process's output channels.
pub trait HostConsole: Send + Sync {
    /// Returns the host's current target for `channel`.
    fn current_target(&self, channel: Channel) -> Result<OutputTarget, HostConsoleError>;

    /// Points the host's `channel` at `target`.
    fn set_target(&self, channel: Channel, target: OutputTarget) -> Result<(), HostConsoleError>;

    /// Sets the verbosity of the host's own logging framework.
    ///
    /// Hosts without a configurable framework keep the default no-op.
    fn apply_log_level(&self, _level: HostLogLevel) -> Result<(), HostConsoleError> {
        Ok(())
    }
}

struct Targets {
    primary: OutputTarget,
    error: OutputTarget,
    log_level: Option<HostLogLevel>,
}

impl Targets {
    const fn slot(&mut self, channel: Channel) -> &mut OutputTarget {
        match channel {
            Channel::Primary => &mut self.primary,
            Channel::Error => &mut self.error,
        }
    }
}

/// Console for a host running inside the embedding process.
///
/// Both channels start out pointing at the process's stdout and stderr. The
/// host writes through [`InProcessConsole::write`], which always resolves the
/// live target at the moment of writing.
pub struct InProcessConsole {
    targets: Mutex<Targets>,
}

impl InProcessConsole {
    /// Console whose channels point at the process's stdout/stderr.
    #[must_use]
    pub fn new() -> Self {
        Self::with_targets(OutputTarget::stdout(), OutputTarget::stderr())
    }

    /// Console whose channels start at the supplied targets.
    #[must_use]
    pub const fn with_targets(primary: OutputTarget, error: OutputTarget) -> Self {
        Self {
            targets: Mutex::new(Targets {
                primary,
                error,
                log_level: None,
            }),
        }
    }

    /// Writes `bytes` to the live target of `channel`, as the host would.
    ///
    /// The target stays locked for the whole write, so a concurrent
    /// [`HostConsole::set_target`] lands either before or after it.
    pub fn write(&self, channel: Channel, bytes: &[u8]) -> io::Result<()> {
        let mut targets = self.lock();
        targets.slot(channel).write_all(bytes)
    }

    /// Level most recently applied through [`HostConsole::apply_log_level`].
    #[must_use]
    pub fn log_level(&self) -> Option<HostLogLevel> {
        self.lock().log_level
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Targets> {
        self.targets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InProcessConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InProcessConsole {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let targets = self.lock();
        formatter
            .debug_struct("InProcessConsole")
            .field("primary", &targets.primary)
            .field("error", &targets.error)
            .field("log_level", &targets.log_level)
            .finish()
    }
}

impl HostConsole for InProcessConsole {
    fn current_target(&self, channel: Channel) -> Result<OutputTarget, HostConsoleError> {
        Ok(self.lock().slot(channel).clone())
    }

    fn set_target(&self, channel: Channel, target: OutputTarget) -> Result<(), HostConsoleError> {
        *self.lock().slot(channel) = target;
        Ok(())
    }

    fn apply_log_level(&self, level: HostLogLevel) -> Result<(), HostConsoleError> {
        self.lock().log_level = Some(level);
        Ok(())
    }
}
