//! Error types surfaced by the capture layer.

use std::fmt;

use thiserror::Error;

use crate::channel::Channel;
use crate::console::HostConsoleError;

/// Console call being executed when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOperation {
    /// Reading the host's current target.
    ReadTarget,
    /// Installing the drain buffer as the host's target.
    InstallTarget,
    /// Putting the host's original target back.
    RestoreTarget,
}

impl fmt::Display for ConsoleOperation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ReadTarget => "reading the current target",
            Self::InstallTarget => "installing the capture buffer",
            Self::RestoreTarget => "restoring the original target",
        };
        formatter.write_str(label)
    }
}

/// Errors returned when engaging or releasing output capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Capture could not be engaged; no redirection was left active.
    #[error("failed to capture the host's {channel} channel while {operation}: {source}")]
    Install {
        /// Channel being captured.
        channel: Channel,
        /// Console call that failed.
        operation: ConsoleOperation,
        /// Underlying console failure.
        #[source]
        source: HostConsoleError,
    },

    /// The original target could not be restored; the capture buffer stays
    /// installed until a later release succeeds.
    #[error("failed to release the host's {channel} channel while {operation}: {source}")]
    Restore {
        /// Channel being released.
        channel: Channel,
        /// Console call that failed.
        operation: ConsoleOperation,
        /// Underlying console failure.
        #[source]
        source: HostConsoleError,
    },

    /// No process-wide registry has been installed yet.
    #[error("no capture registry has been installed for this process")]
    NotInstalled,

    /// A process-wide registry is already installed.
    #[error("a capture registry is already installed for this process")]
    AlreadyInstalled,
}

impl CaptureError {
    pub(crate) const fn install(
        channel: Channel,
        operation: ConsoleOperation,
        source: HostConsoleError,
    ) -> Self {
        Self::Install {
            channel,
            operation,
            source,
        }
    }

    pub(crate) const fn restore(channel: Channel, source: HostConsoleError) -> Self {
        Self::Restore {
            channel,
            operation: ConsoleOperation::RestoreTarget,
            source,
        }
    }

    /// Channel involved in the failure, when there is one.
    #[must_use]
    pub const fn channel(&self) -> Option<Channel> {
        match self {
            Self::Install { channel, .. } | Self::Restore { channel, .. } => Some(*channel),
            Self::NotInstalled | Self::AlreadyInstalled => None,
        }
    }
}
