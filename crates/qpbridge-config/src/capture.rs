use serde::{Deserialize, Serialize};

/// Selects which host channels a redirection scope captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Capture the host's primary output channel.
    pub capture_primary: bool,
    /// Capture the host's error output channel.
    pub capture_error: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::both()
    }
}

impl CaptureConfig {
    /// Captures both channels.
    #[must_use]
    pub const fn both() -> Self {
        Self {
            capture_primary: true,
            capture_error: true,
        }
    }

    /// Captures only the primary channel.
    #[must_use]
    pub const fn primary_only() -> Self {
        Self {
            capture_primary: true,
            capture_error: false,
        }
    }

    /// Captures only the error channel.
    #[must_use]
    pub const fn error_only() -> Self {
        Self {
            capture_primary: false,
            capture_error: true,
        }
    }

    /// Whether neither channel is selected.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.capture_primary && !self.capture_error
    }
}
