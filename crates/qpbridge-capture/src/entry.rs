//! Structured records recovered from host output.

use std::fmt;

/// Origin and level recorded for text that precedes any structured header.
pub const UNMATCHED: &str = "NONE";

/// Severity at which a [`LogEntry`] is dispatched to the log sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Diagnostic detail.
    Debug,
    /// Routine output; also the fallback for unknown level tokens.
    Info,
    /// Recoverable problems.
    Warning,
    /// Failures reported by the host.
    Error,
}

impl Severity {
    /// Maps a host level token onto a severity.
    ///
    /// The host's level vocabulary is informal, so the token is checked by
    /// case-sensitive containment in a fixed order: `WARN`, then `ERR`, then
    /// `DEBUG`; anything else is [`Severity::Info`].
    #[must_use]
    pub fn from_level_token(token: &str) -> Self {
        if token.contains("WARN") {
            Self::Warning
        } else if token.contains("ERR") {
            Self::Error
        } else if token.contains("DEBUG") {
            Self::Debug
        } else {
            Self::Info
        }
    }

    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One attributable unit of host output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    origin: String,
    level: String,
    message: String,
}

impl LogEntry {
    /// Builds an entry from its parts.
    #[must_use]
    pub fn new(
        origin: impl Into<String>,
        level: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            level: level.into(),
            message: message.into(),
        }
    }

    /// Source identifier reported by the host, or [`UNMATCHED`].
    #[must_use]
    pub fn origin(&self) -> &str {
        self.origin.as_str()
    }

    /// Normalised level token reported by the host, or [`UNMATCHED`].
    #[must_use]
    pub fn level(&self) -> &str {
        self.level.as_str()
    }

    /// Message text, possibly spanning several lines.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Severity derived from the level token.
    #[must_use]
    pub fn severity(&self) -> Severity {
        Severity::from_level_token(&self.level)
    }
}
