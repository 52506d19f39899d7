//! Identity of the host's two output channels.

use std::fmt;

/// One of the host's standard output channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// The host's primary output (`System.out` for a JVM host).
    Primary,
    /// The host's error output (`System.err` for a JVM host).
    Error,
}

impl Channel {
    /// Both channels, primary first.
    pub const ALL: [Self; 2] = [Self::Primary, Self::Error];

    /// Stable lowercase label used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
