//! Shared configuration for the host output bridge.
//!
//! The embedding process and its tests agree on one [`Config`] value: the
//! tracing filter and output format used for the embedding process's own
//! logs, the level the host's logging framework should be set to, and which
//! host channels a redirection scope captures by default.

mod capture;
mod defaults;
mod logging;

use serde::{Deserialize, Serialize};

pub use capture::CaptureConfig;
pub use defaults::{
    DEFAULT_LOG_FILTER, default_host_log_level, default_log_filter, default_log_filter_string,
    default_log_format,
};
pub use logging::{HostLogLevel, HostLogLevelParseError, LogFormat, LogFormatParseError};

/// Top-level configuration consumed by the capture crate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Tracing filter expression for the embedding process.
    pub log_filter: String,
    /// Output format of the embedding process's subscriber.
    pub log_format: LogFormat,
    /// Level forwarded to the host's own logging framework.
    pub host_log_level: HostLogLevel,
    /// Channels captured by a redirection scope built from this config.
    pub capture: CaptureConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            host_log_level: default_host_log_level(),
            capture: CaptureConfig::default(),
        }
    }
}

impl Config {
    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Subscriber output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Level applied to the host's logging framework.
    #[must_use]
    pub const fn host_log_level(&self) -> HostLogLevel {
        self.host_log_level
    }

    /// Default channel selection for redirection scopes.
    #[must_use]
    pub const fn capture(&self) -> CaptureConfig {
        self.capture
    }
}
