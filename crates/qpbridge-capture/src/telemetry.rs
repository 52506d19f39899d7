//! Structured telemetry initialisation for the embedding process.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use qpbridge_config::{Config, LogFormat};
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::filter::{Directive, EnvFilter};
use tracing_subscriber::fmt::{self, time::UtcTime};

use crate::console::{HostConsole, HostConsoleError};
use crate::sink::HOST_LOG_TARGET;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Repeated calls are idempotent: the first invocation installs the global
/// subscriber, later ones return a fresh [`TelemetryHandle`] without touching
/// global state. Host records re-emitted by [`crate::TracingSink`] use the
/// [`crate::HOST_LOG_TARGET`] target, so a filter such as `qupath=warn`
/// narrows them independently of the embedding process's own logs. When the
/// filter does not name that target, host records pass at the configured
/// host log level.
///
/// # Examples
///
/// ```rust
/// use qpbridge_capture::telemetry;
/// use qpbridge_config::Config;
///
/// # fn main() -> Result<(), qpbridge_capture::telemetry::TelemetryError> {
/// let config = Config::default();
/// let first = telemetry::initialise(&config)?;
/// let second = telemetry::initialise(&config)?;
/// drop(first);
/// drop(second);
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| TelemetryHandle)
}

/// Forwards the configured host log level to the host's logging framework.
pub fn apply_host_log_level(
    console: &dyn HostConsole,
    config: &Config,
) -> Result<(), HostConsoleError> {
    console.apply_log_level(config.host_log_level())
}

/// Builds the subscriber filter for `config`.
///
/// Host records follow the host's own level unless the configured filter
/// already names [`HOST_LOG_TARGET`].
pub(crate) fn build_filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;
    if names_host_target(config.log_filter()) {
        return Ok(filter);
    }
    let directive = format!("{HOST_LOG_TARGET}={}", config.host_log_level())
        .parse::<Directive>()
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;
    Ok(filter.add_directive(directive))
}

fn names_host_target(filter: &str) -> bool {
    filter.split(',').any(|directive| {
        directive
            .trim()
            .split(['=', '['])
            .next()
            .is_some_and(|target| target == HOST_LOG_TARGET)
    })
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(build_filter(config)?)
        .with_target(true)
        .with_level(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}
