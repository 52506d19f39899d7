//! Scoped capture of both host channels.

use std::sync::Arc;

use qpbridge_config::CaptureConfig;
use tracing::warn;

use crate::CAPTURE_TARGET;
use crate::channel::Channel;
use crate::errors::CaptureError;
use crate::registry::{self, CaptureRegistry};
use crate::rollback::UndoStack;

/// Captures the configured channels for the duration of a guarded region.
///
/// Scopes nest freely: entering an already-captured channel only deepens its
/// reentrancy count, and the host's targets come back when the outermost
/// guard is gone.
#[derive(Debug, Clone)]
pub struct RedirectScope {
    registry: Arc<CaptureRegistry>,
    config: CaptureConfig,
}

impl RedirectScope {
    /// Scope over `registry` covering the channels selected by `config`.
    #[must_use]
    pub const fn new(registry: Arc<CaptureRegistry>, config: CaptureConfig) -> Self {
        Self { registry, config }
    }

    /// Scope over the process-wide registry.
    pub fn global(config: CaptureConfig) -> Result<Self, CaptureError> {
        Ok(Self::new(registry::global()?, config))
    }

    /// Channel selection of this scope.
    #[must_use]
    pub const fn config(&self) -> CaptureConfig {
        self.config
    }

    /// Acquires the selected channels, error channel first.
    ///
    /// If a later channel fails to engage, the channels already acquired are
    /// released before the error is returned.
    pub fn enter(&self) -> Result<RedirectGuard, CaptureError> {
        let mut undo: UndoStack<()> = UndoStack::new();
        let mut acquired = Vec::with_capacity(2);

        for channel in self.channels() {
            if let Err(error) = self.registry.acquire(channel) {
                undo.unwind(&mut ());
                return Err(error);
            }
            let registry = Arc::clone(&self.registry);
            undo.push(move |_: &mut ()| release_logged(&registry, channel));
            acquired.push(channel);
        }

        undo.commit();
        Ok(RedirectGuard {
            registry: Arc::clone(&self.registry),
            acquired,
        })
    }

    /// Runs `work` with the selected channels captured.
    ///
    /// The channels are released whether `work` returns or panics.
    pub fn run<T>(&self, work: impl FnOnce() -> T) -> Result<T, CaptureError> {
        let guard = self.enter()?;
        let output = work();
        guard.exit()?;
        Ok(output)
    }

    /// Runs fallible `work` with the selected channels captured.
    ///
    /// The channels are released before an error from `work` reaches the
    /// caller.
    pub fn run_fallible<T, E>(&self, work: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<CaptureError>,
    {
        let guard = self.enter()?;
        match work() {
            Ok(output) => {
                guard.exit()?;
                Ok(output)
            }
            Err(error) => {
                drop(guard);
                Err(error)
            }
        }
    }

    /// Wraps `work` so every invocation runs inside this scope.
    pub fn wrap<T, F>(&self, work: F) -> impl Fn() -> Result<T, CaptureError> + use<T, F>
    where
        F: Fn() -> T,
    {
        let scope = self.clone();
        move || scope.run(&work)
    }

    fn channels(&self) -> Vec<Channel> {
        let mut channels = Vec::with_capacity(2);
        if self.config.capture_error {
            channels.push(Channel::Error);
        }
        if self.config.capture_primary {
            channels.push(Channel::Primary);
        }
        channels
    }
}

/// Active capture returned by [`RedirectScope::enter`].
///
/// Dropping the guard releases its channels in reverse acquisition order;
/// [`RedirectGuard::exit`] does the same and reports failures.
#[must_use = "capture ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct RedirectGuard {
    registry: Arc<CaptureRegistry>,
    acquired: Vec<Channel>,
}

impl RedirectGuard {
    /// Channels held by this guard, in acquisition order.
    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        &self.acquired
    }

    /// Releases every held channel and returns the first failure.
    ///
    /// All channels are released even when an earlier one fails.
    pub fn exit(mut self) -> Result<(), CaptureError> {
        let mut first_error = None;
        while let Some(channel) = self.acquired.pop() {
            if let Err(error) = self.registry.release(channel) {
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for RedirectGuard {
    fn drop(&mut self) {
        while let Some(channel) = self.acquired.pop() {
            release_logged(&self.registry, channel);
        }
    }
}

fn release_logged(registry: &CaptureRegistry, channel: Channel) {
    if let Err(error) = registry.release(channel) {
        warn!(
            target: CAPTURE_TARGET,
            channel = %channel,
            error = %error,
            "failed to release host output capture"
        );
    }
}
