//! BDD test world wrapping a registry over a flaky console.

use std::sync::Arc;

use qpbridge_config::CaptureConfig;

use crate::{CaptureError, Channel, RedirectGuard, RedirectScope};

use super::{FlakyConsole, Harness, RecordingSink, harness};

/// Error raised by the unit of work in failing-work scenarios.
#[derive(Debug)]
pub enum WorkError {
    /// The work itself failed.
    Failed(String),
    /// Capture could not be engaged or released.
    Capture(CaptureError),
}

impl From<CaptureError> for WorkError {
    fn from(error: CaptureError) -> Self {
        Self::Capture(error)
    }
}

/// Shared state exercised by BDD step implementations.
pub struct TestWorld {
    harness: Harness,
    guards: Vec<RedirectGuard>,
    /// Last capture error observed.
    pub last_error: Option<CaptureError>,
    /// Last error returned by a unit of work.
    pub last_work_error: Option<WorkError>,
    /// Entry count returned by the last flush.
    pub last_flush: Option<usize>,
}

impl TestWorld {
    /// World over an idle console.
    pub fn new() -> Self {
        Self {
            harness: harness(),
            guards: Vec::new(),
            last_error: None,
            last_work_error: None,
            last_flush: None,
        }
    }

    /// Host console.
    pub fn console(&self) -> &Arc<FlakyConsole> {
        &self.harness.console
    }

    /// Sink receiving entries.
    pub fn sink(&self) -> &RecordingSink {
        &self.harness.sink
    }

    /// Scope over both channels.
    pub fn scope(&self) -> RedirectScope {
        RedirectScope::new(Arc::clone(&self.harness.registry), CaptureConfig::both())
    }

    /// Enters a scope and keeps its guard.
    pub fn enter_scope(&mut self) {
        self.last_error = None;
        match self.scope().enter() {
            Ok(guard) => self.guards.push(guard),
            Err(error) => self.last_error = Some(error),
        }
    }

    /// Exits the most recently entered scope.
    pub fn exit_scope(&mut self) {
        let guard = self.guards.pop().expect("no scope to exit");
        if let Err(error) = guard.exit() {
            self.last_error = Some(error);
        }
    }

    /// Runs work that logs an error line and then fails.
    pub fn run_failing_work(&mut self) {
        let console = Arc::clone(self.console());
        let outcome: Result<(), WorkError> = self.scope().run_fallible(|| {
            console.write(
                Channel::Error,
                &super::host_line("ERROR", "q.lib.Project", "project is corrupt"),
            );
            Err(WorkError::Failed(String::from("work failed")))
        });
        self.last_work_error = outcome.err();
    }

    /// Flushes `channel` and remembers the entry count.
    pub fn flush(&mut self, channel: Channel) {
        self.last_flush = Some(self.harness.registry.flush(channel));
    }

    /// Reentrancy depth of `channel`.
    pub fn depth(&self, channel: Channel) -> usize {
        self.harness.registry.stream(channel).active_count()
    }
}
