//! Shared fixtures and test doubles for capture tests.

mod flaky_console;
mod recording_sink;
mod world;

use std::sync::Arc;

use rstest::fixture;

pub use flaky_console::FlakyConsole;
pub use recording_sink::{RecordedEntry, RecordingSink};
pub use world::{TestWorld, WorkError};

use crate::CaptureRegistry;

/// Console, sink and registry wired together.
pub struct Harness {
    /// Host console under capture.
    pub console: Arc<FlakyConsole>,
    /// Sink receiving dispatched entries.
    pub sink: RecordingSink,
    /// Registry driving both channels.
    pub registry: Arc<CaptureRegistry>,
}

/// Builds a fresh harness with an idle console.
#[fixture]
pub fn harness() -> Harness {
    let console = Arc::new(FlakyConsole::new());
    let sink = RecordingSink::default();
    let registry = Arc::new(CaptureRegistry::new(
        Arc::clone(&console) as Arc<dyn crate::HostConsole>,
        Arc::new(sink.clone()),
    ));
    Harness {
        console,
        sink,
        registry,
    }
}

/// A structured host line at `level`.
#[must_use]
pub fn host_line(level: &str, origin: &str, message: &str) -> String {
    format!("10:15:30.250 [JavaFX Application Thread] [{level}] {origin} - {message}\n")
}
