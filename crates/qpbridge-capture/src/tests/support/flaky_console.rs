//! Host console double with failure injection.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use qpbridge_config::HostLogLevel;

use crate::{Channel, DrainBuffer, HostConsole, HostConsoleError, InProcessConsole, OutputTarget};

#[derive(Default)]
struct Faults {
    reads: HashSet<Channel>,
    installs: HashSet<Channel>,
    restores: HashSet<Channel>,
    ignored: HashSet<Channel>,
    set_calls: HashMap<Channel, usize>,
}

/// Console whose original targets are inspectable buffers and whose calls
/// can be made to fail per channel.
pub struct FlakyConsole {
    inner: InProcessConsole,
    terminal_primary: DrainBuffer,
    terminal_error: DrainBuffer,
    originals: [OutputTarget; 2],
    faults: Mutex<Faults>,
}

impl FlakyConsole {
    /// Console with both channels on their original terminals.
    pub fn new() -> Self {
        let terminal_primary = DrainBuffer::new();
        let terminal_error = DrainBuffer::new();
        let primary = terminal_primary.target();
        let error = terminal_error.target();
        Self {
            inner: InProcessConsole::with_targets(primary.clone(), error.clone()),
            terminal_primary,
            terminal_error,
            originals: [primary, error],
            faults: Mutex::new(Faults::default()),
        }
    }

    /// Makes reading the target of `channel` fail.
    pub fn fail_read(&self, channel: Channel) {
        self.faults().reads.insert(channel);
    }

    /// Makes installing a capture buffer on `channel` fail.
    pub fn fail_install(&self, channel: Channel) {
        self.faults().installs.insert(channel);
    }

    /// Makes restoring the original target of `channel` fail.
    pub fn fail_restore(&self, channel: Channel) {
        self.faults().restores.insert(channel);
    }

    /// Makes `channel` accept capture buffers without adopting them.
    pub fn ignore_install(&self, channel: Channel) {
        self.faults().ignored.insert(channel);
    }

    /// Removes every injected fault.
    pub fn clear_faults(&self) {
        let mut faults = self.faults();
        faults.reads.clear();
        faults.installs.clear();
        faults.restores.clear();
        faults.ignored.clear();
    }

    /// Number of `set_target` calls that reached `channel`.
    pub fn set_calls(&self, channel: Channel) -> usize {
        self.faults().set_calls.get(&channel).copied().unwrap_or(0)
    }

    /// Writes `text` to the live target of `channel`.
    pub fn write(&self, channel: Channel, text: &str) {
        self.inner
            .write(channel, text.as_bytes())
            .expect("host write failed");
    }

    /// Whether `channel` points at its original terminal.
    pub fn is_original(&self, channel: Channel) -> bool {
        let live = self
            .inner
            .current_target(channel)
            .expect("in-process console never fails");
        live.same_as(self.original(channel))
    }

    /// Everything that reached the original terminal of `channel`.
    pub fn terminal_text(&self, channel: Channel) -> String {
        match channel {
            Channel::Primary => self.terminal_primary.take_text(),
            Channel::Error => self.terminal_error.take_text(),
        }
    }

    /// Level applied to the host's logging framework.
    pub fn log_level(&self) -> Option<HostLogLevel> {
        self.inner.log_level()
    }

    fn original(&self, channel: Channel) -> &OutputTarget {
        let [primary, error] = &self.originals;
        match channel {
            Channel::Primary => primary,
            Channel::Error => error,
        }
    }

    fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().expect("fault mutex poisoned")
    }
}

impl HostConsole for FlakyConsole {
    fn current_target(&self, channel: Channel) -> Result<OutputTarget, HostConsoleError> {
        if self.faults().reads.contains(&channel) {
            return Err(HostConsoleError::new(format!("cannot read {channel} target")));
        }
        self.inner.current_target(channel)
    }

    fn set_target(&self, channel: Channel, target: OutputTarget) -> Result<(), HostConsoleError> {
        let restoring = target.same_as(self.original(channel));
        {
            let mut faults = self.faults();
            if restoring && faults.restores.contains(&channel) {
                return Err(HostConsoleError::new(format!("cannot restore {channel}")));
            }
            if !restoring && faults.installs.contains(&channel) {
                return Err(HostConsoleError::new(format!("cannot capture {channel}")));
            }
            *faults.set_calls.entry(channel).or_default() += 1;
            if !restoring && faults.ignored.contains(&channel) {
                return Ok(());
            }
        }
        self.inner.set_target(channel, target)
    }

    fn apply_log_level(&self, level: HostLogLevel) -> Result<(), HostConsoleError> {
        self.inner.apply_log_level(level)
    }
}
