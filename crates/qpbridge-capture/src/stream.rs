//! Reentrant redirection of one host channel.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::CAPTURE_TARGET;
use crate::buffer::DrainBuffer;
use crate::channel::Channel;
use crate::console::{HostConsole, HostConsoleError, OutputTarget};
use crate::errors::{CaptureError, ConsoleOperation};
use crate::parser::parse_entries;
use crate::rollback::UndoStack;
use crate::sink::LogSink;

#[derive(Debug, Default)]
struct StreamState {
    default_target: Option<OutputTarget>,
    buffer: Option<DrainBuffer>,
    active_count: usize,
}

/// Capture state for one host channel.
///
/// Every [`acquire`](Self::acquire) must be paired with a
/// [`release`](Self::release). The first acquisition remembers the host's
/// target and installs a [`DrainBuffer`]; the matching last release puts the
/// remembered target back. Both transitions happen under one lock, so
/// concurrent callers never observe a half-installed redirection.
pub struct CapturedStream {
    channel: Channel,
    console: Arc<dyn HostConsole>,
    sink: Arc<dyn LogSink>,
    state: Mutex<StreamState>,
    flush_lock: Mutex<()>,
}

impl CapturedStream {
    /// Creates an idle stream for `channel`.
    #[must_use]
    pub fn new(channel: Channel, console: Arc<dyn HostConsole>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            channel,
            console,
            sink,
            state: Mutex::new(StreamState::default()),
            flush_lock: Mutex::new(()),
        }
    }

    /// Channel this stream captures.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.channel
    }

    /// Current reentrancy depth.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.lock_state().active_count
    }

    /// Whether a drain buffer is installed.
    ///
    /// An idle stream still reports `true` while a failed restore is pending.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.lock_state().buffer.is_some()
    }

    /// Target the host used before the outermost acquisition.
    #[must_use]
    pub fn default_target(&self) -> Option<OutputTarget> {
        self.lock_state().default_target.clone()
    }

    /// Bytes written by the host since the last flush.
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.lock_state().buffer.as_ref().map_or(0, DrainBuffer::len)
    }

    /// Enters one level of capture and returns the new depth.
    ///
    /// On the outermost call the host's target is remembered and replaced by
    /// a fresh drain buffer, unless a buffer left behind by a failed restore
    /// is still installed, in which case it is reused. If any console call
    /// fails, the depth and the host's target are returned to their previous
    /// values before the error is reported.
    pub fn acquire(&self) -> Result<usize, CaptureError> {
        let mut state = self.lock_state();
        let mut undo = UndoStack::new();

        state.active_count += 1;
        undo.push(|state: &mut StreamState| state.active_count -= 1);

        if state.active_count == 1
            && state.buffer.is_none()
            && let Err(error) = self.install(&mut state, &mut undo)
        {
            undo.unwind(&mut state);
            return Err(error);
        }

        undo.commit();
        Ok(state.active_count)
    }

    /// Leaves one level of capture and returns the remaining depth.
    ///
    /// Pending output is flushed first, at every depth. When the depth drops
    /// to zero the remembered target is restored and the buffer discarded,
    /// after dispatching anything the host wrote in the meantime.
    ///
    /// If the restore fails the depth still drops to zero, but the buffer
    /// stays installed and keeps collecting output. Releasing the idle stream
    /// again, or the next outermost release, retries the restore. Releasing
    /// an idle stream with nothing pending only flushes.
    pub fn release(&self) -> Result<usize, CaptureError> {
        self.flush();

        let (remaining, discarded) = {
            let mut state = self.lock_state();
            match state.active_count {
                0 if state.buffer.is_none() => return Ok(0),
                0 | 1 => {
                    state.active_count = 0;
                    self.restore(&state)?;
                    state.default_target = None;
                    (0, state.buffer.take())
                }
                _ => {
                    state.active_count -= 1;
                    (state.active_count, None)
                }
            }
        };

        if let Some(buffer) = discarded {
            let _flush = self.lock_flush();
            self.dispatch(&buffer.take_text());
        }
        Ok(remaining)
    }

    /// Dispatches everything written since the last flush to the log sink.
    ///
    /// Returns the number of entries dispatched; an idle stream or an empty
    /// buffer yields zero.
    pub fn flush(&self) -> usize {
        let _flush = self.lock_flush();
        let Some(buffer) = self.lock_state().buffer.clone() else {
            return 0;
        };
        self.dispatch(&buffer.take_text())
    }

    fn install(
        &self,
        state: &mut StreamState,
        undo: &mut UndoStack<StreamState>,
    ) -> Result<(), CaptureError> {
        let original = self
            .console
            .current_target(self.channel)
            .map_err(|source| self.install_error(ConsoleOperation::ReadTarget, source))?;

        let buffer = DrainBuffer::new();
        let installed = buffer.target();
        self.console
            .set_target(self.channel, installed.clone())
            .map_err(|source| self.install_error(ConsoleOperation::InstallTarget, source))?;
        undo.push(Self::restore_action(
            Arc::clone(&self.console),
            self.channel,
            original.clone(),
        ));

        let live = self
            .console
            .current_target(self.channel)
            .map_err(|source| self.install_error(ConsoleOperation::ReadTarget, source))?;
        if !live.same_as(&installed) {
            return Err(self.install_error(
                ConsoleOperation::InstallTarget,
                HostConsoleError::new("host did not adopt the capture buffer"),
            ));
        }

        state.default_target = Some(original);
        state.buffer = Some(buffer);
        debug!(
            target: CAPTURE_TARGET,
            channel = %self.channel,
            "host output redirected to capture buffer"
        );
        Ok(())
    }

    fn restore_action(
        console: Arc<dyn HostConsole>,
        channel: Channel,
        original: OutputTarget,
    ) -> impl FnOnce(&mut StreamState) + Send + 'static {
        move |state: &mut StreamState| {
            if let Err(error) = console.set_target(channel, original) {
                warn!(
                    target: CAPTURE_TARGET,
                    channel = %channel,
                    error = %error,
                    "failed to roll back capture buffer installation"
                );
            }
            state.default_target = None;
            state.buffer = None;
        }
    }

    fn restore(&self, state: &StreamState) -> Result<(), CaptureError> {
        let Some(original) = state.default_target.clone() else {
            return Ok(());
        };
        self.console
            .set_target(self.channel, original)
            .map_err(|source| CaptureError::restore(self.channel, source))?;
        debug!(
            target: CAPTURE_TARGET,
            channel = %self.channel,
            "host output restored to original target"
        );
        Ok(())
    }

    fn dispatch(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let entries = parse_entries(text);
        for entry in &entries {
            self.sink.log(entry.severity(), entry.origin(), entry.message());
        }
        entries.len()
    }

    const fn install_error(
        &self,
        operation: ConsoleOperation,
        source: HostConsoleError,
    ) -> CaptureError {
        CaptureError::install(self.channel, operation, source)
    }

    fn lock_state(&self) -> MutexGuard<'_, StreamState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_flush(&self) -> MutexGuard<'_, ()> {
        self.flush_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CapturedStream {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        formatter
            .debug_struct("CapturedStream")
            .field("channel", &self.channel)
            .field("active_count", &state.active_count)
            .field("capturing", &state.buffer.is_some())
            .finish_non_exhaustive()
    }
}
