//! In-memory sink installed as a host channel's target while captured.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::console::OutputTarget;

/// Accumulates whatever the host writes between two flushes.
///
/// Growth is unbounded: a host that keeps writing while nobody flushes keeps
/// every byte in memory.
#[derive(Debug, Clone, Default)]
pub struct DrainBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl DrainBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Target that appends into this buffer, suitable for installing on a host.
    #[must_use]
    pub fn target(&self) -> OutputTarget {
        OutputTarget::new(DrainWriter {
            bytes: Arc::clone(&self.bytes),
        })
    }

    /// Reads and clears the accumulated bytes in one step.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    #[must_use]
    pub fn take_text(&self) -> String {
        let drained = std::mem::take(&mut *self.lock());
        match String::from_utf8(drained) {
            Ok(text) => text,
            Err(error) => String::from_utf8_lossy(error.as_bytes()).into_owned(),
        }
    }

    /// Number of bytes waiting to be flushed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is waiting to be flushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct DrainWriter {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl Write for DrainWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
