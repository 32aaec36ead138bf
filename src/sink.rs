//! In-memory log buffer shared by every job in a build.
//!
//! Mirrors `AssetForge`'s `forge.log_buf`, an `io::StringIO` that
//! `sys.stdout`/`sys.stderr` were temporarily swapped to point at for the
//! duration of each `build()` call. Rust has no portable way to swap a
//! process-global stream per call, so tools write to this sink explicitly
//! through [`crate::tool::ToolContext::log`] instead.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// A `Write` handle into a buffer shared by every job of a build.
///
/// Cloning a `LogSink` is cheap — all clones write into the same
/// underlying buffer.
#[derive(Clone, Default)]
pub struct LogSink {
    buf: Arc<Mutex<String>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line (newline-terminated) to the buffer.
    pub fn line(&self, message: impl AsRef<str>) {
        let mut buf = self.buf.lock();
        buf.push_str(message.as_ref());
        if !message.as_ref().ends_with('\n') {
            buf.push('\n');
        }
    }

    /// Takes the buffered contents, leaving the buffer empty for the next
    /// build (mirrors `log_buf.truncate(0); log_buf.seek(0)`).
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buf.lock())
    }
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        self.buf.lock().push_str(&text);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
