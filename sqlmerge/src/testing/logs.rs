//! Capturing `tracing` output in tests.

use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

/// Formatted log lines emitted while a closure ran.
#[derive(Debug, Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Runs `f` under a thread-local subscriber and returns what it logged.
    pub(crate) fn capture<T>(f: impl FnOnce() -> T) -> (T, Self) {
        let logs = Self::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .finish();

        let out = tracing::subscriber::with_default(subscriber, f);
        (out, logs)
    }

    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub(crate) fn contains(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
