// components/playlist_engine/src/sink.rs
use crate::types::StatusEvent;

/// Consumer of normalized status events and raw backend output.
///
/// Both methods are called synchronously from the worker task that drives the
/// run, in the order the backend produced the underlying lines. A sink that
/// feeds a display from another thread is responsible for its own
/// synchronization.
pub trait StatusSink: Send + Sync {
    /// A normalized `{phase, message, percent?}` signal.
    fn event(&self, event: StatusEvent);

    /// One verbatim line of backend output, for full-log display.
    fn raw_line(&self, line: &str);
}
