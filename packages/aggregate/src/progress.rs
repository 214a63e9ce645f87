//! Progress reporting for payload loading.
//!
//! Decouples load progress from any rendering backend. The CLI renders it
//! with `indicatif`; the server and tests use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates while the aggregate payload is fetched and
/// indexed.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected number of bytes, when the transport knows it.
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` bytes.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores all progress updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
