//! # LogSink: tracing-backed error sink
//!
//! The default [`ErrorSink`]: every report becomes one `tracing` event at
//! `ERROR` level with the error rendered as a field.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! ERROR provisor::sinks::log: looper tick failed error=transport failure: connection refused
//! ERROR provisor::sinks::log: callback call in publisher failed error=...
//! ```

use crate::sinks::ErrorSink;

/// Error sink that forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl LogSink {
    /// Construct a new [`LogSink`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ErrorSink for LogSink {
    fn report(&self, message: &str, error: &(dyn std::error::Error + 'static)) {
        tracing::error!(error = %error, "{message}");
    }
}
