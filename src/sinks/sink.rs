//! # Error sink trait
//!
//! `ErrorSink` is the extension point receiving non-fatal failures: failed ticks
//! of the periodic runner and panicking bus callbacks. Nothing reported here is
//! ever propagated to the caller that triggered the work.
//!
//! ## Contract
//! - `report` is synchronous and must not panic.
//! - Implementations should be cheap; they run on the publishing/ticking path.
//!
//! ## Example
//! ```rust
//! use provisor::ErrorSink;
//!
//! struct Stderr;
//!
//! impl ErrorSink for Stderr {
//!     fn report(&self, message: &str, error: &(dyn std::error::Error + 'static)) {
//!         eprintln!("{message}: {error}");
//!     }
//! }
//! ```

use std::sync::Arc;

/// Receiver of `(message, error)` pairs for failures that must not propagate.
pub trait ErrorSink: Send + Sync + 'static {
    /// Records one failure.
    ///
    /// # Parameters
    /// - `message`: what was being done when the failure happened
    /// - `error`: the failure itself
    fn report(&self, message: &str, error: &(dyn std::error::Error + 'static));
}

/// Shared handle to a sink.
pub type SinkRef = Arc<dyn ErrorSink>;
