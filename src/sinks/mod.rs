//! # Error sinks for non-fatal failures.
//!
//! This module provides the [`ErrorSink`] trait and built-in implementations.
//! The periodic runner reports failed ticks here; the notification bus reports
//! panicking callbacks here.
//!
//! ```text
//!   Looper tick ── Err/panic ──┐
//!                              ├──► ErrorSink::report(message, &error)
//!   Publisher callback panic ──┘         │
//!                                   ┌────┴─────┐
//!                                   ▼          ▼
//!                                LogSink   MemorySink
//! ```

mod log;
mod memory;
mod sink;

pub use log::LogSink;
pub use memory::{MemorySink, Report};
pub use sink::{ErrorSink, SinkRef};
