//! Periodic execution core.
//!
//! The only public API from this module is [`Looper`], which drives one
//! [`Task`](crate::Task) at a fixed interval with cooperative cancellation.
//!
//! Internal modules:
//! - [`looper`]: owns the spawned loop, start/stop/cancel and the tick schedule;
//! - [`runner`]: executes one tick, catching errors and panics into the error sink.

mod looper;
mod runner;

pub use looper::Looper;
