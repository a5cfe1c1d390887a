//! # Run a single tick of a periodic task.
//!
//! Executes one invocation of a [`Task`] and routes every failure to the
//! [`ErrorSink`]. Nothing escapes: the caller (the looper) only learns that the
//! tick is over.
//!
//! ## Outcome handling
//!
//! ```text
//! Success:       task.spawn() → Ok(())             → trace
//! Cancellation:  task.spawn() → Err(Canceled)      → debug (not a failure)
//! Failure:       task.spawn() → Err(Fail)          → sink.report
//! Panic:         task.spawn() → unwind (caught)    → sink.report (as Fail)
//! ```
//!
//! ## Rules
//! - The task receives the looper's own token, not a child: cancelling it from
//!   inside the tick halts the looper once the tick returns.
//! - Panics are caught with `catch_unwind`, including panics raised while the
//!   task builds its future.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{TaskError, panic_info},
    sinks::ErrorSink,
    tasks::Task,
};

/// Executes tick number `tick` of `task`, reporting failures to `sink`.
pub(crate) async fn run_tick<T: Task + ?Sized>(
    task: &T,
    ctx: &CancellationToken,
    tick: u64,
    sink: &dyn ErrorSink,
) {
    let fut = async { task.spawn(ctx.clone()).await };
    let res = match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => Err(TaskError::Fail {
            error: format!("panicked: {}", panic_info(&*payload)),
        }),
    };

    match res {
        Ok(()) => {
            tracing::trace!(task = task.name(), tick, "tick finished");
        }
        Err(TaskError::Canceled) => {
            tracing::debug!(task = task.name(), tick, "tick cancelled");
        }
        Err(e) => {
            let message = format!("looper task {:?} failed on tick {tick}", task.name());
            sink.report(&message, &e);
        }
    }
}
