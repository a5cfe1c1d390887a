//! # Task abstraction for periodic execution.
//!
//! This module defines the [`Task`] trait: a named, cancelable unit of work that
//! a [`Looper`](crate::Looper) invokes once per tick. The common handle type is
//! [`TaskRef`], an `Arc<dyn Task>` suitable for sharing across the runtime.
//!
//! A task receives the runner's [`CancellationToken`]. Checking it lets a tick
//! exit early during shutdown; cancelling it halts the runner once the current
//! tick returns.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Boxed future returned by [`Task::spawn`].
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cancelable unit of work.
///
/// A `Task` has a stable [`name`](Task::name) and produces a fresh future per
/// tick via [`spawn`](Task::spawn).
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use provisor::{BoxTaskFuture, Task, TaskError};
///
/// struct Probe;
///
/// impl Task for Probe {
///     fn name(&self) -> &str { "probe" }
///
///     fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
///         Box::pin(async move {
///             if ctx.is_cancelled() {
///                 return Err(TaskError::Canceled);
///             }
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Creates the future for one tick.
    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture;
}
