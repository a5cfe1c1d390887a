//! # Task abstractions.
//!
//! This module provides the unit-of-work types driven by the periodic runner:
//! - [`Task`] - trait for implementing async cancelable ticks
//! - [`TaskFn`] - function-based task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)

mod task;
mod task_fn;

pub use task::{BoxTaskFuture, Task, TaskRef};
pub use task_fn::TaskFn;
