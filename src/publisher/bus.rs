//! # Synchronous fan-out to registered callbacks.
//!
//! Provides [`Publisher`], a multi-subscriber notification bus for values of
//! one type, and [`Subscription`], the handle that removes exactly one callback.
//!
//! ## Architecture
//! ```text
//! publish(value)
//!     │ snapshot of callbacks (lock released)
//!     ├──► callback 1 (value.clone())
//!     ├──► callback 2 (value.clone()) ── panic → ErrorSink, continue
//!     └──► callback N (value)
//! ```
//!
//! ## Rules
//! - **Registration order**: callbacks are invoked in the order they subscribed.
//! - **No buffering**: a value reaches only the callbacks registered when `publish` started.
//!   A callback added while a `publish` is in progress does not receive that value.
//! - **Isolation**: a panicking callback is reported to the sink; the others still run.
//! - **Re-entrancy**: callbacks may subscribe/unsubscribe from inside `publish`.
//! - **Identity**: a callback is identified by its `Arc` allocation, so the same
//!   `Callback<T>` registered twice is two registrations and needs two removals.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::error::{PublishError, panic_info};
use crate::sinks::{LogSink, SinkRef};

/// Shared callback receiving published values.
pub type Callback<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// Shared callback list.
struct Inner<T> {
    callbacks: Mutex<Vec<Callback<T>>>,
}

impl<T> Inner<T> {
    fn lock(&self) -> MutexGuard<'_, Vec<Callback<T>>> {
        self.callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remove(&self, callback: &Callback<T>) -> Result<(), PublishError> {
        let mut callbacks = self.lock();
        let index = callbacks
            .iter()
            .position(|c| same_callback(c, callback))
            .ok_or(PublishError::NotSubscribed)?;
        callbacks.remove(index);
        Ok(())
    }
}

/// Compares two callbacks by allocation, ignoring vtable metadata.
fn same_callback<T>(a: &Callback<T>, b: &Callback<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Multi-subscriber notification bus.
///
/// ### Example
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use provisor::{Callback, Publisher};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let cb: Callback<u32> = Arc::new(move |v| sink.lock().unwrap().push(v));
///
/// let publisher = Publisher::new();
/// let subscription = publisher.subscribe(cb);
/// publisher.publish(1);
/// subscription.unsubscribe().unwrap();
/// publisher.publish(2);
///
/// assert_eq!(*seen.lock().unwrap(), vec![1]);
/// ```
pub struct Publisher<T> {
    inner: Arc<Inner<T>>,
    sink: SinkRef,
}

impl<T: Clone> Publisher<T> {
    /// Creates a bus reporting callback panics to [`LogSink`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Arc::new(LogSink))
    }

    /// Creates a bus reporting callback panics to `sink`.
    #[must_use]
    pub fn with_sink(sink: SinkRef) -> Self {
        Self {
            inner: Arc::new(Inner {
                callbacks: Mutex::new(Vec::new()),
            }),
            sink,
        }
    }

    /// Registers `callback` and returns the handle that removes it.
    pub fn subscribe(&self, callback: Callback<T>) -> Subscription<T> {
        self.inner.lock().push(Arc::clone(&callback));
        Subscription {
            inner: Arc::downgrade(&self.inner),
            callback,
        }
    }

    /// Removes one registration of `callback`.
    ///
    /// # Errors
    /// [`PublishError::NotSubscribed`] if `callback` is not currently registered.
    pub fn unsubscribe(&self, callback: &Callback<T>) -> Result<(), PublishError> {
        self.inner.remove(callback)
    }

    /// Delivers `value` to every callback registered at call time, in order.
    pub fn publish(&self, value: T) {
        for callback in self.snapshot() {
            self.notify_one(&callback, value.clone());
        }
    }

    /// Callbacks registered right now, in registration order.
    pub(crate) fn snapshot(&self) -> Vec<Callback<T>> {
        self.inner.lock().clone()
    }

    /// Delivers `value` to a single callback with the same isolation as `publish`.
    pub(crate) fn notify_one(&self, callback: &Callback<T>, value: T) {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback(value))) {
            let err = PublishError::CallbackPanicked {
                info: panic_info(&*payload),
            };
            self.sink.report("callback call in publisher failed", &err);
        }
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for Publisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle removing exactly the callback it was returned for.
///
/// Consuming `unsubscribe(self)` makes a second removal through the same handle
/// impossible. Dropping the handle leaves the callback registered.
#[must_use = "dropping a Subscription keeps the callback registered"]
pub struct Subscription<T> {
    inner: Weak<Inner<T>>,
    callback: Callback<T>,
}

impl<T> Subscription<T> {
    /// The registered callback.
    pub fn callback(&self) -> &Callback<T> {
        &self.callback
    }

    /// Removes the callback from its publisher.
    ///
    /// # Errors
    /// [`PublishError::NotSubscribed`] if the callback was already removed
    /// through [`Publisher::unsubscribe`] or the publisher was dropped.
    pub fn unsubscribe(self) -> Result<(), PublishError> {
        match self.inner.upgrade() {
            Some(inner) => inner.remove(&self.callback),
            None => Err(PublishError::NotSubscribed),
        }
    }
}
