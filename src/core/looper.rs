//! # Looper: fixed-interval task runner.
//!
//! Invokes one [`Task`] repeatedly until stopped:
//! - first tick **immediately** on [`Looper::start`], then every `interval`
//!   measured start-to-start,
//! - one tick in flight at a time (an overlong tick defers the next one; missed
//!   ticks are not bursted),
//! - cooperative cancellation via [`CancellationToken`],
//! - failed or panicking ticks are reported to the [`ErrorSink`] and the loop
//!   keeps going.
//!
//! ## Architecture
//! ```text
//! Looper::start() ──► tokio::spawn(run_loop)
//!
//! loop {
//!   ├─► select! (biased)
//!   │     ├─ token.cancelled() ─► exit
//!   │     └─ interval.tick()   ─► continue
//!   └─► run_tick(task, token) ─► Ok / Err → sink / panic → sink
//! }
//! exit: `finished` token cancelled (drop guard)
//!
//! Looper::stop() ──► token.cancel() ──► await finished
//! ```
//!
//! ## Rules
//! - Starting a looper whose loop is still alive is an error ([`LooperError::AlreadyRunning`]).
//!   A stopped (or self-cancelled and finished) looper can be started again.
//! - `stop()` returns only after the in-flight tick, if any, has completed.
//!   Concurrent `stop()` calls all wait for the same completion.
//! - `stop()` on a looper that was never started, or is already stopped, is a no-op.
//! - The tick may call `ctx.cancel()` to halt its own looper without awaiting it.

use std::sync::Mutex;
use std::time::Duration;

use tokio::select;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    core::runner::run_tick,
    error::LooperError,
    sinks::SinkRef,
    tasks::TaskRef,
};

/// Smallest accepted interval; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Tokens of one live loop.
struct Running {
    /// Cancels the loop (checked before every tick and during the wait).
    token: CancellationToken,
    /// Cancelled by the loop itself once it has fully exited.
    finished: CancellationToken,
}

/// Repeatedly runs a [`Task`](crate::Task) at a fixed interval until stopped.
///
/// ### Example
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use provisor::{LogSink, Looper, TaskError, TaskFn};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let task = TaskFn::arc("heartbeat", |_ctx: CancellationToken| async {
///     Ok::<(), TaskError>(())
/// });
/// let looper = Looper::new(task, Duration::from_millis(10), Arc::new(LogSink));
///
/// looper.start().unwrap();
/// assert!(looper.start().is_err());
/// looper.stop().await;
/// assert!(!looper.is_running());
/// # }
/// ```
pub struct Looper {
    task: TaskRef,
    interval: Duration,
    sink: SinkRef,
    slot: Mutex<Option<Running>>,
}

impl Looper {
    /// Creates a stopped looper. `interval` is clamped to at least 1ms.
    pub fn new(task: TaskRef, interval: Duration, sink: SinkRef) -> Self {
        Self {
            task,
            interval: interval.max(MIN_INTERVAL),
            sink,
            slot: Mutex::new(None),
        }
    }

    /// Name of the driven task.
    pub fn name(&self) -> &str {
        self.task.name()
    }

    /// Effective tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawns the loop on the current tokio runtime.
    ///
    /// The first tick runs immediately.
    ///
    /// # Errors
    /// [`LooperError::AlreadyRunning`] if a previously started loop has not exited yet.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime (like `tokio::spawn`).
    pub fn start(&self) -> Result<(), LooperError> {
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|r| !r.finished.is_cancelled()) {
            return Err(LooperError::AlreadyRunning {
                name: self.task.name().to_string(),
            });
        }

        let token = CancellationToken::new();
        let finished = CancellationToken::new();
        tokio::spawn(run_loop(
            self.task.clone(),
            self.interval,
            self.sink.clone(),
            token.clone(),
            finished.clone(),
        ));
        tracing::debug!(task = self.task.name(), interval = ?self.interval, "looper started");

        *slot = Some(Running { token, finished });
        Ok(())
    }

    /// Signals cancellation without waiting for the loop to exit.
    pub fn cancel(&self) {
        if let Some(r) = self.lock().as_ref() {
            r.token.cancel();
        }
    }

    /// Cancels the loop and waits until any in-flight tick has completed.
    pub async fn stop(&self) {
        let (token, finished) = match self.lock().as_ref() {
            Some(r) => (r.token.clone(), r.finished.clone()),
            None => return,
        };

        token.cancel();
        finished.cancelled().await;

        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|r| r.finished.is_cancelled()) {
            *slot = None;
        }
        tracing::debug!(task = self.task.name(), "looper stopped");
    }

    /// Returns `true` while the loop is alive and has not been asked to stop.
    pub fn is_running(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|r| !r.token.is_cancelled() && !r.finished.is_cancelled())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Running>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Looper {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Body of the spawned loop.
async fn run_loop(
    task: TaskRef,
    interval: Duration,
    sink: SinkRef,
    token: CancellationToken,
    finished: CancellationToken,
) {
    let _finished = finished.drop_guard();

    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick: u64 = 0;

    loop {
        select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        tick += 1;
        run_tick(task.as_ref(), &token, tick, sink.as_ref()).await;
    }
}
