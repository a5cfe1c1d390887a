//! Error types used by the provider monitor, its runner and the daemon boundary.
//!
//! This module defines the error enums of the crate:
//!
//! - [`RemoteError`] - failures reported by a [`ServiceControl`](crate::ServiceControl) call.
//! - [`MonitorError`] - errors raised by the [`ProviderService`](crate::ProviderService).
//! - [`TaskError`] - the outcome of one failed tick of a periodic task.
//! - [`LooperError`] - misuse of the periodic runner.
//! - [`PublishError`] - misuse of the notification bus and isolated callback failures.
//!
//! Every type provides `as_label` (stable snake_case, for logs/metrics).

use thiserror::Error;

/// # Errors produced by the remote service control boundary.
///
/// "Not found" is an explicit kind so callers never have to infer it from a
/// transport error's shape.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The addressed resource (e.g. a service instance) does not exist.
    #[error("not found: {resource}")]
    NotFound {
        /// Path or identifier of the missing resource.
        resource: String,
    },

    /// The daemon answered with a non-success status other than 404.
    #[error("daemon responded with status {code}: {message}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The request never produced a response (connection refused, reset, ...).
    #[error("transport failure: {error}")]
    Transport {
        /// The underlying error message.
        error: String,
    },

    /// The request exceeded its configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The response body could not be decoded into the expected shape.
    #[error("malformed response: {error}")]
    Decode {
        /// The underlying decoder message.
        error: String,
    },
}

impl RemoteError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use provisor::RemoteError;
    ///
    /// let err = RemoteError::NotFound { resource: "services/abc".into() };
    /// assert_eq!(err.as_label(), "remote_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RemoteError::NotFound { .. } => "remote_not_found",
            RemoteError::Status { .. } => "remote_status",
            RemoteError::Transport { .. } => "remote_transport",
            RemoteError::Timeout => "remote_timeout",
            RemoteError::Decode { .. } => "remote_decode",
        }
    }

    /// Indicates whether the addressed resource no longer exists.
    ///
    /// This is the only classification the status reconciler relies on:
    /// not-found is terminal for a service handle, everything else is transient.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound { .. })
    }
}

/// # Errors produced by the provider service monitor.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// `stop()` was called without a started or adopted service.
    #[error("service id is unknown, make sure to start service before stopping it")]
    UnknownService,

    /// The daemon reported a status outside the known vocabulary.
    #[error("unknown service status: {status:?}")]
    UnknownStatus {
        /// The raw status string as received.
        status: String,
    },

    /// The remote call made by the operation failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl MonitorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            MonitorError::UnknownService => "monitor_unknown_service",
            MonitorError::UnknownStatus { .. } => "monitor_unknown_status",
            MonitorError::Remote(e) => e.as_label(),
        }
    }
}

/// # Errors produced by a single tick of a periodic task.
///
/// A failed tick is reported to the runner's error sink and never stops the loop.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Tick failed; the next tick runs as scheduled.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Tick observed cancellation and gave up early.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use provisor::TaskError;
    ///
    /// let err = TaskError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }
}

impl From<MonitorError> for TaskError {
    fn from(e: MonitorError) -> Self {
        TaskError::Fail {
            error: e.to_string(),
        }
    }
}

impl From<RemoteError> for TaskError {
    fn from(e: RemoteError) -> Self {
        TaskError::Fail {
            error: e.to_string(),
        }
    }
}

/// # Errors produced by the periodic runner.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LooperError {
    /// `start()` was called on a runner whose loop is still alive.
    #[error("looper {name:?} is already running")]
    AlreadyRunning {
        /// Name of the task driven by the runner.
        name: String,
    },
}

impl LooperError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LooperError::AlreadyRunning { .. } => "looper_already_running",
        }
    }
}

/// # Errors produced by the notification bus.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The callback being unsubscribed is not registered (never was, or already removed).
    #[error("callback being unsubscribed was not found")]
    NotSubscribed,

    /// A callback panicked while receiving a value; delivery to others continued.
    #[error("callback call in publisher failed: {info}")]
    CallbackPanicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl PublishError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PublishError::NotSubscribed => "publish_not_subscribed",
            PublishError::CallbackPanicked { .. } => "publish_callback_panicked",
        }
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_info(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
