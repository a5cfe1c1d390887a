//! # Service status: local model and remote vocabulary.
//!
//! The daemon reports status strings ([`RemoteStatus`]); the monitor publishes
//! the local [`ServiceStatus`]. Parsing rejects unknown strings and the mapping
//! between the two enums is an exhaustive match, so a new remote value cannot be
//! silently defaulted.
//!
//! ```text
//! "NotRunning" ──► RemoteStatus::NotRunning ──► ServiceStatus::NotRunning
//! "Starting"   ──► RemoteStatus::Starting   ──► ServiceStatus::Starting
//! "Running"    ──► RemoteStatus::Running    ──► ServiceStatus::Running
//! anything else ─► MonitorError::UnknownStatus
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::MonitorError;

/// Local lifecycle state of the monitored service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceStatus {
    /// No service instance is running (initial state).
    #[default]
    NotRunning,
    /// The daemon accepted the start request; the service is coming up.
    Starting,
    /// The service is up and serving.
    Running,
}

impl ServiceStatus {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceStatus::NotRunning => "not_running",
            ServiceStatus::Starting => "starting",
            ServiceStatus::Running => "running",
        }
    }

    /// Parses a daemon status string straight into the local model.
    ///
    /// # Example
    /// ```
    /// use provisor::ServiceStatus;
    ///
    /// assert_eq!(ServiceStatus::from_remote("Running").unwrap(), ServiceStatus::Running);
    /// assert!(ServiceStatus::from_remote("Paused").is_err());
    /// ```
    pub fn from_remote(status: &str) -> Result<Self, MonitorError> {
        status.parse::<RemoteStatus>().map(Self::from)
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Status vocabulary of the daemon API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteStatus {
    NotRunning,
    Starting,
    Running,
}

impl RemoteStatus {
    /// Wire representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RemoteStatus::NotRunning => "NotRunning",
            RemoteStatus::Starting => "Starting",
            RemoteStatus::Running => "Running",
        }
    }
}

impl FromStr for RemoteStatus {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NotRunning" => Ok(RemoteStatus::NotRunning),
            "Starting" => Ok(RemoteStatus::Starting),
            "Running" => Ok(RemoteStatus::Running),
            other => Err(MonitorError::UnknownStatus {
                status: other.to_string(),
            }),
        }
    }
}

impl From<RemoteStatus> for ServiceStatus {
    fn from(status: RemoteStatus) -> Self {
        match status {
            RemoteStatus::NotRunning => ServiceStatus::NotRunning,
            RemoteStatus::Starting => ServiceStatus::Starting,
            RemoteStatus::Running => ServiceStatus::Running,
        }
    }
}
