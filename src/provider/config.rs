//! # Monitor configuration.
//!
//! Provides [`MonitorConfig`], the settings of a [`ProviderService`](crate::ProviderService).
//!
//! ## Sentinel values
//! - `poll_interval = 0s` → clamped to 1ms (a zero interval cannot be scheduled)

use std::time::Duration;

/// Settings of the provider service monitor.
///
/// ## Field semantics
/// - `poll_interval`: time between status polls, start-to-start
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Interval of the status polling looper.
    ///
    /// The first poll runs as soon as a service is adopted; later polls follow
    /// every `poll_interval`. A poll slower than the interval delays the next one.
    pub poll_interval: Duration,
}

impl MonitorConfig {
    /// Returns the poll interval clamped to a minimum of 1ms.
    #[inline]
    pub fn poll_interval_clamped(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }
}

impl Default for MonitorConfig {
    /// Default configuration:
    ///
    /// - `poll_interval = 1000ms`
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
        }
    }
}
