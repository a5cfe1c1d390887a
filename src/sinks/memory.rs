//! # MemorySink: recording error sink
//!
//! Keeps every report in memory so a host (or a test) can inspect what the
//! runner and the bus swallowed.

use std::sync::Mutex;

use crate::sinks::ErrorSink;

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Context message passed by the reporter.
    pub message: String,
    /// The error rendered with `Display`.
    pub error: String,
}

/// Error sink that records reports in order of arrival.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<Report>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all reports so far.
    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of reports so far.
    pub fn len(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Returns `true` if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorSink for MemorySink {
    fn report(&self, message: &str, error: &(dyn std::error::Error + 'static)) {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Report {
                message: message.to_string(),
                error: error.to_string(),
            });
    }
}
