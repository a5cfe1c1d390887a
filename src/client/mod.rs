//! Daemon boundary: the remote service control contract and its HTTP implementation.
//!
//! ## Contents
//! - [`ServiceControl`] async trait consumed by the monitor
//! - [`ServiceInfo`], [`ServiceStartRequest`], [`Healthcheck`] JSON DTOs
//! - [`ClientConfig`] base URL and request timeout
//! - [`HttpClient`] reqwest implementation (feature `http`)

mod config;
mod control;
mod dto;
#[cfg(feature = "http")]
mod http;

pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use control::{ControlRef, ServiceControl};
pub use dto::{AccessPolicies, ConnectionStatistics, Healthcheck, ServiceInfo, ServiceStartRequest};
#[cfg(feature = "http")]
pub use http::HttpClient;
