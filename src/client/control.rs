//! # Remote service control contract
//!
//! `ServiceControl` is the narrow interface the monitor uses to reach the node
//! daemon. [`HttpClient`](crate::HttpClient) implements it over REST; tests and
//! embedders can supply their own.
//!
//! ## Contract
//! - Each call may fail with any [`RemoteError`].
//! - `service_get` must report a vanished instance as [`RemoteError::NotFound`];
//!   the monitor treats every other kind as transient.

use async_trait::async_trait;
use std::sync::Arc;

use crate::client::dto::{ServiceInfo, ServiceStartRequest};
use crate::error::RemoteError;

/// Start/stop/inspect managed services on the node daemon.
#[async_trait]
pub trait ServiceControl: Send + Sync + 'static {
    /// Starts a service and returns its initial description.
    async fn service_start(&self, request: &ServiceStartRequest) -> Result<ServiceInfo, RemoteError>;

    /// Stops the service with the given id.
    async fn service_stop(&self, id: &str) -> Result<(), RemoteError>;

    /// Fetches the current description of one service.
    async fn service_get(&self, id: &str) -> Result<ServiceInfo, RemoteError>;

    /// Lists services currently known to the daemon.
    async fn service_list(&self) -> Result<Vec<ServiceInfo>, RemoteError>;
}

/// Shared handle to a service controller.
pub type ControlRef = Arc<dyn ServiceControl>;
