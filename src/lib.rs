//! # provisor
//!
//! **Provisor** is a client-side monitor for a service managed by a VPN node
//! daemon over its HTTP API.
//!
//! It starts (or adopts) a remote long-running service, polls its status at a
//! fixed interval, reconciles every poll into a local three-state model and
//! notifies observers only on actual transitions. Transient poll failures are
//! logged and tolerated; a vanished service ends monitoring with `NotRunning`.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        caller                                   node daemon (REST)
//!          │ start / stop / check                       ▲
//!          ▼                                            │
//! ┌───────────────────────────────────────┐    ┌────────┴────────┐
//! │  ProviderService (reconciler)         │───►│ ServiceControl  │
//! │  - current handle + epoch             │    │  (HttpClient)   │
//! │  - last published ServiceStatus       │    └────────▲────────┘
//! └──────┬──────────────────────┬─────────┘             │
//!        │ owns                 │ publish on change     │ service_get
//!        ▼                      ▼                       │
//! ┌──────────────┐      ┌──────────────────┐            │
//! │   Looper     │─tick─┤ poll task (TaskFn)├───────────┘
//! │ (interval)   │      └──────────────────┘
//! └──────┬───────┘      ┌──────────────────┐
//!        │ Err / panic  │ Publisher<Status>│──► callback 1, callback 2, ...
//!        ▼              └────────┬─────────┘
//!    ErrorSink ◄─── callback panic
//! ```
//!
//! ### Lifecycle
//! ```text
//! start(provider, type) ──► service_start ──► adopt(handle)
//!
//! adopt:
//!   ├─► epoch += 1, handle = new
//!   ├─► publish initial status (if changed)
//!   ├─► Looper::start (first tick immediately)
//!   └─► stop + await the previous Looper, if any
//!
//! tick:
//!   ├─ Ok(info)      ─► map ─► publish if changed
//!   ├─ NotFound      ─► publish NotRunning if changed, drop handle, halt looper
//!   └─ other error   ─► ErrorSink, retry next tick
//!
//! stop() ──► service_stop ──► Looper::stop (awaits in-flight tick) ──► publish NotRunning
//! ```
//!
//! ## Features
//! | Area             | Description                                                  | Key types / traits                         |
//! |------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Monitor**      | Start/stop/adopt a service and track its status.             | [`ProviderService`], [`ServiceStatus`]     |
//! | **Runner**       | Fixed-interval cancellable execution of an async task.       | [`Looper`], [`Task`], [`TaskFn`]           |
//! | **Bus**          | Ordered synchronous fan-out with per-callback isolation.     | [`Publisher`], [`Subscription`]            |
//! | **Daemon API**   | Remote service control contract and REST implementation.     | [`ServiceControl`], [`HttpClient`]         |
//! | **Errors**       | Typed errors; non-fatal ones go to an error sink.            | [`MonitorError`], [`RemoteError`], [`ErrorSink`] |
//! | **Configuration**| Poll interval, daemon URL, request timeout.                  | [`MonitorConfig`], [`ClientConfig`]        |
//!
//! ## Optional features
//! - `http` (default): exports [`HttpClient`], the reqwest-based [`ServiceControl`].
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use provisor::{Callback, ClientConfig, HttpClient, MonitorConfig, ProviderService, ServiceStatus};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new(ClientConfig::with_base_url("http://127.0.0.1:4050"))?;
//!
//!     let service = ProviderService::builder(Arc::new(client))
//!         .with_config(MonitorConfig { poll_interval: Duration::from_secs(1) })
//!         .build();
//!
//!     let on_status: Callback<ServiceStatus> = Arc::new(|status| println!("status: {status}"));
//!     let _subscription = service.add_status_subscriber(on_status);
//!
//!     if !service.check_for_existing_service().await {
//!         service.start("0x1234", "wireguard").await?;
//!     }
//!
//!     tokio::time::sleep(Duration::from_secs(10)).await;
//!     service.stop().await?;
//!     Ok(())
//! }
//! ```
mod client;
mod core;
mod error;
mod provider;
mod publisher;
mod sinks;
mod tasks;

// ---- Public re-exports ----

pub use client::{
    AccessPolicies, ClientConfig, ConnectionStatistics, ControlRef, DEFAULT_BASE_URL, Healthcheck,
    ServiceControl, ServiceInfo, ServiceStartRequest,
};
pub use core::Looper;
pub use error::{LooperError, MonitorError, PublishError, RemoteError, TaskError};
pub use provider::{
    MonitorConfig, ProviderService, ProviderServiceBuilder, RemoteStatus, ServiceStatus,
};
pub use publisher::{Callback, Publisher, Subscription};
pub use sinks::{ErrorSink, LogSink, MemorySink, Report, SinkRef};
pub use tasks::{BoxTaskFuture, Task, TaskFn, TaskRef};

// Optional: REST client for the node daemon.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "http")]
pub use client::HttpClient;
