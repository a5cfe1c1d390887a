//! Provider service monitor: start/stop a service on the node daemon and track its status.
//!
//! ## Contents
//! - [`ProviderService`] lifecycle reconciler (start, stop, adopt, poll, publish)
//! - [`ProviderServiceBuilder`] optional configuration and error sink
//! - [`ServiceStatus`] local 3-state model, [`RemoteStatus`] daemon vocabulary
//! - [`MonitorConfig`] poll interval
//!
//! ## Wiring
//! ```text
//! start() ──► ServiceControl::service_start ──► adopt(handle)
//!                                                 ├─► publish initial status (dedup)
//!                                                 └─► Looper(poll_interval) ─► tick:
//!                                                          ServiceControl::service_get
//!                                                          └─► reconcile ─► Publisher
//! stop()  ──► ServiceControl::service_stop ──► Looper::stop (awaited) ─► publish NotRunning
//! ```

mod builder;
mod config;
mod service;
mod status;

pub use builder::ProviderServiceBuilder;
pub use config::MonitorConfig;
pub use service::ProviderService;
pub use status::{RemoteStatus, ServiceStatus};
