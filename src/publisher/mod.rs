//! Notification bus: synchronous publish/subscribe of one value type.
//!
//! ## Contents
//! - [`Publisher`] ordered callback list with per-callback panic isolation
//! - [`Subscription`] handle removing exactly one registration
//! - [`Callback`] shared callback type; its `Arc` identity is the registration key
//!
//! ## Quick reference
//! - **Publisher**: [`ProviderService`](crate::ProviderService) publishes each
//!   [`ServiceStatus`](crate::ServiceStatus) transition.
//! - **Consumers**: user callbacks registered through
//!   [`ProviderService::add_status_subscriber`](crate::ProviderService::add_status_subscriber).

mod bus;

pub use bus::{Callback, Publisher, Subscription};
