//! # Service DTOs exchanged with the node daemon.
//!
//! JSON shapes are camelCase. Required fields (`id`, `type`, `status` on
//! [`ServiceInfo`]) fail decoding when absent; optional fields are skipped on
//! serialization when `None`.
//!
//! ## Example
//! ```rust
//! use provisor::ServiceInfo;
//!
//! let info: ServiceInfo = serde_json::from_str(
//!     r#"{"id":"svc-1","providerId":"0x1","type":"openvpn","status":"Running"}"#,
//! ).unwrap();
//!
//! assert_eq!(info.id, "svc-1");
//! assert_eq!(info.service_type, "openvpn");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One managed service instance as reported by the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    /// Opaque service identifier.
    pub id: String,
    /// Identity of the provider running the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    /// Service type, e.g. `"openvpn"` or `"wireguard"`.
    #[serde(rename = "type")]
    pub service_type: String,
    /// Free-form service options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    /// Status in the daemon's vocabulary; see [`RemoteStatus`](crate::RemoteStatus).
    pub status: String,
    /// Proposal published for this service, kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<Value>,
    /// Connection counters, when the daemon tracks them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_statistics: Option<ConnectionStatistics>,
}

/// Connection attempt counters of a service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatistics {
    pub attempted: u64,
    pub successful: u64,
}

/// Body of a service start request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStartRequest {
    /// Identity that will provide the service.
    pub provider_id: String,
    /// Service type to start.
    #[serde(rename = "type")]
    pub service_type: String,
    /// Service options passed through to the daemon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    /// Access policies restricting who may connect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_policies: Option<AccessPolicies>,
}

impl ServiceStartRequest {
    /// Request with only the mandatory fields set.
    pub fn new(provider_id: impl Into<String>, service_type: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            service_type: service_type.into(),
            options: None,
            access_policies: None,
        }
    }

    /// Attaches service options.
    #[inline]
    pub fn with_options(mut self, options: Map<String, Value>) -> Self {
        self.options = Some(options);
        self
    }

    /// Attaches access policy ids.
    #[inline]
    pub fn with_access_policies(mut self, ids: Vec<String>) -> Self {
        self.access_policies = Some(AccessPolicies { ids });
        self
    }
}

/// Access policy ids of a start request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicies {
    pub ids: Vec<String>,
}

/// Daemon liveness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Healthcheck {
    /// Human-readable uptime.
    pub uptime: String,
    /// Daemon process id.
    pub process: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}
