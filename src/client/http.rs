//! # HttpClient: REST implementation of [`ServiceControl`]
//!
//! Thin typed wrapper around the daemon's HTTP verbs.
//!
//! ## Routes
//! ```text
//! service_list   GET    {base}/services
//! service_get    GET    {base}/services/{id}
//! service_start  POST   {base}/services        (JSON ServiceStartRequest)
//! service_stop   DELETE {base}/services/{id}
//! health_check   GET    {base}/healthcheck
//! stop_node      POST   {base}/stop
//! ```
//!
//! ## Error mapping
//! - `404`                → [`RemoteError::NotFound`] (resource = request path)
//! - other non-2xx        → [`RemoteError::Status`] (message = body, or reason phrase)
//! - reqwest timeout      → [`RemoteError::Timeout`]
//! - other reqwest errors → [`RemoteError::Transport`]
//! - body not decodable   → [`RemoteError::Decode`]

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::client::config::ClientConfig;
use crate::client::control::ServiceControl;
use crate::client::dto::{Healthcheck, ServiceInfo, ServiceStartRequest};
use crate::error::RemoteError;

/// HTTP client for the node daemon API.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    /// [`RemoteError::Transport`] if the underlying reqwest client cannot be built
    /// (e.g. TLS backend initialisation failure).
    pub fn new(config: ClientConfig) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(classify)?;

        Ok(Self { http, config })
    }

    /// Client for the default local daemon address.
    ///
    /// # Errors
    /// Same as [`HttpClient::new`].
    pub fn local() -> Result<Self, RemoteError> {
        Self::new(ClientConfig::default())
    }

    /// Configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Checks that the daemon is up.
    pub async fn health_check(&self) -> Result<Healthcheck, RemoteError> {
        self.get_json("healthcheck").await
    }

    /// Asks the daemon process to shut down.
    pub async fn stop_node(&self) -> Result<(), RemoteError> {
        self.send(self.http.post(self.config.url("stop")), "stop")
            .await
            .map(drop)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let resp = self.send(self.http.get(self.config.url(path)), path).await?;
        decode(resp).await
    }

    /// Sends `req` and turns non-success statuses into errors.
    async fn send(&self, req: RequestBuilder, path: &str) -> Result<Response, RemoteError> {
        let resp = req.send().await.map_err(classify)?;
        let status = resp.status();

        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound {
                resource: path.to_string(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("unknown").to_string()
            } else {
                body
            };
            return Err(RemoteError::Status {
                code: status.as_u16(),
                message,
            });
        }

        tracing::trace!(path, status = status.as_u16(), "daemon request ok");
        Ok(resp)
    }
}

#[async_trait]
impl ServiceControl for HttpClient {
    async fn service_start(&self, request: &ServiceStartRequest) -> Result<ServiceInfo, RemoteError> {
        let resp = self
            .send(self.http.post(self.config.url("services")).json(request), "services")
            .await?;
        decode(resp).await
    }

    async fn service_stop(&self, id: &str) -> Result<(), RemoteError> {
        let path = format!("services/{id}");
        self.send(self.http.delete(self.config.url(&path)), &path)
            .await
            .map(drop)
    }

    async fn service_get(&self, id: &str) -> Result<ServiceInfo, RemoteError> {
        self.get_json(&format!("services/{id}")).await
    }

    async fn service_list(&self) -> Result<Vec<ServiceInfo>, RemoteError> {
        self.get_json("services").await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, RemoteError> {
    let bytes = resp.bytes().await.map_err(classify)?;
    serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode {
        error: e.to_string(),
    })
}

fn classify(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Transport {
            error: e.to_string(),
        }
    }
}
