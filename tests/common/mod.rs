//! Scripted in-memory daemon for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use provisor::{Callback, RemoteError, ServiceControl, ServiceInfo, ServiceStartRequest, ServiceStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Start { provider_id: String, service_type: String },
    Stop(String),
    Get(String),
    List,
}

/// Daemon double. `service_get` pops scripted replies (the last one is sticky)
/// and answers with the requested id.
#[derive(Default)]
pub struct MockControl {
    start: Mutex<Vec<Result<ServiceInfo, RemoteError>>>,
    gets: Mutex<VecDeque<Result<ServiceInfo, RemoteError>>>,
    list: Mutex<Option<Result<Vec<ServiceInfo>, RemoteError>>>,
    stop: Mutex<Option<RemoteError>>,
    get_delay: Mutex<Duration>,
    stop_delay: Mutex<Duration>,
    in_flight: AtomicBool,
    calls: Mutex<Vec<Call>>,
}

impl MockControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues the reply of the next `service_start` (FIFO).
    pub fn on_start(&self, reply: Result<ServiceInfo, RemoteError>) {
        self.start.lock().unwrap().push(reply);
    }

    /// Appends `service_get` replies.
    pub fn on_get(&self, replies: impl IntoIterator<Item = Result<ServiceInfo, RemoteError>>) {
        self.gets.lock().unwrap().extend(replies);
    }

    pub fn on_list(&self, reply: Result<Vec<ServiceInfo>, RemoteError>) {
        *self.list.lock().unwrap() = Some(reply);
    }

    pub fn fail_stop(&self, err: RemoteError) {
        *self.stop.lock().unwrap() = Some(err);
    }

    pub fn set_get_delay(&self, delay: Duration) {
        *self.get_delay.lock().unwrap() = delay;
    }

    pub fn set_stop_delay(&self, delay: Duration) {
        *self.stop_delay.lock().unwrap() = delay;
    }

    pub fn get_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn get_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Get(_)))
            .count()
    }

    pub fn get_calls_for(&self, id: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Get(got) if got == id))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ServiceControl for MockControl {
    async fn service_start(&self, request: &ServiceStartRequest) -> Result<ServiceInfo, RemoteError> {
        self.record(Call::Start {
            provider_id: request.provider_id.clone(),
            service_type: request.service_type.clone(),
        });
        let mut start = self.start.lock().unwrap();
        if start.is_empty() {
            return Err(RemoteError::Status {
                code: 500,
                message: "no scripted start reply".into(),
            });
        }
        start.remove(0)
    }

    async fn service_stop(&self, id: &str) -> Result<(), RemoteError> {
        self.record(Call::Stop(id.to_string()));

        let delay = *self.stop_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match self.stop.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn service_get(&self, id: &str) -> Result<ServiceInfo, RemoteError> {
        self.record(Call::Get(id.to_string()));

        let delay = *self.get_delay.lock().unwrap();
        if !delay.is_zero() {
            self.in_flight.store(true, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.in_flight.store(false, Ordering::SeqCst);
        }

        let mut gets = self.gets.lock().unwrap();
        let reply = match gets.len() {
            0 => Err(RemoteError::Transport {
                error: "no scripted get reply".into(),
            }),
            1 => gets[0].clone(),
            _ => gets.pop_front().unwrap_or(Err(RemoteError::Timeout)),
        };
        reply.map(|mut info| {
            info.id = id.to_string();
            info
        })
    }

    async fn service_list(&self) -> Result<Vec<ServiceInfo>, RemoteError> {
        self.record(Call::List);
        self.list
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub fn service(id: &str, status: &str) -> ServiceInfo {
    ServiceInfo {
        id: id.to_string(),
        provider_id: Some("0x1".to_string()),
        service_type: "openvpn".to_string(),
        options: None,
        status: status.to_string(),
        proposal: None,
        connection_statistics: None,
    }
}

pub fn not_found(id: &str) -> RemoteError {
    RemoteError::NotFound {
        resource: format!("services/{id}"),
    }
}

/// Callback recording every delivered status.
pub fn recorder() -> (Arc<Mutex<Vec<ServiceStatus>>>, Callback<ServiceStatus>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let cb: Callback<ServiceStatus> = Arc::new(move |status| s.lock().unwrap().push(status));
    (seen, cb)
}
