//! # ProviderService: status monitor of one managed service.
//!
//! Starts or adopts a service on the node daemon, polls its status with a
//! [`Looper`], reconciles each poll into [`ServiceStatus`] and publishes only
//! actual transitions to subscribers.
//!
//! ## State machine
//! ```text
//!            start()/adopt              poll: "Running"
//! NotRunning ─────────────► Starting ─────────────────► Running
//!     ▲                        │                           │
//!     └────── stop() / poll: not found / "NotRunning" ─────┘
//! ```
//!
//! ## Poll tick
//! ```text
//! service_get(id)
//!   ├─ Ok(info)        ─► map status ─► publish if != last
//!   │                      └─ unknown status ─► Err (reported, loop continues)
//!   ├─ Err(NotFound)   ─► publish NotRunning if != last, drop handle, halt looper
//!   └─ Err(other)      ─► Err (reported, loop continues, status unchanged)
//! ```
//!
//! ## Rules
//! - At most one handle is current. Adopting a new one stops and awaits the
//!   previous looper; every adoption gets a new epoch and results of ticks from
//!   an older epoch are discarded.
//! - Handle, last status and epoch live behind one lock. It is never held across
//!   an `.await`.
//! - Every decision to publish is queued while that lock is held, together with
//!   the subscribers registered at that moment. The queue is drained in order by
//!   one thread at a time with no lock held, so callbacks may call back into the
//!   monitor. A callback that subscribes from inside a delivery gets its replay
//!   once the current delivery returns.
//! - `stop()` publishes `NotRunning` even when it is already the last value.
//! - `stop()` racing another `stop()` or a not-found teardown returns
//!   [`MonitorError::UnknownService`] once the handle is gone; racing a new
//!   adoption returns `Ok` without publishing.
//!
//! ## Delivery
//! ```text
//! state lock ─► decide ─► outbox.push(snapshot of callbacks, status) ─► unlock
//!                                                                         │
//!                                    flush(): first caller drains ◄───────┘
//!                                             others return, their items follow
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio_util::sync::CancellationToken;

use crate::{
    client::{ControlRef, ServiceInfo, ServiceStartRequest},
    core::Looper,
    error::{MonitorError, PublishError, TaskError},
    provider::{MonitorConfig, ProviderServiceBuilder, ServiceStatus},
    publisher::{Callback, Publisher, Subscription},
    sinks::SinkRef,
    tasks::{TaskFn, TaskRef},
};

/// Name of the polling task (appears in logs and sink messages).
const POLL_TASK: &str = "provider-status";

/// Monitor of one provider service on the node daemon.
///
/// Cheap to clone; clones share the same state and subscribers.
///
/// ### Example
/// ```rust,no_run
/// use std::sync::Arc;
/// use provisor::{Callback, HttpClient, ProviderService, ServiceStatus};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = ProviderService::new(Arc::new(HttpClient::local()?));
///
/// let on_status: Callback<ServiceStatus> = Arc::new(|s| println!("status: {s}"));
/// let _subscription = service.add_status_subscriber(on_status);
///
/// service.start("0x1", "openvpn").await?;
/// // ...
/// service.stop().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ProviderService {
    inner: Arc<Inner>,
}

struct Inner {
    control: ControlRef,
    cfg: MonitorConfig,
    sink: SinkRef,
    publisher: Publisher<ServiceStatus>,
    state: Mutex<State>,
    outbox: Mutex<Outbox>,
}

/// Status deliveries decided but not yet handed to callbacks.
#[derive(Default)]
struct Outbox {
    queue: VecDeque<Delivery>,
    /// Set while some thread drains `queue`.
    draining: bool,
}

struct Delivery {
    callbacks: Vec<Callback<ServiceStatus>>,
    status: ServiceStatus,
}

#[derive(Default)]
struct State {
    /// Currently adopted service.
    service: Option<ServiceInfo>,
    /// Last published status.
    last: ServiceStatus,
    /// Looper polling `service`.
    fetcher: Option<Arc<Looper>>,
    /// Bumped on every adoption and teardown.
    epoch: u64,
}

impl ProviderService {
    /// Monitor with default configuration reporting to a [`LogSink`](crate::LogSink).
    pub fn new(control: ControlRef) -> Self {
        ProviderServiceBuilder::new(control).build()
    }

    /// Returns a builder for custom configuration or error sink.
    pub fn builder(control: ControlRef) -> ProviderServiceBuilder {
        ProviderServiceBuilder::new(control)
    }

    pub(crate) fn new_internal(control: ControlRef, cfg: MonitorConfig, sink: SinkRef) -> Self {
        Self {
            inner: Arc::new(Inner {
                control,
                cfg,
                publisher: Publisher::with_sink(sink.clone()),
                sink,
                state: Mutex::new(State::default()),
                outbox: Mutex::new(Outbox::default()),
            }),
        }
    }

    /// Adopts a service already running on the daemon, if any.
    ///
    /// Listing failures count as "none found". Returns `true` if a service was adopted.
    pub async fn check_for_existing_service(&self) -> bool {
        match self.find_running_service().await {
            Some(service) => {
                self.adopt(service).await;
                true
            }
            None => false,
        }
    }

    /// Best-effort check whether the daemon runs any service. Never fails.
    pub async fn is_active(&self) -> bool {
        self.find_running_service().await.is_some()
    }

    /// First service listed by the daemon; `None` if none or the listing failed.
    pub async fn find_running_service(&self) -> Option<ServiceInfo> {
        match self.inner.control.service_list().await {
            Ok(services) => services.into_iter().next(),
            Err(e) => {
                tracing::debug!(error = %e, "service list failed, assuming none is running");
                None
            }
        }
    }

    /// Starts a service of `service_type` for `provider_id` and begins monitoring it.
    ///
    /// # Errors
    /// Only the failure of the start request itself ([`MonitorError::Remote`]).
    pub async fn start(&self, provider_id: &str, service_type: &str) -> Result<(), MonitorError> {
        self.start_with(&ServiceStartRequest::new(provider_id, service_type))
            .await
    }

    /// Like [`start`](Self::start) with a full request (options, access policies).
    pub async fn start_with(&self, request: &ServiceStartRequest) -> Result<(), MonitorError> {
        let service = self.inner.control.service_start(request).await?;
        self.adopt(service).await;
        Ok(())
    }

    /// Stops the current service, halts polling and publishes `NotRunning`.
    ///
    /// Returns once no poll is in flight anymore.
    ///
    /// # Errors
    /// - [`MonitorError::UnknownService`] if no service is started or adopted
    ///   (no remote call is made).
    /// - [`MonitorError::Remote`] if the stop request fails; monitoring continues.
    /// - [`MonitorError::UnknownService`] if a concurrent `stop()` or a not-found
    ///   poll cleared the handle while the stop request was in flight.
    pub async fn stop(&self) -> Result<(), MonitorError> {
        let (id, epoch) = {
            let st = self.inner.lock();
            let id = st
                .service
                .as_ref()
                .map(|s| s.id.clone())
                .ok_or(MonitorError::UnknownService)?;
            (id, st.epoch)
        };

        self.inner.control.service_stop(&id).await?;

        let fetcher = {
            let mut st = self.inner.lock();
            if st.epoch != epoch {
                return match st.service {
                    Some(_) => {
                        tracing::debug!(service = %id, "stopped service was superseded, not publishing");
                        Ok(())
                    }
                    None => Err(MonitorError::UnknownService),
                };
            }
            st.service = None;
            st.epoch += 1;
            st.fetcher.take()
        };

        if let Some(fetcher) = fetcher {
            fetcher.stop().await;
        }

        tracing::info!(service = %id, "service stopped");
        {
            let mut st = self.inner.lock();
            // A service adopted while the looper wound down owns the status now.
            if st.epoch == epoch + 1 {
                self.inner.force_status(&mut st, ServiceStatus::NotRunning);
            }
        }
        self.inner.flush();
        Ok(())
    }

    /// Registers `callback` and immediately replays the last status to it.
    pub fn add_status_subscriber(
        &self,
        callback: Callback<ServiceStatus>,
    ) -> Subscription<ServiceStatus> {
        let subscription = {
            let st = self.inner.lock();
            let subscription = self.inner.publisher.subscribe(Arc::clone(&callback));
            self.inner.enqueue(vec![callback], st.last);
            subscription
        };
        self.inner.flush();
        subscription
    }

    /// Removes a callback registered with [`add_status_subscriber`](Self::add_status_subscriber).
    ///
    /// # Errors
    /// [`PublishError::NotSubscribed`] if `callback` is not registered.
    pub fn remove_status_subscriber(
        &self,
        callback: &Callback<ServiceStatus>,
    ) -> Result<(), PublishError> {
        self.inner.publisher.unsubscribe(callback)
    }

    /// Last published status.
    pub fn current_status(&self) -> ServiceStatus {
        self.inner.lock().last
    }

    /// Currently adopted service, as last reported by the daemon.
    pub fn service(&self) -> Option<ServiceInfo> {
        self.inner.lock().service.clone()
    }

    /// Returns `true` while status polling is active.
    pub fn is_polling(&self) -> bool {
        self.inner
            .lock()
            .fetcher
            .as_ref()
            .is_some_and(|f| f.is_running())
    }

    /// Makes `service` the current handle, publishes its status and starts polling.
    async fn adopt(&self, service: ServiceInfo) {
        let initial = ServiceStatus::from_remote(&service.status);

        let previous = {
            let mut st = self.inner.lock();
            st.epoch += 1;
            let epoch = st.epoch;

            tracing::info!(
                service = %service.id,
                service_type = %service.service_type,
                epoch,
                "monitoring service"
            );
            st.service = Some(service);

            match initial {
                Ok(status) => self.inner.process_status(&mut st, status),
                Err(e) => self.inner.sink.report("initial service status mapping failed", &e),
            }

            let fetcher = Arc::new(Looper::new(
                self.poll_task(epoch),
                self.inner.cfg.poll_interval_clamped(),
                self.inner.sink.clone(),
            ));
            if let Err(e) = fetcher.start() {
                self.inner.sink.report("status polling did not start", &e);
            }
            st.fetcher.replace(fetcher)
        };
        self.inner.flush();

        if let Some(previous) = previous {
            previous.stop().await;
        }
    }

    fn poll_task(&self, epoch: u64) -> TaskRef {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        TaskFn::arc(POLL_TASK, move |ctx: CancellationToken| {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => inner.fetch_status(epoch, &ctx).await,
                    None => {
                        ctx.cancel();
                        Ok(())
                    }
                }
            }
        })
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// One poll of the service adopted at `epoch`.
    async fn fetch_status(&self, epoch: u64, ctx: &CancellationToken) -> Result<(), TaskError> {
        let id = {
            let st = self.lock();
            match &st.service {
                Some(service) if st.epoch == epoch => service.id.clone(),
                _ => {
                    tracing::debug!(epoch, "poll for a superseded service skipped");
                    ctx.cancel();
                    return Ok(());
                }
            }
        };

        match self.control.service_get(&id).await {
            Ok(info) => {
                let status = ServiceStatus::from_remote(&info.status)?;
                {
                    let mut st = self.lock();
                    if st.epoch != epoch {
                        tracing::debug!(service = %id, epoch, "stale poll result discarded");
                        return Ok(());
                    }
                    st.service = Some(info);
                    self.process_status(&mut st, status);
                }
                self.flush();
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                {
                    let mut st = self.lock();
                    if st.epoch == epoch {
                        tracing::info!(service = %id, "service is gone, halting status polling");
                        self.process_status(&mut st, ServiceStatus::NotRunning);
                        st.service = None;
                        st.epoch += 1;
                        st.fetcher = None;
                    }
                }
                self.flush();
                ctx.cancel();
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn outbox(&self) -> MutexGuard<'_, Outbox> {
        self.outbox
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queues `status` if it differs from the last published value.
    fn process_status(&self, st: &mut State, status: ServiceStatus) {
        if status == st.last {
            return;
        }
        tracing::info!(from = %st.last, to = %status, "service status changed");
        self.force_status(st, status);
    }

    /// Queues `status` for the current subscribers unconditionally.
    ///
    /// `st` proves the state lock is held, which fixes the delivery order.
    fn force_status(&self, st: &mut State, status: ServiceStatus) {
        st.last = status;
        self.enqueue(self.publisher.snapshot(), status);
    }

    fn enqueue(&self, callbacks: Vec<Callback<ServiceStatus>>, status: ServiceStatus) {
        self.outbox().queue.push_back(Delivery { callbacks, status });
    }

    /// Delivers queued statuses in order. Must be called without the state lock.
    ///
    /// Returns at once if another caller is already draining; that caller picks
    /// up everything queued before it finds the queue empty.
    fn flush(&self) {
        {
            let mut outbox = self.outbox();
            if outbox.draining {
                return;
            }
            outbox.draining = true;
        }

        loop {
            let delivery = {
                let mut outbox = self.outbox();
                match outbox.queue.pop_front() {
                    Some(delivery) => delivery,
                    None => {
                        outbox.draining = false;
                        return;
                    }
                }
            };
            for callback in &delivery.callbacks {
                self.publisher.notify_one(callback, delivery.status);
            }
        }
    }
}
