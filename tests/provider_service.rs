mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Call, MockControl, not_found, recorder, service};
use provisor::{
    MemorySink, MonitorConfig, MonitorError, ProviderService, PublishError, RemoteError,
    ServiceStatus,
};
use tokio::time;

use ServiceStatus::{NotRunning, Running, Starting};

fn monitor(control: &Arc<MockControl>) -> (ProviderService, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let service = ProviderService::builder(control.clone())
        .with_config(MonitorConfig {
            poll_interval: Duration::from_millis(1000),
        })
        .with_sink(sink.clone())
        .build();
    (service, sink)
}

#[tokio::test(start_paused = true)]
async fn start_publishes_initial_status_then_only_transitions() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Starting")));
    control.on_get([Ok(service("svc-1", "Running"))]);
    let (monitor, sink) = monitor(&control);
    let (seen, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb);

    monitor.start("p1", "openvpn").await.unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, Starting]);

    time::sleep(Duration::from_millis(10)).await;
    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, Starting, Running]);

    time::sleep(Duration::from_millis(3000)).await;
    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, Starting, Running]);
    assert_eq!(control.get_calls_for("svc-1"), 4);
    assert_eq!(
        control.calls()[0],
        Call::Start {
            provider_id: "p1".into(),
            service_type: "openvpn".into()
        }
    );
    assert!(sink.is_empty());
    assert_eq!(monitor.current_status(), Running);
}

#[tokio::test(start_paused = true)]
async fn not_found_forces_not_running_and_halts_polling() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Starting")));
    control.on_get([Ok(service("svc-1", "Running")), Err(not_found("svc-1"))]);
    let (monitor, sink) = monitor(&control);
    let (seen, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb);

    monitor.start("p1", "openvpn").await.unwrap();
    time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, Starting, Running, NotRunning]);
    assert_eq!(control.get_calls(), 2);

    time::sleep(Duration::from_secs(10)).await;
    assert_eq!(control.get_calls(), 2);
    assert_eq!(seen.lock().unwrap().len(), 4);
    assert!(!monitor.is_polling());
    assert!(monitor.service().is_none());
    assert!(sink.is_empty());
}

#[tokio::test(start_paused = true)]
async fn not_found_while_already_not_running_publishes_nothing() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "NotRunning")));
    control.on_get([Err(not_found("svc-1"))]);
    let (monitor, _sink) = monitor(&control);
    let (seen, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb);

    monitor.start("p1", "openvpn").await.unwrap();
    time::sleep(Duration::from_secs(5)).await;

    assert_eq!(*seen.lock().unwrap(), vec![NotRunning]);
    assert_eq!(control.get_calls(), 1);
}

#[tokio::test]
async fn stop_without_service_fails_without_remote_calls() {
    let control = MockControl::new();
    let (monitor, _sink) = monitor(&control);

    assert_eq!(monitor.stop().await, Err(MonitorError::UnknownService));
    assert!(control.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stop_always_publishes_not_running() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "NotRunning")));
    control.on_get([Ok(service("svc-1", "NotRunning"))]);
    let (monitor, _sink) = monitor(&control);
    let (seen, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb);

    monitor.start("p1", "openvpn").await.unwrap();
    time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(*seen.lock().unwrap(), vec![NotRunning]);

    monitor.stop().await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, NotRunning]);
    assert!(control.calls().contains(&Call::Stop("svc-1".into())));
    assert!(!monitor.is_polling());
}

#[tokio::test(start_paused = true)]
async fn stop_waits_for_in_flight_poll() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Starting")));
    control.on_get([Ok(service("svc-1", "Running"))]);
    control.set_get_delay(Duration::from_secs(3));
    let (monitor, _sink) = monitor(&control);
    let (seen, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb);

    monitor.start("p1", "openvpn").await.unwrap();
    time::sleep(Duration::from_millis(100)).await;
    assert!(control.get_in_flight());

    monitor.stop().await.unwrap();

    assert!(!control.get_in_flight());
    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, Starting, NotRunning]);

    let polls = control.get_calls();
    time::sleep(Duration::from_secs(10)).await;
    assert_eq!(control.get_calls(), polls);
}

#[tokio::test(start_paused = true)]
async fn second_stop_is_unknown_service() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Running")));
    control.on_get([Ok(service("svc-1", "Running"))]);
    let (monitor, _sink) = monitor(&control);

    monitor.start("p1", "openvpn").await.unwrap();
    monitor.stop().await.unwrap();

    assert_eq!(monitor.stop().await, Err(MonitorError::UnknownService));
}

#[tokio::test(start_paused = true)]
async fn failed_remote_stop_keeps_monitoring() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Running")));
    control.on_get([Ok(service("svc-1", "Running"))]);
    control.fail_stop(RemoteError::Timeout);
    let (monitor, _sink) = monitor(&control);

    monitor.start("p1", "openvpn").await.unwrap();
    let err = monitor.stop().await.unwrap_err();

    assert_eq!(err, MonitorError::Remote(RemoteError::Timeout));
    assert!(monitor.is_polling());
    assert_eq!(monitor.current_status(), Running);
}

#[tokio::test(start_paused = true)]
async fn transient_errors_are_logged_and_polling_continues() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Starting")));
    control.on_get([
        Err(RemoteError::Status {
            code: 503,
            message: "unavailable".into(),
        }),
        Err(RemoteError::Transport {
            error: "connection reset".into(),
        }),
        Ok(service("svc-1", "Running")),
    ]);
    let (monitor, sink) = monitor(&control);
    let (seen, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb);

    monitor.start("p1", "openvpn").await.unwrap();
    time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, Starting]);

    time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, Starting, Running]);

    let reports = sink.reports();
    assert_eq!(reports.len(), 2);
    assert!(reports[0].error.contains("unavailable"));
    assert!(reports[1].error.contains("connection reset"));
    assert!(monitor.is_polling());
}

#[tokio::test(start_paused = true)]
async fn unknown_remote_status_fails_the_tick_loudly() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Starting")));
    control.on_get([Ok(service("svc-1", "Paused"))]);
    let (monitor, sink) = monitor(&control);
    let (seen, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb);

    monitor.start("p1", "openvpn").await.unwrap();
    time::sleep(Duration::from_millis(2500)).await;

    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, Starting]);
    assert_eq!(sink.len(), 3);
    assert!(sink.reports().iter().all(|r| r.error.contains("Paused")));
    assert!(monitor.is_polling());
}

#[tokio::test(start_paused = true)]
async fn unknown_initial_status_still_starts_polling() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Warming")));
    control.on_get([Ok(service("svc-1", "Running"))]);
    let (monitor, sink) = monitor(&control);

    monitor.start("p1", "openvpn").await.unwrap();
    assert_eq!(sink.len(), 1);
    assert_eq!(monitor.current_status(), NotRunning);

    time::sleep(Duration::from_millis(10)).await;
    assert_eq!(monitor.current_status(), Running);
}

#[tokio::test]
async fn failed_start_surfaces_remote_error() {
    let control = MockControl::new();
    control.on_start(Err(RemoteError::Status {
        code: 400,
        message: "bad provider".into(),
    }));
    let (monitor, _sink) = monitor(&control);

    let err = monitor.start("p1", "openvpn").await.unwrap_err();

    assert!(matches!(err, MonitorError::Remote(RemoteError::Status { code: 400, .. })));
    assert!(monitor.service().is_none());
    assert!(!monitor.is_polling());
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_handle_and_polling_cycle() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Running")));
    control.on_start(Ok(service("svc-2", "Starting")));
    control.on_get([Ok(service("svc-1", "Running"))]);
    let (monitor, _sink) = monitor(&control);
    let (seen, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb);

    monitor.start("p1", "openvpn").await.unwrap();
    time::sleep(Duration::from_millis(1500)).await;
    let old_polls = control.get_calls_for("svc-1");

    monitor.start("p1", "wireguard").await.unwrap();
    time::sleep(Duration::from_millis(3500)).await;

    assert_eq!(control.get_calls_for("svc-1"), old_polls);
    assert!(control.get_calls_for("svc-2") >= 3);
    assert_eq!(monitor.service().map(|s| s.id), Some("svc-2".to_string()));
    assert_eq!(seen.lock().unwrap()[..3], [NotRunning, Running, Starting]);
}

#[tokio::test(start_paused = true)]
async fn adopts_existing_service() {
    let control = MockControl::new();
    control.on_list(Ok(vec![service("svc-9", "Running"), service("svc-10", "Starting")]));
    control.on_get([Ok(service("svc-9", "Running"))]);
    let (monitor, _sink) = monitor(&control);
    let (seen, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb);

    assert!(monitor.check_for_existing_service().await);
    time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, Running]);
    assert_eq!(control.get_calls_for("svc-9"), 2);
    assert_eq!(control.get_calls_for("svc-10"), 0);

    monitor.stop().await.unwrap();
    assert!(control.calls().contains(&Call::Stop("svc-9".into())));
}

#[tokio::test]
async fn listing_failures_mean_nothing_is_running() {
    let control = MockControl::new();
    control.on_list(Err(RemoteError::Transport {
        error: "refused".into(),
    }));
    let (monitor, sink) = monitor(&control);

    assert!(!monitor.check_for_existing_service().await);
    assert!(!monitor.is_active().await);
    assert!(!monitor.is_polling());
    assert!(sink.is_empty());
}

#[tokio::test]
async fn is_active_reflects_listing() {
    let control = MockControl::new();
    let (monitor, _sink) = monitor(&control);
    assert!(!monitor.is_active().await);

    control.on_list(Ok(vec![service("svc-1", "Running")]));
    assert!(monitor.is_active().await);
}

#[tokio::test(start_paused = true)]
async fn new_subscriber_receives_last_status_immediately() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Starting")));
    control.on_get([Ok(service("svc-1", "Running"))]);
    let (monitor, _sink) = monitor(&control);

    monitor.start("p1", "openvpn").await.unwrap();
    time::sleep(Duration::from_millis(10)).await;

    let (late, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb);
    assert_eq!(*late.lock().unwrap(), vec![Running]);
}

#[tokio::test(start_paused = true)]
async fn removed_subscriber_stops_receiving() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Starting")));
    control.on_get([Ok(service("svc-1", "Running"))]);
    let (monitor, _sink) = monitor(&control);
    let (seen, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb.clone());

    monitor.start("p1", "openvpn").await.unwrap();
    monitor.remove_status_subscriber(&cb).unwrap();
    time::sleep(Duration::from_millis(10)).await;

    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, Starting]);
    assert_eq!(
        monitor.remove_status_subscriber(&cb),
        Err(PublishError::NotSubscribed)
    );
}

#[tokio::test(start_paused = true)]
async fn consecutive_publications_never_repeat() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Starting")));
    let script = [
        "Starting", "Starting", "Running", "Running", "NotRunning", "NotRunning", "Starting",
        "Running", "Running",
    ];
    control.on_get(script.iter().map(|s| Ok(service("svc-1", s))));
    let (monitor, _sink) = monitor(&control);
    let (seen, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb);

    monitor.start("p1", "openvpn").await.unwrap();
    time::sleep(Duration::from_secs(12)).await;

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![NotRunning, Starting, Running, NotRunning, Starting, Running]
    );
    assert!(seen.windows(2).all(|w| w[0] != w[1]));
}

#[tokio::test(start_paused = true)]
async fn panicking_subscriber_does_not_break_others() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Starting")));
    control.on_get([Ok(service("svc-1", "Running"))]);
    let (monitor, sink) = monitor(&control);

    let _bad = monitor.add_status_subscriber(Arc::new(|status: ServiceStatus| {
        if status == Running {
            panic!("observer bug");
        }
    }));
    let (seen, cb) = recorder();
    let _good = monitor.add_status_subscriber(cb);

    monitor.start("p1", "openvpn").await.unwrap();
    time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, Starting, Running]);
    assert_eq!(sink.len(), 1);
    assert!(sink.reports()[0].error.contains("observer bug"));
    assert!(monitor.is_polling());
}

#[tokio::test(start_paused = true)]
async fn subscribers_may_read_the_monitor() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Starting")));
    control.on_get([Ok(service("svc-1", "Running"))]);
    let (monitor, _sink) = monitor(&control);

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let m = monitor.clone();
    let _sub = monitor.add_status_subscriber(Arc::new(move |status: ServiceStatus| {
        let has_service = m.service().is_some();
        let _ = m.is_polling();
        s.lock().unwrap().push((status, m.current_status(), has_service));
    }));

    monitor.start("p1", "openvpn").await.unwrap();
    time::sleep(Duration::from_millis(10)).await;
    monitor.stop().await.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (NotRunning, NotRunning, false),
            (Starting, Starting, true),
            (Running, Running, true),
            (NotRunning, NotRunning, false),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn subscribing_from_a_callback_replays_after_delivery() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Starting")));
    control.on_get([Ok(service("svc-1", "Running"))]);
    let (monitor, _sink) = monitor(&control);
    let (late, late_cb) = recorder();

    let m = monitor.clone();
    let once = std::sync::Mutex::new(Some(late_cb));
    let _sub = monitor.add_status_subscriber(Arc::new(move |status: ServiceStatus| {
        if status == Starting {
            if let Some(cb) = once.lock().unwrap().take() {
                let _ = m.add_status_subscriber(cb);
            }
        }
    }));

    monitor.start("p1", "openvpn").await.unwrap();
    assert_eq!(*late.lock().unwrap(), vec![Starting]);

    time::sleep(Duration::from_millis(10)).await;
    assert_eq!(*late.lock().unwrap(), vec![Starting, Running]);
}

#[tokio::test(start_paused = true)]
async fn poll_in_flight_during_restart_is_discarded() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Starting")));
    control.on_start(Ok(service("svc-2", "Starting")));
    // Replies are taken when a poll completes: svc-1's in-flight poll gets the first.
    control.on_get([
        Ok(service("svc-1", "NotRunning")),
        Ok(service("svc-2", "Running")),
    ]);
    control.set_get_delay(Duration::from_secs(3));
    let (monitor, _sink) = monitor(&control);
    let (seen, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb);

    monitor.start("p1", "openvpn").await.unwrap();
    time::sleep(Duration::from_millis(100)).await;
    assert!(control.get_in_flight());

    monitor.start("p1", "wireguard").await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, Starting]);
    assert_eq!(monitor.service().map(|s| s.id), Some("svc-2".to_string()));

    time::sleep(Duration::from_millis(500)).await;
    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, Starting, Running]);
    assert_eq!(monitor.service().map(|s| s.id), Some("svc-2".to_string()));
}

#[tokio::test(start_paused = true)]
async fn stop_superseded_by_new_service_does_not_publish() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Running")));
    control.on_start(Ok(service("svc-2", "Starting")));
    control.on_get([Ok(service("svc-2", "Running"))]);
    control.set_stop_delay(Duration::from_secs(2));
    let (monitor, _sink) = monitor(&control);
    let (seen, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb);

    monitor.start("p1", "openvpn").await.unwrap();

    let (stopped, started) = tokio::join!(monitor.stop(), async {
        time::sleep(Duration::from_millis(100)).await;
        monitor.start("p1", "wireguard").await
    });
    stopped.unwrap();
    started.unwrap();

    assert!(control.calls().contains(&Call::Stop("svc-1".into())));
    assert_eq!(monitor.service().map(|s| s.id), Some("svc-2".to_string()));
    assert!(monitor.is_polling());

    let polls = control.get_calls_for("svc-2");
    time::sleep(Duration::from_secs(3)).await;
    assert!(control.get_calls_for("svc-2") > polls);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, vec![NotRunning, Running, Starting, Running]);
}

#[tokio::test(start_paused = true)]
async fn concurrent_stops_publish_once() {
    let control = MockControl::new();
    control.on_start(Ok(service("svc-1", "Running")));
    control.on_get([Ok(service("svc-1", "Running"))]);
    control.set_stop_delay(Duration::from_secs(1));
    let (monitor, _sink) = monitor(&control);
    let (seen, cb) = recorder();
    let _sub = monitor.add_status_subscriber(cb);

    monitor.start("p1", "openvpn").await.unwrap();
    let (a, b) = tokio::join!(monitor.stop(), monitor.stop());

    let mut results = [a, b];
    results.sort_by_key(|r| r.is_err());
    assert_eq!(results, [Ok(()), Err(MonitorError::UnknownService)]);
    assert_eq!(*seen.lock().unwrap(), vec![NotRunning, Running, NotRunning]);
    assert!(!monitor.is_polling());
}
