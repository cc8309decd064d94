//! End-to-end tests: a real client reporting to a real aggregator over
//! HTTP on a loopback listener.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pulsegrid_api::build_router;
use pulsegrid_client::{ClientConfig, HeartbeatClient, HttpBeatTransport, RetryPolicy};
use pulsegrid_state::{HeartbeatRegistry, Status, Thresholds, epoch_millis};

async fn spawn_aggregator() -> (HeartbeatRegistry, SocketAddr) {
    let registry = HeartbeatRegistry::new();
    let router = build_router(registry.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (registry, addr)
}

fn client_config(addr: SocketAddr, beat_delay: Duration) -> ClientConfig {
    ClientConfig {
        client_id: "worker-1".to_string(),
        beat_delay,
        thresholds: Thresholds {
            degraded_error_rate: 0.2,
            error_error_rate: 0.5,
            min_total_ops: 10,
        },
        retry: RetryPolicy::default(),
        on_status_change: None,
    }
}

fn http_transport(addr: SocketAddr) -> Arc<HttpBeatTransport> {
    Arc::new(HttpBeatTransport::new(addr.to_string(), "/api/v1/beats"))
}

#[tokio::test]
async fn error_burst_propagates_and_recovers() {
    let (registry, addr) = spawn_aggregator().await;

    let transitions: Arc<Mutex<Vec<(Status, Status)>>> = Arc::new(Mutex::new(Vec::new()));
    let seen = transitions.clone();

    let mut config = client_config(addr, Duration::from_secs(5));
    config.on_status_change = Some(Arc::new(move |old, new| {
        seen.lock().unwrap().push((old, new));
    }));

    let client = HeartbeatClient::new(config, http_transport(addr)).unwrap();

    for _ in 0..5 {
        client.error().await;
    }
    for _ in 0..5 {
        client.success().await;
    }

    // The Ok -> Error transition pushed a beat over the wire without
    // waiting for the ticker.
    assert_eq!(registry.get_status("worker-1"), Ok(Status::Error));
    let report = registry.get_report("worker-1").unwrap();
    assert_eq!(report.success_count, 5);
    assert_eq!(report.error_count, 5);
    assert_eq!(report.beat_delay, 5_000);

    // Delivered beat reset the window; ten clean operations recover.
    for _ in 0..10 {
        client.success().await;
    }
    assert_eq!(registry.get_status("worker-1"), Ok(Status::Ok));
    let report = registry.get_report("worker-1").unwrap();
    assert_eq!(report.success_count, 10);
    assert_eq!(report.error_count, 0);

    assert_eq!(
        *transitions.lock().unwrap(),
        vec![(Status::Ok, Status::Error), (Status::Error, Status::Ok)]
    );
    assert!(!registry.any_dead(epoch_millis()));
}

#[tokio::test]
async fn forced_error_propagates_over_the_wire() {
    let (registry, addr) = spawn_aggregator().await;
    let client =
        HeartbeatClient::new(client_config(addr, Duration::from_secs(5)), http_transport(addr))
            .unwrap();

    client.force_error().await;

    assert_eq!(registry.get_status("worker-1"), Ok(Status::Error));
    assert!(registry.any_error());
}

#[tokio::test]
async fn periodic_loop_delivers_beats() {
    let (registry, addr) = spawn_aggregator().await;
    let client = HeartbeatClient::new(
        client_config(addr, Duration::from_millis(100)),
        http_transport(addr),
    )
    .unwrap();

    client.success().await;
    client.start();

    // Generous bound: several intervals elapse.
    tokio::time::sleep(Duration::from_millis(600)).await;

    let report = registry.get_report("worker-1").unwrap();
    assert_eq!(report.status, Status::Ok);
    assert_eq!(report.beat_delay, 100);
}

#[tokio::test]
async fn unreachable_aggregator_never_surfaces_to_instrumentation() {
    // Nothing is listening on this address; every attempt fails and is
    // absorbed.
    let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
    let client = HeartbeatClient::new(
        client_config(addr, Duration::from_secs(5)),
        http_transport(addr),
    )
    .unwrap();

    for _ in 0..10 {
        client.error().await;
    }
    // Status still transitioned locally even though no beat landed.
    assert_eq!(client.status().await, Status::Error);
}
