use std::sync::Arc;
use std::time::Duration;

use jobfeed_engine::{Connectivity, ManualConnectivity, ProbeConnectivity};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn manual_connectivity_notifies_subscribers() {
    let connectivity = ManualConnectivity::default();
    let mut rx = connectivity.subscribe();
    assert!(connectivity.is_connected().await);

    connectivity.set_connected(false);

    assert!(rx.has_changed().unwrap());
    assert!(!*rx.borrow_and_update());
    assert!(!connectivity.is_connected().await);
}

#[tokio::test]
async fn probe_reports_reachable_server() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let probe = ProbeConnectivity::new(server.uri(), Duration::from_secs(2)).unwrap();
    assert!(probe.is_connected().await);
}

#[tokio::test]
async fn probe_publishes_loss_of_connectivity() {
    let probe = ProbeConnectivity::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
    let mut rx = probe.subscribe();

    assert!(!probe.is_connected().await);
    assert!(rx.has_changed().unwrap());
    assert!(!*rx.borrow_and_update());
}

#[tokio::test]
async fn polling_stops_when_handle_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let probe = Arc::new(ProbeConnectivity::new(server.uri(), Duration::from_secs(2)).unwrap());
    let handle = probe.spawn_polling(Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished());
    drop(handle);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let seen = server.received_requests().await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), seen);
    assert!(seen >= 1);
}
