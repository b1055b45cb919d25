//! Failure tests for the probe loop
//!
//! These tests verify that failures are absorbed:
//! - Repeated network failures never stop the loop
//! - A target that comes back is picked up on the next probe
//! - Dropping every handle is the cancellation signal

use std::time::Duration;

use egress_monitor::actors::probe::ProbeHandle;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_loop_survives_repeated_failures() {
    let metrics = create_test_metrics("local");
    let config = create_probe_config(&refused_url(), 20, "");

    let handle = ProbeHandle::spawn(config, metrics.clone()).unwrap();

    let observed = wait_until(Duration::from_secs(5), || {
        metrics.error_count("connection refused") >= 3
    })
    .await;
    assert!(observed, "loop should keep probing after failures");

    // still answering commands
    let result = handle.probe_now().await.unwrap();
    assert!(!result.is_success());
    assert_eq!(metrics.total_load_time_samples(), 0);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_target_recovers_between_probes() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("10.0.0.5"))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("10.0.0.5"))
        .with_priority(2)
        .mount(&mock_server)
        .await;

    let metrics = create_test_metrics("local");
    let config = create_probe_config(&mock_server.uri(), 60_000, "10.0.0.5");
    let handle = ProbeHandle::spawn(config, metrics.clone()).unwrap();

    handle.probe_now().await.unwrap();
    assert_eq!(metrics.response_status("10.0.0.5"), Some(500));

    handle.probe_now().await.unwrap();
    assert_eq!(metrics.response_status("10.0.0.5"), Some(200));
    assert_eq!(metrics.load_time_samples("10.0.0.5").unwrap().0, 3);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_dropping_all_handles_stops_actor() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("10.0.0.5"))
        .mount(&mock_server)
        .await;

    let metrics = create_test_metrics("local");
    let config = create_probe_config(&mock_server.uri(), 50, "10.0.0.5");
    let handle = ProbeHandle::spawn(config, metrics.clone()).unwrap();

    assert!(
        wait_until(Duration::from_secs(5), || metrics.total_load_time_samples() >= 1).await
    );
    drop(handle);

    // let the actor observe the closed channel and an in-flight probe finish
    tokio::time::sleep(Duration::from_millis(200)).await;
    let settled = metrics.total_load_time_samples();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(metrics.total_load_time_samples(), settled);
}
