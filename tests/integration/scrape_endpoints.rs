//! End-to-end tests for the scrape server

use egress_monitor::ProbeResult;
use egress_monitor::api::{HealthResponse, ScrapeConfig, ScrapeState, spawn_scrape_server};
use egress_monitor::egress::ExpectedEgressSet;
use pretty_assertions::assert_eq;

use crate::helpers::*;

async fn spawn_server(state: ScrapeState) -> String {
    let addr = spawn_scrape_server(
        ScrapeConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
        },
        state,
    )
    .await
    .unwrap();
    format!("http://{addr}")
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_all_series() {
    let metrics = create_test_metrics("us-east-1c");
    let expected = ExpectedEgressSet::parse("10.0.0.5");
    metrics.record(&ProbeResult::success(0.05, 200, "10.0.0.5"), &expected);
    metrics.record(&ProbeResult::success(0.07, 200, "10.9.9.9"), &expected);
    metrics.record(&ProbeResult::failure("connection refused"), &expected);

    let base = spawn_server(ScrapeState::new(metrics, "us-east-1c", "http://t/")).await;
    let response = reqwest::get(format!("{base}/metrics")).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body = response.text().await.unwrap();

    for line in [
        r#"monitoring_website_egress_monitor_load_time_seconds_count{from="us-east-1c",outbound_ip="10.0.0.5"} 1"#,
        r#"monitoring_website_egress_monitor_response_status{from="us-east-1c",outbound_ip="10.9.9.9"} 200"#,
        r#"monitoring_website_egress_monitor_errors_total{error="connection refused",from="us-east-1c"} 1"#,
        r#"monitoring_website_egress_monitor_egress_mismatch_total{from="us-east-1c",outbound_ip="10.9.9.9"} 1"#,
    ] {
        assert!(body.contains(line), "missing `{line}` in:\n{body}");
    }
    assert!(!body.contains(r#"egress_mismatch_total{from="us-east-1c",outbound_ip="10.0.0.5"}"#));
}

#[tokio::test]
async fn test_health_endpoint() {
    let metrics = create_test_metrics("10.1.2.3");
    let base = spawn_server(ScrapeState::new(metrics, "10.1.2.3", "http://t/ip")).await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let health: HealthResponse = serde_json::from_str(&response.text().await.unwrap()).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.from, "10.1.2.3");
    assert_eq!(health.target, "http://t/ip");
    assert_eq!(health.errors_total, 0);
}
