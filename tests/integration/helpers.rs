//! Helper functions for integration tests

use std::sync::Arc;
use std::time::Duration;

use egress_monitor::actors::probe::ProbeConfig;
use egress_monitor::config::MetricNames;
use egress_monitor::egress::ExpectedEgressSet;
use egress_monitor::metrics::MonitorMetrics;
use prometheus::Registry;

pub fn create_test_metrics(from: &str) -> MonitorMetrics {
    MonitorMetrics::register(Arc::new(Registry::new()), &MetricNames::default(), from).unwrap()
}

pub fn create_probe_config(url: &str, interval_ms: u64, expected: &str) -> ProbeConfig {
    ProbeConfig {
        target_url: url.to_string(),
        interval: Duration::from_millis(interval_ms),
        expected_egress: ExpectedEgressSet::parse(expected),
    }
}

/// URL of a local port nobody listens on
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/")
}

/// Poll `condition` until it holds or `timeout` passes
pub async fn wait_until<F>(timeout: Duration, condition: F) -> bool
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
