//! Concurrency tests
//!
//! Scrapes read the registry while the probe loop writes to it; neither side
//! may block or corrupt the other.

use std::time::Duration;

use egress_monitor::actors::probe::ProbeHandle;
use egress_monitor::api::{ScrapeConfig, ScrapeState, spawn_scrape_server};
use tokio::task::JoinSet;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_scrapes_while_probing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("10.0.0.5"))
        .mount(&mock_server)
        .await;

    let metrics = create_test_metrics("eu-west-1a");
    let config = create_probe_config(&mock_server.uri(), 10, "10.0.0.5");
    let probe = ProbeHandle::spawn(config, metrics.clone()).unwrap();

    let state = ScrapeState::new(metrics.clone(), "eu-west-1a", &mock_server.uri());
    let addr = spawn_scrape_server(
        ScrapeConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
        },
        state,
    )
    .await
    .unwrap();

    let client = reqwest::Client::new();
    let mut scrapes = JoinSet::new();
    for _ in 0..32 {
        let client = client.clone();
        let url = format!("http://{addr}/metrics");
        scrapes.spawn(async move {
            let response = client.get(url).send().await.unwrap();
            let status = response.status().as_u16();
            let body = response.text().await.unwrap();
            (status, body)
        });
    }

    while let Some(scrape) = scrapes.join_next().await {
        let (status, body) = scrape.unwrap();
        assert_eq!(status, 200);
        assert!(body.contains(r#"from="eu-west-1a""#) || body.is_empty());
    }

    let before = metrics.total_load_time_samples();
    assert!(
        wait_until(Duration::from_secs(5), || {
            metrics.total_load_time_samples() > before
        })
        .await,
        "probe loop should keep recording during scrapes"
    );
    assert_eq!(metrics.total_errors(), 0);

    probe.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_recording_from_many_tasks() {
    let metrics = create_test_metrics("local");

    let mut tasks = JoinSet::new();
    for i in 0..16 {
        let metrics = metrics.clone();
        tasks.spawn(async move {
            for _ in 0..100 {
                metrics.observe_load_time("10.0.0.5", 0.01);
                metrics.increment_mismatch(if i % 2 == 0 { "a" } else { "b" });
            }
        });
    }
    while let Some(task) = tasks.join_next().await {
        task.unwrap();
    }

    assert_eq!(metrics.load_time_samples("10.0.0.5").unwrap().0, 1600);
    assert_eq!(metrics.mismatch_count("a"), 800);
    assert_eq!(metrics.mismatch_count("b"), 800);
    assert_eq!(metrics.total_mismatches(), 1600);
}
