use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use egress_monitor::{
    actors::probe::{ProbeConfig, ProbeHandle},
    api::{self, ScrapeConfig, ScrapeState},
    config::MonitorConfig,
    error::StartupError,
    identity,
    metrics::MonitorMetrics,
};
use prometheus::Registry;
use tracing::{error, info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

/// Probe a URL on a fixed interval and expose load time, status and egress
/// checks for Prometheus.
///
/// Configuration is read from the environment (TARGET_URL, SCRAPE_PORT,
/// POLL_INTERVAL_MS, METRICS_SUBSYSTEM, METRICS_COMPONENT, EXPECTED_EGRESS_IPS, ...).
#[derive(Debug, Clone, Parser)]
#[command(version)]
struct Args {
    /// Load variables from this file instead of `./.env`
    #[arg(long)]
    env_file: Option<PathBuf>,
}

fn init() {
    let filter = filter::Targets::new().with_target("egress_monitor", LevelFilter::DEBUG);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

fn load_env_file(args: &Args) -> anyhow::Result<()> {
    match &args.env_file {
        Some(path) => {
            dotenv::from_path(path)
                .with_context(|| format!("failed to load env file {}", path.display()))?;
        }
        None => {
            dotenv::dotenv().ok();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    if let Err(e) = run(&args).await {
        error!("{e:#}");
        return Err(e);
    }

    Ok(())
}

async fn run(args: &Args) -> anyhow::Result<()> {
    load_env_file(args)?;

    let config = MonitorConfig::from_env().map_err(StartupError::from)?;

    let from = identity::resolve(&config.identity).await?;

    let registry = Arc::new(Registry::new());
    let metrics = MonitorMetrics::register(registry, &config.metric_names, &from)?;

    let listener = api::bind(&ScrapeConfig {
        bind_addr: config.scrape_addr,
    })
    .await?;

    info!(
        "starting to monitor [{}], interval [{:?}], expected egress {:?}",
        config.target_url,
        config.interval,
        config.expected_egress.iter().collect::<Vec<_>>()
    );
    if config.expected_egress.is_empty() {
        info!("no expected egress addresses configured, every response counts as a mismatch");
    }

    let probe = ProbeHandle::spawn(ProbeConfig::from(&config), metrics.clone())?;
    let state = ScrapeState::new(metrics, &from, &config.target_url);

    tokio::select! {
        result = api::serve(listener, state) => result.context("scrape server stopped"),
        _ = probe.stopped() => anyhow::bail!("probe loop stopped unexpectedly"),
    }
}
