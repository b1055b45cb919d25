//! Resolution of the `from` label attached to every series
//!
//! Runs once before anything else is wired up. The lookup order is:
//!
//! 1. an explicitly configured label
//! 2. the placement zone reported by the cloud metadata service (1s timeout)
//! 3. the IP of the local interface used for outbound traffic
//!
//! If all of them fail there is no sensible label and startup aborts.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::UdpSocket;
use tracing::{debug, info, instrument, warn};

use crate::config::IdentityConfig;
use crate::error::{StartupError, StartupResult};
use crate::util::OUTBOUND_PROBE_ADDR;

const METADATA_TIMEOUT: Duration = Duration::from_secs(1);

/// Determine the label describing where this monitor runs.
#[instrument(skip_all)]
pub async fn resolve(config: &IdentityConfig) -> StartupResult<String> {
    if let Some(label) = &config.label {
        info!("using configured identity `from={label}`");
        return Ok(label.clone());
    }

    match placement_zone(&config.metadata_url).await {
        Ok(zone) => {
            info!("found placement zone, setting `from={zone}`");
            return Ok(zone);
        }
        Err(e) => warn!("could not find placement zone ({e:#}), trying the local IP"),
    }

    let ip = outbound_ip(OUTBOUND_PROBE_ADDR)
        .await
        .map_err(|e| StartupError::Identity(format!("{e:#}")))?;

    info!("found local IP address, setting `from={ip}`");
    Ok(ip)
}

/// Ask the metadata service for the placement zone.
pub async fn placement_zone(metadata_url: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(METADATA_TIMEOUT)
        .build()
        .context("failed to build metadata client")?;

    let response = client
        .get(metadata_url)
        .send()
        .await
        .context("metadata request failed")?
        .error_for_status()
        .context("metadata service returned an error")?;

    let zone = response
        .text()
        .await
        .context("failed to read metadata response")?;

    let zone = zone.trim();
    if zone.is_empty() {
        anyhow::bail!("metadata service returned an empty zone");
    }

    Ok(zone.to_string())
}

/// IP of the local interface the kernel picks to reach `remote`.
///
/// Connecting a UDP socket only selects a route, no packet leaves the host.
pub async fn outbound_ip(remote: &str) -> Result<String> {
    let remote: SocketAddr = remote
        .parse()
        .with_context(|| format!("invalid remote address `{remote}`"))?;

    let bind_addr = if remote.is_ipv4() {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
    };

    let socket = UdpSocket::bind(bind_addr)
        .await
        .context("failed to bind UDP socket")?;
    socket
        .connect(remote)
        .await
        .with_context(|| format!("no route to {remote}"))?;

    let local = socket
        .local_addr()
        .context("failed to read local socket address")?;
    debug!("outbound interface address is {}", local.ip());

    Ok(local.ip().to_string())
}
