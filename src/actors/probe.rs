//! ProbeActor - Measures the monitored target on a fixed schedule
//!
//! ## Key Features
//!
//! 1. **Single target** - One actor per process, probes never overlap
//! 2. **Sequential schedule** - Each probe is followed by a full interval of sleep
//! 3. **Failure absorption** - Every outcome ends up as a metric, nothing aborts the loop
//! 4. **Egress validation** - The response body names the egress address, checked against the expected set
//!
//! ## Message Flow
//!
//! ```text
//! Probe → Record metrics → Sleep(interval) → Probe → ...
//!                              ↑
//!                              └─── Commands (ProbeNow, Shutdown)
//! ```

use std::error::Error as _;
use std::io::ErrorKind;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, instrument, trace, warn};

use crate::config::MonitorConfig;
use crate::egress::ExpectedEgressSet;
use crate::metrics::MonitorMetrics;
use crate::{ProbeOutcome, ProbeResult};

use super::messages::ProbeCommand;

/// Error label used when a response arrived but its body could not be read
pub const BODY_READ_FAILED: &str = "body read failed";

/// Egress tokens longer than this are still recorded, but flagged in the log
pub const MAX_EXPECTED_TOKEN_LEN: usize = 64;

/// Whether a response body is too long to plausibly name an egress address.
pub fn is_oversized_token(token: &str) -> bool {
    token.len() > MAX_EXPECTED_TOKEN_LEN
}

/// What to probe and how often
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub target_url: String,
    pub interval: Duration,
    pub expected_egress: ExpectedEgressSet,
}

impl From<&MonitorConfig> for ProbeConfig {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            target_url: config.target_url.clone(),
            interval: config.interval,
            expected_egress: config.expected_egress.clone(),
        }
    }
}

/// Actor that probes the target and records the outcome
pub struct ProbeActor {
    config: ProbeConfig,

    /// HTTP client, reused across probes. No timeout beyond the transport defaults.
    client: reqwest::Client,

    metrics: MonitorMetrics,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<ProbeCommand>,
}

impl ProbeActor {
    pub fn new(
        config: ProbeConfig,
        metrics: MonitorMetrics,
        command_rx: mpsc::Receiver<ProbeCommand>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            config,
            client,
            metrics,
            command_rx,
        })
    }

    /// Run the actor's main loop
    ///
    /// Starts probing immediately and runs until:
    /// - A Shutdown command is received
    /// - The command channel is closed (every handle dropped)
    #[instrument(skip(self), fields(target = %self.config.target_url))]
    pub async fn run(mut self) {
        debug!("starting probe actor, interval {:?}", self.config.interval);

        'probing: loop {
            self.probe().await;

            let mut deadline = Instant::now() + self.config.interval;
            trace!("sleeping for {:?}", self.config.interval);

            loop {
                tokio::select! {
                    _ = sleep_until(deadline) => break,

                    cmd = self.command_rx.recv() => match cmd {
                        Some(ProbeCommand::ProbeNow { respond_to }) => {
                            debug!("received ProbeNow command");
                            let result = self.probe().await;
                            let _ = respond_to.send(result);
                            deadline = Instant::now() + self.config.interval;
                        }

                        Some(ProbeCommand::Shutdown) => {
                            debug!("received shutdown command");
                            break 'probing;
                        }

                        None => {
                            warn!("command channel closed, shutting down");
                            break 'probing;
                        }
                    },
                }
            }
        }

        debug!("probe actor stopped");
    }

    /// Probe the target once and record the result.
    #[instrument(skip(self), fields(target = %self.config.target_url))]
    async fn probe(&self) -> ProbeResult {
        let result = self.execute_request().await;

        match &result.outcome {
            ProbeOutcome::Success {
                status_code,
                outbound_ip,
            } => info!(
                "status [{status_code}] load time [{:.6}] egress [{outbound_ip}]",
                result.elapsed_seconds
            ),
            ProbeOutcome::Failure { error_description } => {
                warn!("probe failed: {error_description}")
            }
        }

        self.metrics.record(&result, &self.config.expected_egress);
        result
    }

    /// Issue the GET and turn whatever happens into a ProbeResult.
    ///
    /// Elapsed time covers the request up to the response head. The body is
    /// read to the end so the connection is released before the next probe.
    async fn execute_request(&self) -> ProbeResult {
        let start = Instant::now();

        let response = match self.client.get(&self.config.target_url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("request failed: {e}");
                return ProbeResult::failure(describe_failure(&e));
            }
        };

        let elapsed_seconds = start.elapsed().as_secs_f64();
        let status_code = response.status().as_u16();

        match response.text().await {
            Ok(body) => {
                let token = body.trim();
                if is_oversized_token(token) {
                    warn!(
                        "response body is {} bytes long, the target may not be an egress echo endpoint",
                        token.len()
                    );
                }
                ProbeResult::success(elapsed_seconds, status_code, token)
            }
            Err(e) => {
                debug!("failed to read response body: {e}");
                ProbeResult::failure(BODY_READ_FAILED)
            }
        }
    }
}

/// Short, low-cardinality description of a request that got no response.
pub fn describe_failure(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return "timeout".to_string();
    }

    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return match io.kind() {
                ErrorKind::ConnectionRefused => "connection refused".to_string(),
                ErrorKind::ConnectionReset => "connection reset".to_string(),
                ErrorKind::ConnectionAborted => "connection aborted".to_string(),
                ErrorKind::TimedOut => "timeout".to_string(),
                kind => kind.to_string(),
            };
        }
        source = cause.source();
    }

    let description = if err.is_connect() {
        "connect error"
    } else if err.is_redirect() {
        "redirect error"
    } else if err.is_builder() {
        "invalid request"
    } else {
        "request failed"
    };
    description.to_string()
}

/// Handle for controlling a ProbeActor
///
/// Dropping every clone closes the command channel, which stops the actor.
#[derive(Clone)]
pub struct ProbeHandle {
    sender: mpsc::Sender<ProbeCommand>,
    target_url: String,
}

impl ProbeHandle {
    /// Spawn a new probe actor; the first probe starts right away.
    pub fn spawn(config: ProbeConfig, metrics: MonitorMetrics) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let target_url = config.target_url.clone();

        let actor = ProbeActor::new(config, metrics, cmd_rx)?;

        tokio::spawn(actor.run());

        Ok(Self {
            sender: cmd_tx,
            target_url,
        })
    }

    /// Probe immediately and return the result
    pub async fn probe_now(&self) -> Result<ProbeResult> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(ProbeCommand::ProbeNow { respond_to: tx })
            .await
            .context("probe actor is not running")?;

        rx.await.context("probe actor dropped the request")
    }

    /// Stop the probe loop
    pub async fn shutdown(self) {
        let _ = self.sender.send(ProbeCommand::Shutdown).await;
    }

    /// Resolves once the actor has stopped
    pub async fn stopped(&self) {
        self.sender.closed().await
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }
}

// ============================================================================
// Tests
// ============================================================================
