pub mod actors;
pub mod api;
pub mod config;
pub mod egress;
pub mod error;
pub mod identity;
pub mod metrics;
pub mod util;

use chrono::{DateTime, Utc};

/// Result of a single probe against the monitored target.
///
/// Produced and consumed within one loop iteration, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub timestamp: DateTime<Utc>,
    /// Seconds between issuing the request and receiving the response head.
    /// Zero for failures, which never reach the latency series.
    pub elapsed_seconds: f64,
    pub outcome: ProbeOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Success {
        status_code: u16,
        /// Response body, which the target uses to report the egress address
        /// the request arrived from.
        outbound_ip: String,
    },
    Failure {
        error_description: String,
    },
}

impl ProbeResult {
    pub fn success(elapsed_seconds: f64, status_code: u16, outbound_ip: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            elapsed_seconds,
            outcome: ProbeOutcome::Success {
                status_code,
                outbound_ip: outbound_ip.into(),
            },
        }
    }

    pub fn failure(error_description: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            elapsed_seconds: 0.0,
            outcome: ProbeOutcome::Failure {
                error_description: error_description.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Success { .. })
    }

    /// Egress token reported by the target, if the probe got a response.
    pub fn outbound_ip(&self) -> Option<&str> {
        match &self.outcome {
            ProbeOutcome::Success { outbound_ip, .. } => Some(outbound_ip),
            ProbeOutcome::Failure { .. } => None,
        }
    }
}
