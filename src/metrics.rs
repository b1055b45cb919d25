//! Prometheus series describing the monitored target
//!
//! All four series share the namespace, subsystem and the constant `from`
//! label. They are registered once at startup on an injected
//! [`prometheus::Registry`]; after that, recording is infallible and
//! synchronized by the prometheus types themselves, so the probe loop and
//! concurrent scrapes never need an external lock.

use std::fmt;
use std::sync::Arc;

use prometheus::proto::{Metric, MetricFamily};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};
use tracing::{debug, warn};

use crate::config::MetricNames;
use crate::egress::{EgressCheck, ExpectedEgressSet};
use crate::error::StartupResult;
use crate::{ProbeOutcome, ProbeResult};

pub const FROM_LABEL: &str = "from";
pub const OUTBOUND_IP_LABEL: &str = "outbound_ip";
pub const ERROR_LABEL: &str = "error";

const LOAD_TIME: &str = "load_time_seconds";
const RESPONSE_STATUS: &str = "response_status";
const ERRORS: &str = "errors_total";
const EGRESS_MISMATCH: &str = "egress_mismatch_total";

/// Handle to the registered monitor series.
///
/// Cheap to clone; every clone records into the same registry.
#[derive(Clone)]
pub struct MonitorMetrics {
    registry: Arc<Registry>,
    names: MetricNames,
    load_time: HistogramVec,
    response_status: IntGaugeVec,
    errors: IntCounterVec,
    egress_mismatch: IntCounterVec,
}

impl fmt::Debug for MonitorMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorMetrics")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

impl MonitorMetrics {
    /// Create the four series and register them on `registry`.
    ///
    /// # Errors
    ///
    /// Fails if a series name is invalid or the same series is already
    /// registered, which only happens when the monitor is wired up twice.
    pub fn register(registry: Arc<Registry>, names: &MetricNames, from: &str) -> StartupResult<Self> {
        let opts = |series: &str, help: &str| {
            Opts::new(format!("{}_{series}", names.component), help)
                .namespace(names.namespace.clone())
                .subsystem(names.subsystem.clone())
                .const_label(FROM_LABEL, from)
        };

        let load_time = HistogramVec::new(
            HistogramOpts::from(opts(LOAD_TIME, "Time until the target answered, in seconds"))
                .buckets(prometheus::DEFAULT_BUCKETS.to_vec()),
            &[OUTBOUND_IP_LABEL],
        )?;

        let response_status = IntGaugeVec::new(
            opts(RESPONSE_STATUS, "Last HTTP status code returned by the target"),
            &[OUTBOUND_IP_LABEL],
        )?;

        let errors = IntCounterVec::new(
            opts(ERRORS, "Probes that got no response from the target"),
            &[ERROR_LABEL],
        )?;

        let egress_mismatch = IntCounterVec::new(
            opts(
                EGRESS_MISMATCH,
                "Probes that left through an egress address outside the expected set",
            ),
            &[OUTBOUND_IP_LABEL],
        )?;

        registry.register(Box::new(load_time.clone()))?;
        registry.register(Box::new(response_status.clone()))?;
        registry.register(Box::new(errors.clone()))?;
        registry.register(Box::new(egress_mismatch.clone()))?;

        debug!("registered monitor series with `from={from}`");

        Ok(Self {
            registry,
            names: names.clone(),
            load_time,
            response_status,
            errors,
            egress_mismatch,
        })
    }

    pub fn observe_load_time(&self, outbound_ip: &str, elapsed_seconds: f64) {
        self.load_time
            .with_label_values(&[outbound_ip])
            .observe(elapsed_seconds);
    }

    pub fn set_response_status(&self, outbound_ip: &str, status_code: u16) {
        self.response_status
            .with_label_values(&[outbound_ip])
            .set(i64::from(status_code));
    }

    pub fn increment_error(&self, error_description: &str) {
        self.errors.with_label_values(&[error_description]).inc();
    }

    pub fn increment_mismatch(&self, outbound_ip: &str) {
        self.egress_mismatch.with_label_values(&[outbound_ip]).inc();
    }

    /// Record one probe.
    ///
    /// A failure only touches the error counter. A response records load time
    /// and status under the same `outbound_ip`, then counts a mismatch when
    /// that address is not expected. Returns the egress check for responses.
    pub fn record(&self, result: &ProbeResult, expected: &ExpectedEgressSet) -> Option<EgressCheck> {
        match &result.outcome {
            ProbeOutcome::Failure { error_description } => {
                self.increment_error(error_description);
                None
            }
            ProbeOutcome::Success {
                status_code,
                outbound_ip,
            } => {
                self.observe_load_time(outbound_ip, result.elapsed_seconds);
                self.set_response_status(outbound_ip, *status_code);

                let check = expected.check(outbound_ip);
                if check == EgressCheck::Mismatch {
                    warn!("egress address `{outbound_ip}` is not in the expected set");
                    self.increment_mismatch(outbound_ip);
                }
                Some(check)
            }
        }
    }

    /// Encode every series of the registry in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;

        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("metrics are not valid UTF-8: {e}")))
    }

    /// Number of observations and their sum for one egress address.
    pub fn load_time_samples(&self, outbound_ip: &str) -> Option<(u64, f64)> {
        self.find(LOAD_TIME, OUTBOUND_IP_LABEL, outbound_ip)
            .map(|m| {
                let histogram = m.get_histogram();
                (histogram.get_sample_count(), histogram.get_sample_sum())
            })
    }

    pub fn response_status(&self, outbound_ip: &str) -> Option<i64> {
        self.find(RESPONSE_STATUS, OUTBOUND_IP_LABEL, outbound_ip)
            .map(|m| m.get_gauge().get_value() as i64)
    }

    pub fn error_count(&self, error_description: &str) -> u64 {
        self.find(ERRORS, ERROR_LABEL, error_description)
            .map_or(0, |m| m.get_counter().get_value() as u64)
    }

    pub fn mismatch_count(&self, outbound_ip: &str) -> u64 {
        self.find(EGRESS_MISMATCH, OUTBOUND_IP_LABEL, outbound_ip)
            .map_or(0, |m| m.get_counter().get_value() as u64)
    }

    /// Sum of all error counters regardless of description.
    pub fn total_errors(&self) -> u64 {
        self.family(ERRORS).map_or(0, |family| {
            family
                .get_metric()
                .iter()
                .map(|m| m.get_counter().get_value() as u64)
                .sum()
        })
    }

    /// Sum of all mismatch counters regardless of address.
    pub fn total_mismatches(&self) -> u64 {
        self.family(EGRESS_MISMATCH).map_or(0, |family| {
            family
                .get_metric()
                .iter()
                .map(|m| m.get_counter().get_value() as u64)
                .sum()
        })
    }

    /// Total load time observations across every egress address.
    pub fn total_load_time_samples(&self) -> u64 {
        self.family(LOAD_TIME).map_or(0, |family| {
            family
                .get_metric()
                .iter()
                .map(|m| m.get_histogram().get_sample_count())
                .sum()
        })
    }

    pub fn fq_name(&self, series: &str) -> String {
        format!(
            "{}_{}_{}_{series}",
            self.names.namespace, self.names.subsystem, self.names.component
        )
    }

    // Reads go through `gather()` so that looking at a series never creates it.
    fn family(&self, series: &str) -> Option<MetricFamily> {
        let name = self.fq_name(series);
        self.registry
            .gather()
            .into_iter()
            .find(|family| family.get_name() == name)
    }

    fn find(&self, series: &str, label: &str, value: &str) -> Option<Metric> {
        self.family(series)?
            .get_metric()
            .iter()
            .find(|m| {
                m.get_label()
                    .iter()
                    .any(|pair| pair.get_name() == label && pair.get_value() == value)
            })
            .cloned()
    }
}
