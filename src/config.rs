use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tracing::trace;

use crate::egress::ExpectedEgressSet;
use crate::error::ConfigError;
use crate::util::{self, env_var};

/// Naming of the exported series: `<namespace>_<subsystem>_<component>_<series>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricNames {
    pub namespace: String,
    pub subsystem: String,
    pub component: String,
}

impl Default for MetricNames {
    fn default() -> Self {
        Self {
            namespace: util::DEFAULT_NAMESPACE.to_string(),
            subsystem: util::DEFAULT_SUBSYSTEM.to_string(),
            component: util::DEFAULT_COMPONENT.to_string(),
        }
    }
}

/// Inputs for working out the `from` label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Fixed label, skips every network lookup when present
    pub label: Option<String>,

    /// Metadata address queried for the placement zone
    pub metadata_url: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            label: None,
            metadata_url: util::DEFAULT_METADATA_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// The URL to probe
    pub target_url: String,

    /// Where the scrape endpoint listens
    pub scrape_addr: SocketAddr,

    /// Time spent sleeping between two probes
    pub interval: Duration,

    pub metric_names: MetricNames,

    pub expected_egress: ExpectedEgressSet,

    pub identity: IdentityConfig,
}

impl MonitorConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_var)
    }

    /// Load the configuration from an arbitrary key/value source.
    ///
    /// Blank values count as unset and fall back to their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let target_url = get(util::TARGET_URL).ok_or(ConfigError::Missing(util::TARGET_URL))?;
        validate_target_url(&target_url)?;

        let port = match get(util::SCRAPE_PORT) {
            Some(raw) => parse_value(util::SCRAPE_PORT, &raw)?,
            None => util::get_default_scrape_port(),
        };

        let addr = match get(util::SCRAPE_ADDR) {
            Some(raw) => parse_value::<IpAddr>(util::SCRAPE_ADDR, &raw)?,
            None => IpAddr::V4(util::get_default_scrape_addr()),
        };

        let interval_ms = match get(util::POLL_INTERVAL_MS) {
            Some(raw) => parse_value(util::POLL_INTERVAL_MS, &raw)?,
            None => util::get_default_poll_interval_ms(),
        };
        if interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: util::POLL_INTERVAL_MS,
                reason: "interval must be greater than zero".to_string(),
            });
        }

        let defaults = MetricNames::default();
        let metric_names = MetricNames {
            namespace: get(util::METRICS_NAMESPACE).unwrap_or(defaults.namespace),
            subsystem: get(util::METRICS_SUBSYSTEM).unwrap_or(defaults.subsystem),
            component: get(util::METRICS_COMPONENT).unwrap_or(defaults.component),
        };

        let expected_egress = get(util::EXPECTED_EGRESS_IPS)
            .map(|raw| ExpectedEgressSet::parse(&raw))
            .unwrap_or_default();

        let identity = IdentityConfig {
            label: get(util::IDENTITY_LABEL).map(|label| label.trim().to_string()),
            metadata_url: get(util::IDENTITY_METADATA_URL)
                .unwrap_or_else(|| util::DEFAULT_METADATA_URL.to_string()),
        };

        let config = Self {
            target_url,
            scrape_addr: SocketAddr::new(addr, port),
            interval: Duration::from_millis(interval_ms),
            metric_names,
            expected_egress,
            identity,
        };

        trace!("loaded config: {config:?}");
        Ok(config)
    }
}

fn validate_target_url(raw: &str) -> Result<(), ConfigError> {
    let url = url::Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key: util::TARGET_URL,
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid {
            key: util::TARGET_URL,
            reason: format!("unsupported scheme `{other}`"),
        }),
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: format!("`{raw}`: {e}"),
    })
}
