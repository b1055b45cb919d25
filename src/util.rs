use std::net::Ipv4Addr;

pub const TARGET_URL: &str = "TARGET_URL";

pub const SCRAPE_PORT: &str = "SCRAPE_PORT";

const DEFAULT_SCRAPE_PORT: u16 = 9100;

pub fn get_default_scrape_port() -> u16 {
    DEFAULT_SCRAPE_PORT
}

pub const SCRAPE_ADDR: &str = "SCRAPE_ADDR";

const DEFAULT_SCRAPE_ADDR: Ipv4Addr = Ipv4Addr::new(0, 0, 0, 0);

pub fn get_default_scrape_addr() -> Ipv4Addr {
    DEFAULT_SCRAPE_ADDR
}

pub const POLL_INTERVAL_MS: &str = "POLL_INTERVAL_MS";

const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

pub fn get_default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

pub const METRICS_NAMESPACE: &str = "METRICS_NAMESPACE";
pub const METRICS_SUBSYSTEM: &str = "METRICS_SUBSYSTEM";
pub const METRICS_COMPONENT: &str = "METRICS_COMPONENT";

pub const DEFAULT_NAMESPACE: &str = "monitoring";
pub const DEFAULT_SUBSYSTEM: &str = "website";
pub const DEFAULT_COMPONENT: &str = "egress_monitor";

pub const EXPECTED_EGRESS_IPS: &str = "EXPECTED_EGRESS_IPS";

pub const IDENTITY_LABEL: &str = "IDENTITY_LABEL";
pub const IDENTITY_METADATA_URL: &str = "IDENTITY_METADATA_URL";

/// EC2 instance metadata endpoint reporting the availability zone
pub const DEFAULT_METADATA_URL: &str =
    "http://169.254.169.254/latest/meta-data/placement/availability-zone";

/// Public address used to pick the outbound interface. Nothing is sent to it.
pub const OUTBOUND_PROBE_ADDR: &str = "8.8.8.8:80";

/// Read a variable from the process environment, treating blank values as unset.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
