//! Shared state passed to every handler

use std::sync::Arc;

use crate::metrics::MonitorMetrics;

#[derive(Clone)]
pub struct ScrapeState {
    /// Registered series, read-only from the handlers' point of view
    pub metrics: MonitorMetrics,

    /// Value of the constant `from` label
    pub identity: Arc<str>,

    /// URL the probe loop is watching
    pub target_url: Arc<str>,
}

impl ScrapeState {
    pub fn new(metrics: MonitorMetrics, identity: &str, target_url: &str) -> Self {
        Self {
            metrics,
            identity: Arc::from(identity),
            target_url: Arc::from(target_url),
        }
    }
}
