//! API response types

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub from: String,
    pub target: String,
    pub timestamp: String,
    pub errors_total: u64,
    pub egress_mismatches_total: u64,
}
