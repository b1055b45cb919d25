//! Health check endpoint

use axum::{Json, extract::State};

use crate::api::{state::ScrapeState, types::HealthResponse};

/// GET /health
pub async fn health_check(State(state): State<ScrapeState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        from: state.identity.to_string(),
        target: state.target_url.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        errors_total: state.metrics.total_errors(),
        egress_mismatches_total: state.metrics.total_mismatches(),
    })
}
