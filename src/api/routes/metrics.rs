//! Prometheus scrape endpoint

use axum::{extract::State, http::header, response::IntoResponse};

use crate::api::{ApiResult, state::ScrapeState};

/// GET /metrics
///
/// Returns every registered series in the text exposition format
pub async fn scrape(State(state): State<ScrapeState>) -> ApiResult<impl IntoResponse> {
    let body = state.metrics.encode()?;

    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}
