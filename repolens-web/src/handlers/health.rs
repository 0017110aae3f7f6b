//! Health check handlers

use super::types::HealthResponse;
use crate::AppState;
use axum::{extract::State, response::Json};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    summary = "Health check",
    description = "Check the server health status and analysis worker pool activity",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let pool = state.pool();
    let now = chrono::Utc::now();

    Json(HealthResponse {
        status: if pool.is_shut_down() {
            "shutting_down".to_string()
        } else {
            "healthy".to_string()
        },
        timestamp: now,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (now - state.started_at).num_seconds(),
        repositories: state.repositories.repositories().len(),
        max_concurrent_fetches: state.repositories.max_concurrent_fetches(),
        worker_pool: pool.stats().into(),
    })
}
