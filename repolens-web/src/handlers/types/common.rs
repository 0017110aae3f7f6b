//! Common types used across multiple handlers

use repolens_repo::WorkerPoolStats;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Seconds since the server state was created
    #[schema(example = 3600)]
    pub uptime_seconds: i64,
    /// Number of configured repositories
    #[schema(example = 4)]
    pub repositories: usize,
    /// Upper bound on simultaneously fetched repositories
    #[schema(example = 2)]
    pub max_concurrent_fetches: usize,
    pub worker_pool: WorkerPoolHealth,
}

/// Analysis worker pool activity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPoolHealth {
    #[schema(example = 8)]
    pub workers: usize,
    #[schema(example = 8)]
    pub live_workers: usize,
    pub submitted: u64,
    pub completed: u64,
}

impl From<WorkerPoolStats> for WorkerPoolHealth {
    fn from(stats: WorkerPoolStats) -> Self {
        Self {
            workers: stats.workers,
            live_workers: stats.live_workers,
            submitted: stats.submitted,
            completed: stats.completed,
        }
    }
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Machine-readable error kind
    #[schema(example = "NOT_FOUND")]
    pub code: String,
    pub message: String,
    /// HTTP status reported by the remote API
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 404)]
    pub status: Option<u16>,
    /// Message reported by the remote API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_message: Option<String>,
}
