//! Application state shared by every handler

use crate::WebResult;
use chrono::{DateTime, Utc};
use repolens_core::ServiceConfig;
use repolens_repo::{RepositoryService, WorkerPool};
use std::sync::Arc;
use tracing::info;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<ServiceConfig>,
    /// Repository fetch orchestration
    pub repositories: Arc<RepositoryService>,
    /// When the state was created
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create the state backed by the GitHub API and a pool sized to the host
    pub fn new(config: ServiceConfig) -> WebResult<Self> {
        let pool = Arc::new(WorkerPool::with_available_parallelism()?);
        let service = RepositoryService::from_config(&config, pool)?;

        info!(
            repositories = config.repositories.len(),
            max_concurrent_fetches = config.max_concurrent_fetches,
            api = %config.api_base_url,
            "Initialized application state"
        );

        Ok(Self::with_service(config, service))
    }

    /// Create the state around an already assembled service
    pub fn with_service(config: ServiceConfig, service: RepositoryService) -> Self {
        Self {
            config: Arc::new(config),
            repositories: Arc::new(service),
            started_at: Utc::now(),
        }
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        self.repositories.pool()
    }
}
