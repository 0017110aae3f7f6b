//! RepoLens Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebError, WebResult};
use axum::serve;
use repolens_core::ServiceConfig;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Main RepoLens web server
pub struct RepoLensServer {
    config: ServiceConfig,
    state: AppState,
}

impl RepoLensServer {
    /// Create a new RepoLens server
    pub fn new(config: ServiceConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone())?;

        Ok(Self { config, state })
    }

    /// Start the web server and run until interrupted
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting RepoLens Web Server");
        info!("Server address: http://{}", address);
        info!("Allowed frontend origin: {}", self.config.frontend_url);

        let app = create_app(self.state.clone())?;

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        let result = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        // Queued analysis jobs are abandoned once the server stops.
        self.state.pool().shutdown();

        if let Err(e) = result {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server shut down gracefully");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Builder for RepoLensServer
pub struct RepoLensServerBuilder {
    config: ServiceConfig,
}

impl RepoLensServerBuilder {
    /// Create a new server builder from the loaded service configuration
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the allowed frontend origin
    pub fn frontend_url<S: Into<String>>(mut self, frontend_url: S) -> Self {
        self.config.frontend_url = frontend_url.into();
        self
    }

    /// Set the bound on simultaneously fetched repositories
    pub fn max_concurrent_fetches(mut self, max_concurrent_fetches: usize) -> Self {
        self.config.max_concurrent_fetches = max_concurrent_fetches;
        self
    }

    /// Build the server
    pub fn build(self) -> WebResult<RepoLensServer> {
        self.config.validate()?;
        RepoLensServer::new(self.config)
    }
}
