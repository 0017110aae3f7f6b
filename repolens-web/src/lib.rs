//! RepoLens Web Server
//!
//! HTTP/JSON query interface over the repository analysis pipeline.

pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use error::ApiError;
pub use server::{RepoLensServer, RepoLensServerBuilder};
pub use state::AppState;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use repolens_core::RepoLensError;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
pub fn create_app(state: AppState) -> WebResult<Router> {
    let origin = state
        .config
        .frontend_url
        .parse::<HeaderValue>()
        .map_err(|e| {
            WebError::Config(format!(
                "Invalid FRONTEND_URL '{}': {}",
                state.config.frontend_url, e
            ))
        })?;

    // Other origins get no allow-origin header at all
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([Method::GET])
        .allow_credentials(true)
        .allow_headers([ACCEPT, CONTENT_TYPE]);

    Ok(Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error(transparent)]
    Service(#[from] RepoLensError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
