//! Route definitions for the RepoLens web server

use crate::{handlers, openapi, AppState};
use axum::{routing::get, Router};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Repository queries
        .route("/repositories", get(handlers::list_repositories))
        .route("/repositories/{name}", get(handlers::get_repository))
        // API description
        .route("/openapi.json", get(openapi::openapi_json))
}
