//! OpenAPI specification for the RepoLens web server

use axum::response::Json;
use utoipa::OpenApi;

use crate::handlers::{
    ActiveWebhook, ConfigSample, ErrorResponse, HealthResponse, RepositoryDetails,
    RepositorySummary, WorkerPoolHealth,
};

/// Main OpenAPI specification for the RepoLens web server
#[derive(OpenApi)]
#[openapi(
    info(
        title = "RepoLens API",
        version = "0.1.0",
        description = "Repository size, file count, configuration sample and webhook analysis",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:4200", description = "Local development server")
    ),
    paths(
        // Health endpoints
        crate::handlers::health_check,

        // Repository queries
        crate::handlers::list_repositories,
        crate::handlers::get_repository,
    ),
    components(
        schemas(
            HealthResponse,
            WorkerPoolHealth,
            ErrorResponse,
            RepositorySummary,
            RepositoryDetails,
            ConfigSample,
            ActiveWebhook,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Repository", description = "Repository analysis queries"),
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI specification
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Get the OpenAPI specification as JSON
pub fn get_openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}

/// Get the OpenAPI specification as YAML
pub fn get_openapi_yaml() -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "RepoLens API");
        assert_eq!(openapi.info.version, "0.1.0");
        assert!(openapi.paths.paths.contains_key("/api/repositories"));
        assert!(openapi.paths.paths.contains_key("/api/repositories/{name}"));
        assert!(openapi.paths.paths.contains_key("/api/health"));
    }

    #[test]
    fn test_openapi_json() {
        let json = get_openapi_json().unwrap();
        assert!(json.contains("RepoLens API"));
        assert!(json.contains("yamlSample"));
        assert!(json.contains("activeWebhooks"));
    }

    #[test]
    fn test_openapi_yaml() {
        let yaml = get_openapi_yaml().unwrap();
        assert!(yaml.contains("RepoLens API"));
        assert!(yaml.contains("0.1.0"));
    }
}
