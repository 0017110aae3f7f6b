//! API clients for the remote repository-hosting service
//!
//! The pipeline only depends on the [`RepositoryApiClient`] contract; the
//! GitHub implementation is the one used in production.

use async_trait::async_trait;
use repolens_core::{
    ErrorContext, RepoLensError, RepoLensResult, RepositoryRecord, TreeListing, Webhook,
};
use serde::Deserialize;
use std::sync::Arc;

pub mod github;


pub use github::GitHubApiClient;

/// Configuration for API clients
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Access token for authentication
    pub access_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            access_token: None,
            timeout_seconds: 30,
            user_agent: concat!("repolens/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiClientConfig {
    /// Create a new configuration for GitHub
    pub fn github(access_token: Option<String>) -> Self {
        Self {
            base_url: repolens_core::DEFAULT_API_URL.to_string(),
            access_token,
            ..Default::default()
        }
    }

    /// Build a client configuration from the service configuration
    pub fn from_service_config(config: &repolens_core::ServiceConfig) -> Self {
        Self::github(Some(config.github_token.clone()))
            .with_base_url(config.api_base_url.clone())
            .with_timeout(config.request_timeout_seconds)
    }

    /// Point the client at another API root (GitHub Enterprise, test servers)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Contract of the remote repository-hosting API
#[async_trait]
pub trait RepositoryApiClient: Send + Sync {
    /// Get the repository record
    async fn get_repository(&self, owner: &str, repo: &str) -> RepoLensResult<RepositoryRecord>;

    /// Get the recursive tree listing at `tree_ref`
    async fn get_tree(&self, owner: &str, repo: &str, tree_ref: &str)
        -> RepoLensResult<TreeListing>;

    /// List the repository webhooks
    async fn list_webhooks(&self, owner: &str, repo: &str) -> RepoLensResult<Vec<Webhook>>;

    /// Get the base64-encoded content of a file
    ///
    /// Returns `None` when the path does not resolve to a single file with content.
    async fn get_encoded_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> RepoLensResult<Option<String>>;

    /// Get the login of the account the client is authenticated as
    async fn get_authenticated_login(&self) -> RepoLensResult<String> {
        Err(RepoLensError::Configuration {
            message: "API client cannot resolve the authenticated user".to_string(),
            source: None,
            context: ErrorContext::new("api_client")
                .with_operation("get_authenticated_login")
                .with_suggestion("Use a client that supports identity lookup"),
        })
    }
}

/// Helper function to create HTTP client with common configuration
pub(crate) fn create_http_client(config: &ApiClientConfig) -> RepoLensResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(&config.user_agent)
            .map_err(|e| client_setup_error(format!("Invalid user agent: {}", e), e))?,
    );

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| client_setup_error(format!("Failed to create HTTP client: {}", e), e))
}

fn client_setup_error<E>(message: String, source: E) -> RepoLensError
where
    E: std::error::Error + Send + Sync + 'static,
{
    RepoLensError::Configuration {
        message,
        source: Some(Arc::new(source)),
        context: ErrorContext::new("http_client").with_operation("create_client"),
    }
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Helper function to turn a non-success response into a typed error
///
/// A 404 becomes [`RepoLensError::NotFound`]; every other status becomes an
/// upstream error carrying the status and the API's own message.
pub(crate) async fn handle_response_error(
    response: reqwest::Response,
    operation: &str,
) -> RepoLensError {
    let status = response.status();
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();

    let original_message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.message)
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    if status == reqwest::StatusCode::NOT_FOUND {
        return RepoLensError::NotFound {
            resource: url.path().to_string(),
            context: ErrorContext::new("api_client")
                .with_operation(operation)
                .with_suggestion("Repository not found or not accessible"),
        };
    }

    RepoLensError::upstream(
        format!("HTTP {} error for {}: {}", status.as_u16(), url.path(), original_message),
        Some(status.as_u16()),
        "api_client",
    )
    .with_original_message(original_message)
    .with_operation(operation)
    .with_suggestion(match status.as_u16() {
        401 => "Check your access token",
        403 | 429 => "Check repository permissions or rate limits",
        _ => "Check network connectivity and API status",
    })
}
