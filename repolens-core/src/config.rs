//! Service configuration loaded from the process environment

use crate::error::{ErrorContext, RepoLensError, RepoLensResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 2;

/// Configuration for the repository analysis service
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Access token for the remote API
    pub github_token: String,
    /// Base URL of the remote API
    pub api_base_url: String,
    /// Repository names summarized by the listing query
    pub repositories: Vec<String>,
    /// Host the HTTP server binds to
    pub host: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Origin allowed by CORS
    pub frontend_url: String,
    /// Upper bound on simultaneously fetched repositories
    pub max_concurrent_fetches: usize,
    /// Remote API request timeout in seconds
    pub request_timeout_seconds: u64,
}

// Keep the token out of logs
impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("github_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("repositories", &self.repositories)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("frontend_url", &self.frontend_url)
            .field("max_concurrent_fetches", &self.max_concurrent_fetches)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            github_token: String::new(),
            api_base_url: DEFAULT_API_URL.to_string(),
            repositories: Vec::new(),
            host: "127.0.0.1".to_string(),
            port: 4200,
            frontend_url: "http://localhost:3000".to_string(),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            request_timeout_seconds: 30,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> RepoLensResult<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Load configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> RepoLensResult<Self> {
        let defaults = Self::default();
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let github_token = get("GITHUB_TOKEN")
            .map(str::to_string)
            .ok_or_else(|| config_error("GITHUB_TOKEN is required", "GITHUB_TOKEN"))?;

        let repositories = match get("REPOSITORIES_TO_FETCH") {
            Some(raw) => parse_repository_list(raw)?,
            None => defaults.repositories,
        };

        let config = Self {
            github_token,
            api_base_url: get("GITHUB_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            repositories,
            host: get("HOST").map(str::to_string).unwrap_or(defaults.host),
            port: parse_number(get("PORT"), "PORT", defaults.port)?,
            frontend_url: get("FRONTEND_URL")
                .map(str::to_string)
                .unwrap_or(defaults.frontend_url),
            max_concurrent_fetches: parse_number(
                get("MAX_CONCURRENT_FETCHES"),
                "MAX_CONCURRENT_FETCHES",
                defaults.max_concurrent_fetches,
            )?,
            request_timeout_seconds: parse_number(
                get("GITHUB_TIMEOUT_SECONDS"),
                "GITHUB_TIMEOUT_SECONDS",
                defaults.request_timeout_seconds,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> RepoLensResult<()> {
        if self.github_token.trim().is_empty() {
            return Err(config_error("GITHUB_TOKEN must not be empty", "GITHUB_TOKEN"));
        }

        if self.max_concurrent_fetches == 0 {
            return Err(config_error(
                "MAX_CONCURRENT_FETCHES must be greater than 0",
                "MAX_CONCURRENT_FETCHES",
            ));
        }

        if self.repositories.iter().any(|name| name.trim().is_empty()) {
            return Err(config_error(
                "REPOSITORIES_TO_FETCH must not contain empty names",
                "REPOSITORIES_TO_FETCH",
            ));
        }

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse the JSON array of repository names
pub fn parse_repository_list(raw: &str) -> RepoLensResult<Vec<String>> {
    let names: Vec<String> = serde_json::from_str(raw).map_err(|e| RepoLensError::Configuration {
        message: format!("REPOSITORIES_TO_FETCH must be a JSON array of strings: {}", e),
        source: Some(std::sync::Arc::new(e)),
        context: ErrorContext::new("config")
            .with_operation("parse_repository_list")
            .with_suggestion(r#"Example: REPOSITORIES_TO_FETCH='["repo-a","repo-b"]'"#),
    })?;

    Ok(names.into_iter().map(|name| name.trim().to_string()).collect())
}

fn parse_number<T: std::str::FromStr>(
    raw: Option<&str>,
    key: &str,
    default: T,
) -> RepoLensResult<T> {
    match raw {
        Some(value) => value
            .parse()
            .map_err(|_| config_error(&format!("{} must be a number, got '{}'", key, value), key)),
        None => Ok(default),
    }
}

fn config_error(message: &str, key: &str) -> RepoLensError {
    RepoLensError::configuration(message, "config")
        .with_operation("load")
        .with_metadata("variable", key)
}
