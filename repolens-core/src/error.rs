//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining.
//! Errors are cloneable so that a single failure can be handed to every waiter of a shared future.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

pub type RepoLensResult<T> = Result<T, RepoLensError>;

/// Error source shared between clones of the same error
pub type SharedSource = Arc<dyn std::error::Error + Send + Sync>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Machine-readable error classification exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    TreeTruncated,
    UpstreamError,
    ConfigurationError,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::TreeTruncated => "TREE_TRUNCATED",
            ErrorKind::UpstreamError => "UPSTREAM_ERROR",
            ErrorKind::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorKind::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for RepoLens
#[derive(Error, Debug, Clone)]
pub enum RepoLensError {
    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Repository {owner}/{name} tree is truncated; cannot determine file count. Try reducing repository size.")]
    TreeTruncated {
        owner: String,
        name: String,
        context: ErrorContext,
    },

    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        /// HTTP status reported by the remote API, when there was a response
        status: Option<u16>,
        /// Message reported by the remote API itself
        original_message: Option<String>,
        #[source]
        source: Option<SharedSource>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<SharedSource>,
        context: ErrorContext,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<SharedSource>,
        context: ErrorContext,
    },
}

impl RepoLensError {
    pub fn not_found(resource: impl Into<String>, component: &str) -> Self {
        RepoLensError::NotFound {
            resource: resource.into(),
            context: ErrorContext::new(component)
                .with_suggestion("Verify the repository name and the token's access to it"),
        }
    }

    pub fn tree_truncated(owner: &str, name: &str, component: &str) -> Self {
        RepoLensError::TreeTruncated {
            owner: owner.to_string(),
            name: name.to_string(),
            context: ErrorContext::new(component)
                .with_metadata("repository", &format!("{}/{}", owner, name)),
        }
    }

    pub fn upstream(message: impl Into<String>, status: Option<u16>, component: &str) -> Self {
        RepoLensError::Upstream {
            message: message.into(),
            status,
            original_message: None,
            source: None,
            context: ErrorContext::new(component),
        }
    }

    pub fn upstream_with_source<E>(message: impl Into<String>, source: E, component: &str) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RepoLensError::Upstream {
            message: message.into(),
            status: None,
            original_message: Some(source.to_string()),
            source: Some(Arc::new(source)),
            context: ErrorContext::new(component)
                .with_suggestion("Check network connectivity and API status"),
        }
    }

    pub fn configuration(message: impl Into<String>, component: &str) -> Self {
        RepoLensError::Configuration {
            message: message.into(),
            source: None,
            context: ErrorContext::new(component)
                .with_suggestion("Check the environment variables or the .env file"),
        }
    }

    pub fn internal(message: impl Into<String>, component: &str) -> Self {
        RepoLensError::Internal {
            message: message.into(),
            source: None,
            context: ErrorContext::new(component),
        }
    }

    /// Attach the remote API's own message to an upstream error
    pub fn with_original_message(mut self, message: impl Into<String>) -> Self {
        if let RepoLensError::Upstream {
            original_message, ..
        } = &mut self
        {
            *original_message = Some(message.into());
        }
        self
    }

    /// Record the operation that failed
    pub fn with_operation(mut self, operation: &str) -> Self {
        let context = self.context_mut();
        context.operation = Some(operation.to_string());
        self
    }

    /// Record the repository the failure belongs to
    pub fn in_repository(self, owner: &str, name: &str) -> Self {
        self.with_metadata("repository", &format!("{}/{}", owner, name))
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.context_mut()
            .metadata
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.context_mut()
            .recovery_suggestions
            .push(suggestion.to_string());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            RepoLensError::NotFound { context, .. }
            | RepoLensError::TreeTruncated { context, .. }
            | RepoLensError::Upstream { context, .. }
            | RepoLensError::Configuration { context, .. }
            | RepoLensError::Internal { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            RepoLensError::NotFound { context, .. }
            | RepoLensError::TreeTruncated { context, .. }
            | RepoLensError::Upstream { context, .. }
            | RepoLensError::Configuration { context, .. }
            | RepoLensError::Internal { context, .. } => context,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RepoLensError::NotFound { .. } => ErrorKind::NotFound,
            RepoLensError::TreeTruncated { .. } => ErrorKind::TreeTruncated,
            RepoLensError::Upstream { .. } => ErrorKind::UpstreamError,
            RepoLensError::Configuration { .. } => ErrorKind::ConfigurationError,
            RepoLensError::Internal { .. } => ErrorKind::InternalError,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// HTTP status associated with the failure, if the remote API produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            RepoLensError::NotFound { .. } => Some(404),
            RepoLensError::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    pub fn original_message(&self) -> Option<&str> {
        match self {
            RepoLensError::Upstream {
                original_message, ..
            } => original_message.as_deref(),
            _ => None,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let context = self.context();
        match self {
            RepoLensError::NotFound { .. } | RepoLensError::TreeTruncated { .. } => {
                warn!(
                    error_id = %context.error_id,
                    kind = %self.kind(),
                    repository = ?context.metadata.get("repository"),
                    error = %self,
                    "Request could not be satisfied"
                );
            }
            RepoLensError::Upstream { status, .. } => {
                warn!(
                    error_id = %context.error_id,
                    status = ?status,
                    repository = ?context.metadata.get("repository"),
                    error = %self,
                    "Upstream API error"
                );
            }
            RepoLensError::Configuration { .. } | RepoLensError::Internal { .. } => {
                error!(
                    error_id = %context.error_id,
                    kind = %self.kind(),
                    operation = ?context.operation,
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}
