//! Core data type definitions

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Repository identifier - the owner is always the authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryIdentifier {
    pub owner: String,
    pub name: String,
}

impl RepositoryIdentifier {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for RepositoryIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One entry of a recursive repository tree listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Path relative to the repository root
    pub path: Option<String>,
    /// Entry type as reported by the API (blob, tree, commit)
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Size in bytes, only reported for blobs
    #[serde(rename = "size")]
    pub size_bytes: Option<f64>,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>, size_bytes: impl Into<Option<f64>>) -> Self {
        Self {
            path: Some(path.into()),
            kind: Some("blob".to_string()),
            size_bytes: size_bytes.into(),
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            kind: Some("tree".to_string()),
            size_bytes: None,
        }
    }

    pub fn is_blob(&self) -> bool {
        self.kind.as_deref() == Some("blob")
    }
}

/// Derived statistics of a tree listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeAnalysisResult {
    pub total_bytes: u64,
    pub file_count: u64,
    /// First YAML path in listing order
    pub config_file_path: Option<String>,
}

impl TreeAnalysisResult {
    /// Total size rounded to whole kilobytes
    pub fn size_kilobytes(&self) -> u64 {
        kilobytes_from_bytes(self.total_bytes)
    }
}

/// Convert bytes to kilobytes, rounding half away from zero
pub fn kilobytes_from_bytes(bytes: u64) -> u64 {
    (bytes as f64 / 1024.0).round() as u64
}

/// Repository summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RepositorySummary {
    #[cfg_attr(feature = "openapi", schema(example = "hello-world"))]
    pub name: String,
    #[cfg_attr(feature = "openapi", schema(example = "octocat"))]
    pub owner: String,
    /// Size in kilobytes
    #[serde(rename = "size")]
    #[cfg_attr(feature = "openapi", schema(example = 1024))]
    pub size_kilobytes: u64,
}

/// Sample of the first configuration file found in a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ConfigSample {
    #[cfg_attr(feature = "openapi", schema(example = ".github/workflows/ci.yml"))]
    pub path: String,
    #[serde(rename = "content")]
    pub normalized_content: String,
}

/// Webhook projected to its public shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ActiveWebhook {
    #[cfg_attr(feature = "openapi", schema(example = "12345678"))]
    pub id: String,
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Repository details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RepositoryDetails {
    pub name: String,
    pub owner: String,
    #[serde(rename = "size")]
    pub size_kilobytes: u64,
    pub is_private: bool,
    pub file_count: u64,
    #[serde(rename = "yamlSample")]
    pub config_sample: Option<ConfigSample>,
    pub active_webhooks: Vec<ActiveWebhook>,
}

/// Repository record as returned by the remote API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub name: Option<String>,
    pub owner_login: Option<String>,
    /// Size in kilobytes as computed by the remote API
    pub size: Option<u64>,
    pub private: Option<bool>,
}

impl RepositoryRecord {
    pub fn reported_size(&self) -> u64 {
        self.size.unwrap_or(0)
    }
}

/// Recursive tree listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeListing {
    pub entries: Vec<TreeEntry>,
    /// Set when the remote API could not enumerate the whole tree
    pub truncated: bool,
}

/// Webhook as returned by the remote API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: u64,
    pub name: Option<String>,
    pub active: Option<bool>,
    pub url: Option<String>,
}

impl Webhook {
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }
}

impl From<Webhook> for ActiveWebhook {
    fn from(hook: Webhook) -> Self {
        Self {
            id: hook.id.to_string(),
            name: hook.name,
            url: hook.url,
        }
    }
}
