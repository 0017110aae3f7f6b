//! GitHub API client implementation

use async_trait::async_trait;
use repolens_core::{
    RepoLensError, RepoLensResult, RepositoryRecord, TreeEntry, TreeListing, Webhook,
};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::{create_http_client, handle_response_error, ApiClientConfig, RepositoryApiClient};

/// Page size used for webhook listings; GitHub caps it at 100
const WEBHOOKS_PER_PAGE: u32 = 100;

/// GitHub API client
pub struct GitHubApiClient {
    client: reqwest::Client,
    config: ApiClientConfig,
}

/// GitHub repository response
#[derive(Debug, Deserialize)]
struct GitHubRepository {
    name: Option<String>,
    owner: Option<GitHubAccount>,
    size: Option<u64>,
    private: Option<bool>,
}

/// GitHub account (owner or authenticated user)
#[derive(Debug, Deserialize)]
struct GitHubAccount {
    login: String,
}

/// GitHub tree response
#[derive(Debug, Deserialize)]
struct GitHubTreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    truncated: Option<bool>,
}

/// GitHub webhook
#[derive(Debug, Deserialize)]
struct GitHubHook {
    id: u64,
    name: Option<String>,
    active: Option<bool>,
    #[serde(default)]
    config: HashMap<String, serde_json::Value>,
}

/// GitHub content response; directories come back as arrays
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GitHubContentResponse {
    Directory(Vec<IgnoredAny>),
    File {
        content: Option<String>,
        encoding: Option<String>,
    },
}

impl GitHubApiClient {
    /// Create a new GitHub API client
    pub fn new(config: ApiClientConfig) -> RepoLensResult<Self> {
        let client = create_http_client(&config)?;

        info!("Created GitHub API client for {}", config.base_url);

        Ok(Self { client, config })
    }

    /// Create authorization headers
    fn create_auth_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();

        if let Some(ref token) = self.config.access_token {
            if let Ok(auth_value) =
                reqwest::header::HeaderValue::from_str(&format!("token {}", token))
            {
                headers.insert(reqwest::header::AUTHORIZATION, auth_value);
            }
        }

        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        headers
    }

    /// Make a GET request to GitHub API and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        operation: &str,
    ) -> RepoLensResult<T> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );

        debug!("Making GitHub API request to: {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.create_auth_headers())
            .send()
            .await
            .map_err(|e| {
                RepoLensError::upstream_with_source(
                    format!("Failed to make request to GitHub API: {}", e),
                    e,
                    "github_api_client",
                )
                .with_operation(operation)
            })?;

        if !response.status().is_success() {
            return Err(handle_response_error(response, operation).await);
        }

        response.json::<T>().await.map_err(|e| {
            RepoLensError::upstream_with_source(
                format!("Failed to parse GitHub response: {}", e),
                e,
                "github_api_client",
            )
            .with_operation(operation)
        })
    }
}

/// Percent-encode each segment of a repository path, keeping the separators
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn repo_endpoint(owner: &str, repo: &str) -> String {
    format!(
        "repos/{}/{}",
        urlencoding::encode(owner),
        urlencoding::encode(repo)
    )
}

#[async_trait]
impl RepositoryApiClient for GitHubApiClient {
    async fn get_repository(&self, owner: &str, repo: &str) -> RepoLensResult<RepositoryRecord> {
        debug!("Fetching GitHub repository record for {}/{}", owner, repo);

        let github_repo: GitHubRepository = self
            .get_json(&repo_endpoint(owner, repo), "get_repository")
            .await?;

        Ok(RepositoryRecord {
            name: github_repo.name,
            owner_login: github_repo.owner.map(|account| account.login),
            size: github_repo.size,
            private: github_repo.private,
        })
    }

    async fn get_tree(
        &self,
        owner: &str,
        repo: &str,
        tree_ref: &str,
    ) -> RepoLensResult<TreeListing> {
        debug!(
            "Fetching GitHub file tree for {}/{} (ref: {})",
            owner, repo, tree_ref
        );

        let endpoint = format!(
            "{}/git/trees/{}?recursive=1",
            repo_endpoint(owner, repo),
            urlencoding::encode(tree_ref)
        );
        let tree_response: GitHubTreeResponse = self.get_json(&endpoint, "get_tree").await?;

        let truncated = tree_response.truncated.unwrap_or(false);
        if truncated {
            warn!("GitHub file tree was truncated for {}/{}", owner, repo);
        }

        debug!(
            "Retrieved {} tree entries from GitHub repository {}/{}",
            tree_response.tree.len(),
            owner,
            repo
        );

        Ok(TreeListing {
            entries: tree_response.tree,
            truncated,
        })
    }

    async fn list_webhooks(&self, owner: &str, repo: &str) -> RepoLensResult<Vec<Webhook>> {
        debug!("Listing GitHub webhooks for {}/{}", owner, repo);

        let endpoint = format!(
            "{}/hooks?per_page={}",
            repo_endpoint(owner, repo),
            WEBHOOKS_PER_PAGE
        );
        let hooks: Vec<GitHubHook> = self.get_json(&endpoint, "list_webhooks").await?;

        Ok(hooks
            .into_iter()
            .map(|hook| Webhook {
                id: hook.id,
                name: hook.name,
                active: hook.active,
                url: hook
                    .config
                    .get("url")
                    .and_then(|url| url.as_str())
                    .map(str::to_string),
            })
            .collect())
    }

    async fn get_encoded_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> RepoLensResult<Option<String>> {
        debug!(
            "Fetching GitHub file content for {}/{}/{}",
            owner, repo, path
        );

        let endpoint = format!("{}/contents/{}", repo_endpoint(owner, repo), encode_path(path));
        let response: GitHubContentResponse =
            self.get_json(&endpoint, "get_encoded_content").await?;

        match response {
            GitHubContentResponse::Directory(_) => {
                debug!("{} in {}/{} is a directory", path, owner, repo);
                Ok(None)
            }
            GitHubContentResponse::File { content, encoding } => match encoding.as_deref() {
                None | Some("base64") => Ok(content),
                Some(other) => {
                    debug!(
                        "Unexpected content encoding '{}' for {}/{}/{}",
                        other, owner, repo, path
                    );
                    Ok(None)
                }
            },
        }
    }

    async fn get_authenticated_login(&self) -> RepoLensResult<String> {
        debug!("Resolving authenticated GitHub user");

        let account: GitHubAccount = self.get_json("user", "get_authenticated_login").await?;

        info!("Authenticated as GitHub user {}", account.login);
        Ok(account.login)
    }
}
