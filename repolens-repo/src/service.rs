//! Repository fetch orchestration
//!
//! Combines the remote API, the owner resolver and the worker pool into the
//! two read operations: summaries of every configured repository and the
//! details of one of them.

use crate::api::{ApiClientConfig, GitHubApiClient, RepositoryApiClient};
use crate::identity::OwnerResolver;
use crate::worker_pool::WorkerPool;
use repolens_core::performance::measure_async;
use repolens_core::{
    join_all_ordered, ActiveWebhook, ConcurrencyLimiter, ConfigSample, RepoLensError,
    RepoLensResult, RepositoryDetails, RepositoryIdentifier, RepositoryRecord, RepositorySummary,
    ServiceConfig, TreeEntry, TreeListing,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Tree reference analyzed for every repository
pub const TREE_REF: &str = "HEAD";

/// What the summary path got back from the tree listing
enum TreeOutcome {
    Complete(Vec<TreeEntry>),
    Truncated,
    Unavailable(RepoLensError),
}

impl From<RepoLensResult<TreeListing>> for TreeOutcome {
    fn from(result: RepoLensResult<TreeListing>) -> Self {
        match result {
            Ok(listing) if listing.truncated => TreeOutcome::Truncated,
            Ok(listing) => TreeOutcome::Complete(listing.entries),
            Err(error) => TreeOutcome::Unavailable(error),
        }
    }
}

/// Fetches and assembles repository records
pub struct RepositoryService {
    client: Arc<dyn RepositoryApiClient>,
    owner: OwnerResolver,
    pool: Arc<WorkerPool>,
    limiter: ConcurrencyLimiter,
    repositories: Vec<String>,
}

impl RepositoryService {
    pub fn new(
        client: Arc<dyn RepositoryApiClient>,
        pool: Arc<WorkerPool>,
        repositories: Vec<String>,
        max_concurrent_fetches: usize,
    ) -> Self {
        Self {
            owner: OwnerResolver::new(Arc::clone(&client)),
            client,
            pool,
            limiter: ConcurrencyLimiter::new(max_concurrent_fetches),
            repositories,
        }
    }

    /// Build a service backed by the GitHub API
    pub fn from_config(config: &ServiceConfig, pool: Arc<WorkerPool>) -> RepoLensResult<Self> {
        let client = GitHubApiClient::new(ApiClientConfig::from_service_config(config))?;

        Ok(Self::new(
            Arc::new(client),
            pool,
            config.repositories.clone(),
            config.max_concurrent_fetches,
        ))
    }

    pub fn repositories(&self) -> &[String] {
        &self.repositories
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    pub fn max_concurrent_fetches(&self) -> usize {
        self.limiter.max_concurrent()
    }

    /// Summaries of every configured repository, in configuration order
    ///
    /// Fetches run concurrently up to the configured limit. Every fetch is
    /// allowed to settle; the first failure in configuration order is returned.
    pub async fn list_summaries(&self) -> RepoLensResult<Vec<RepositorySummary>> {
        let owner = self.owner.resolve_owner().await?;

        info!(
            owner = %owner,
            repositories = self.repositories.len(),
            max_concurrent = self.limiter.max_concurrent(),
            "Fetching repository summaries"
        );

        let fetches = self.repositories.iter().map(|name| {
            let owner = owner.as_str();
            async move { self.limiter.run(self.fetch_summary(owner, name)).await }
        });

        let results = measure_async("list_summaries", join_all_ordered(fetches)).await;
        results.into_iter().collect()
    }

    /// Summary of one repository
    ///
    /// The size is computed from the tree when possible. A truncated or
    /// unavailable tree falls back to the size reported by the API.
    #[instrument(skip_all, fields(repository = %RepositoryIdentifier::new(owner, name)))]
    pub async fn fetch_summary(
        &self,
        owner: &str,
        name: &str,
    ) -> RepoLensResult<RepositorySummary> {
        let (record, tree) = tokio::join!(
            self.client.get_repository(owner, name),
            self.client.get_tree(owner, name, TREE_REF),
        );

        let record = record
            .map_err(|e| e.with_operation("fetch_summary").in_repository(owner, name))?;

        let size_kilobytes = match TreeOutcome::from(tree) {
            TreeOutcome::Complete(entries) => match self.pool.analyze_tree(entries).await {
                Ok(analysis) => analysis.size_kilobytes(),
                Err(error) => {
                    warn!(error = %error, "Tree analysis failed; using reported size");
                    record.reported_size()
                }
            },
            TreeOutcome::Truncated => {
                warn!(
                    reported_size = record.reported_size(),
                    "Tree is truncated; degraded to reported size"
                );
                record.reported_size()
            }
            TreeOutcome::Unavailable(error) => {
                warn!(error = %error, "Tree listing failed; using reported size");
                record.reported_size()
            }
        };

        debug!(size_kilobytes, "Assembled repository summary");

        Ok(RepositorySummary {
            name: record_name(&record, name),
            owner: record_owner(&record, owner),
            size_kilobytes,
        })
    }

    /// Full details of one configured or unconfigured repository name
    ///
    /// Record, tree and webhooks must all be available. A truncated tree is an
    /// error here since the file count cannot be determined.
    pub async fn fetch_details(&self, name: &str) -> RepoLensResult<RepositoryDetails> {
        let owner = self.owner.resolve_owner().await?;

        measure_async("fetch_details", self.assemble_details(&owner, name))
            .await
            .map_err(|e| e.with_operation("fetch_details").in_repository(&owner, name))
    }

    #[instrument(skip_all, fields(repository = %RepositoryIdentifier::new(owner, name)))]
    async fn assemble_details(
        &self,
        owner: &str,
        name: &str,
    ) -> RepoLensResult<RepositoryDetails> {
        let (record, tree, webhooks) = tokio::try_join!(
            self.client.get_repository(owner, name),
            self.client.get_tree(owner, name, TREE_REF),
            self.client.list_webhooks(owner, name),
        )?;

        if tree.truncated {
            return Err(RepoLensError::tree_truncated(owner, name, "repository_service"));
        }

        let analysis = self.pool.analyze_tree(tree.entries).await?;

        let config_sample = match analysis.config_file_path.as_deref() {
            Some(path) => self.fetch_config_sample(owner, name, path).await?,
            None => None,
        };

        let active_webhooks: Vec<ActiveWebhook> = webhooks
            .into_iter()
            .filter(|hook| hook.is_active())
            .map(Into::into)
            .collect();

        debug!(
            file_count = analysis.file_count,
            active_webhooks = active_webhooks.len(),
            has_config_sample = config_sample.is_some(),
            "Assembled repository details"
        );

        Ok(RepositoryDetails {
            name: record_name(&record, name),
            owner: record_owner(&record, owner),
            size_kilobytes: analysis.size_kilobytes(),
            is_private: record.private.unwrap_or(false),
            file_count: analysis.file_count,
            config_sample,
            active_webhooks,
        })
    }

    async fn fetch_config_sample(
        &self,
        owner: &str,
        name: &str,
        path: &str,
    ) -> RepoLensResult<Option<ConfigSample>> {
        let encoded = match self.client.get_encoded_content(owner, name, path).await {
            Ok(Some(encoded)) => encoded,
            Ok(None) => return Ok(None),
            Err(error) if error.is_not_found() => {
                debug!(path, "Configuration file disappeared; no sample");
                return Ok(None);
            }
            Err(error) => return Err(error),
        };

        let normalized = self.pool.normalize_content(encoded).await?;

        Ok(normalized.map(|normalized_content| ConfigSample {
            path: path.to_string(),
            normalized_content,
        }))
    }
}

fn record_name(record: &RepositoryRecord, requested: &str) -> String {
    record.name.clone().unwrap_or_else(|| requested.to_string())
}

fn record_owner(record: &RepositoryRecord, owner: &str) -> String {
    record.owner_login.clone().unwrap_or_else(|| owner.to_string())
}

impl std::fmt::Debug for RepositoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryService")
            .field("repositories", &self.repositories)
            .field("max_concurrent_fetches", &self.limiter.max_concurrent())
            .field("pool", &self.pool)
            .finish()
    }
}
