//! Integration test helpers
//!
//! Builds the application router around an in-memory API client so requests
//! can be driven with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use http_body_util::BodyExt;
use repolens_core::{
    RepoLensError, RepoLensResult, RepositoryRecord, ServiceConfig, TreeEntry, TreeListing,
    Webhook,
};
use repolens_repo::{RepositoryApiClient, RepositoryService, WorkerPool};
use repolens_web::{create_app, AppState};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tower::ServiceExt;

pub const OWNER: &str = "octocat";
pub const FRONTEND_URL: &str = "http://localhost:3000";

// Make sure tracing is only initialised once
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
});

/// Fixed responses keyed by repository name
#[derive(Default)]
pub struct FixtureClient {
    records: HashMap<String, RepositoryRecord>,
    trees: HashMap<String, RepoLensResult<TreeListing>>,
    webhooks: HashMap<String, Vec<Webhook>>,
    contents: HashMap<(String, String), String>,
    failing: HashMap<String, RepoLensError>,
    login: Option<RepoLensError>,
}

impl FixtureClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repository(mut self, name: &str, reported_size: u64, entries: Vec<TreeEntry>) -> Self {
        self.records.insert(
            name.to_string(),
            RepositoryRecord {
                name: Some(name.to_string()),
                owner_login: Some(OWNER.to_string()),
                size: Some(reported_size),
                private: Some(false),
            },
        );
        self.trees.insert(
            name.to_string(),
            Ok(TreeListing {
                entries,
                truncated: false,
            }),
        );
        self
    }

    pub fn truncated(mut self, name: &str) -> Self {
        if let Some(Ok(listing)) = self.trees.get_mut(name) {
            listing.truncated = true;
        }
        self
    }

    pub fn webhooks(mut self, name: &str, webhooks: Vec<Webhook>) -> Self {
        self.webhooks.insert(name.to_string(), webhooks);
        self
    }

    pub fn content(mut self, name: &str, path: &str, encoded: &str) -> Self {
        self.contents
            .insert((name.to_string(), path.to_string()), encoded.to_string());
        self
    }

    pub fn failing(mut self, name: &str, error: RepoLensError) -> Self {
        self.failing.insert(name.to_string(), error);
        self
    }

    pub fn failing_login(mut self, error: RepoLensError) -> Self {
        self.login = Some(error);
        self
    }

    fn check(&self, owner: &str, repo: &str) -> RepoLensResult<()> {
        if let Some(error) = self.failing.get(repo) {
            return Err(error.clone());
        }
        if owner != OWNER || !self.records.contains_key(repo) {
            return Err(RepoLensError::not_found(
                format!("/repos/{}/{}", owner, repo),
                "fixture",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RepositoryApiClient for FixtureClient {
    async fn get_repository(&self, owner: &str, repo: &str) -> RepoLensResult<RepositoryRecord> {
        self.check(owner, repo)?;
        Ok(self.records[repo].clone())
    }

    async fn get_tree(
        &self,
        owner: &str,
        repo: &str,
        _tree_ref: &str,
    ) -> RepoLensResult<TreeListing> {
        self.check(owner, repo)?;
        self.trees[repo].clone()
    }

    async fn list_webhooks(&self, owner: &str, repo: &str) -> RepoLensResult<Vec<Webhook>> {
        self.check(owner, repo)?;
        Ok(self.webhooks.get(repo).cloned().unwrap_or_default())
    }

    async fn get_encoded_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> RepoLensResult<Option<String>> {
        self.check(owner, repo)?;
        self.contents
            .get(&(repo.to_string(), path.to_string()))
            .cloned()
            .map(Some)
            .ok_or_else(|| RepoLensError::not_found(path.to_string(), "fixture"))
    }

    async fn get_authenticated_login(&self) -> RepoLensResult<String> {
        match &self.login {
            Some(error) => Err(error.clone()),
            None => Ok(OWNER.to_string()),
        }
    }
}

/// Test application wrapper
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new(client: FixtureClient, repositories: &[&str]) -> Self {
        LazyLock::force(&TRACING);

        let config = ServiceConfig {
            github_token: "test-token".to_string(),
            repositories: repositories.iter().map(|r| r.to_string()).collect(),
            frontend_url: FRONTEND_URL.to_string(),
            ..Default::default()
        };

        let pool = Arc::new(WorkerPool::new(2).expect("Failed to start worker pool"));
        let service = RepositoryService::new(
            Arc::new(client),
            pool,
            config.repositories.clone(),
            config.max_concurrent_fetches,
        );

        let state = AppState::with_service(config, service);
        let router = create_app(state.clone()).expect("Failed to create app");

        Self { router, state }
    }

    /// Send a GET request and decode the JSON body
    pub async fn get(&self, uri: &str) -> (axum::http::StatusCode, serde_json::Value) {
        let response = self.request(Request::builder().uri(uri).body(Body::empty()).unwrap()).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    pub async fn request(&self, request: Request<Body>) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request.")
    }
}
