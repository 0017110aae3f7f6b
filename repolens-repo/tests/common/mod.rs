//! Shared test utilities for the repository pipeline
//!
//! An in-memory API client with call counters, plus an in-process HTTP
//! server that stands in for the GitHub API.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use repolens_core::{
    RepoLensError, RepoLensResult, RepositoryRecord, TreeEntry, TreeListing, Webhook,
};
use repolens_repo::RepositoryApiClient;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::LazyLock;
use std::time::Duration;
use tokio::net::TcpListener;

pub const OWNER: &str = "octocat";

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

pub fn init_tracing() {
    LazyLock::force(&TRACING);
}

pub fn encode(text: &str) -> String {
    BASE64.encode(text.as_bytes())
}

/// Canned responses for one repository
#[derive(Clone)]
pub struct MockRepository {
    pub record: RepositoryRecord,
    pub tree: RepoLensResult<TreeListing>,
    pub webhooks: RepoLensResult<Vec<Webhook>>,
    pub contents: HashMap<String, RepoLensResult<Option<String>>>,
    pub delay: Duration,
}

impl MockRepository {
    pub fn new(name: &str, reported_size: u64) -> Self {
        Self {
            record: RepositoryRecord {
                name: Some(name.to_string()),
                owner_login: Some(OWNER.to_string()),
                size: Some(reported_size),
                private: Some(false),
            },
            tree: Ok(TreeListing::default()),
            webhooks: Ok(Vec::new()),
            contents: HashMap::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_entries(mut self, entries: Vec<TreeEntry>) -> Self {
        self.tree = Ok(TreeListing {
            entries,
            truncated: false,
        });
        self
    }

    pub fn truncated(mut self) -> Self {
        self.tree = Ok(TreeListing {
            entries: vec![TreeEntry::blob("partial.rs", 10.0)],
            truncated: true,
        });
        self
    }

    pub fn with_tree_error(mut self, error: RepoLensError) -> Self {
        self.tree = Err(error);
        self
    }

    pub fn with_webhooks(mut self, webhooks: Vec<Webhook>) -> Self {
        self.webhooks = Ok(webhooks);
        self
    }

    pub fn with_webhook_error(mut self, error: RepoLensError) -> Self {
        self.webhooks = Err(error);
        self
    }

    pub fn with_content(mut self, path: &str, content: RepoLensResult<Option<String>>) -> Self {
        self.contents.insert(path.to_string(), content);
        self
    }

    pub fn private(mut self) -> Self {
        self.record.private = Some(true);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// In-memory API client that records how it is called
#[derive(Default)]
pub struct MockClient {
    repositories: HashMap<String, MockRepository>,
    pub login_calls: AtomicUsize,
    pub record_calls: AtomicUsize,
    pub content_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(mut self, repository: MockRepository) -> Self {
        let name = repository.record.name.clone().unwrap_or_default();
        self.repositories.insert(name, repository);
        self
    }

    pub fn peak(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn repository(&self, owner: &str, repo: &str) -> RepoLensResult<&MockRepository> {
        if owner != OWNER {
            return Err(RepoLensError::not_found(format!("repos/{}/{}", owner, repo), "mock"));
        }
        self.repositories
            .get(repo)
            .ok_or_else(|| RepoLensError::not_found(format!("repos/{}/{}", owner, repo), "mock"))
    }
}

#[async_trait]
impl RepositoryApiClient for MockClient {
    async fn get_repository(&self, owner: &str, repo: &str) -> RepoLensResult<RepositoryRecord> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.repository(owner, repo).map(|r| r.delay).unwrap_or_default();
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.repository(owner, repo)?.record.clone())
    }

    async fn get_tree(
        &self,
        owner: &str,
        repo: &str,
        _tree_ref: &str,
    ) -> RepoLensResult<TreeListing> {
        self.repository(owner, repo)?.tree.clone()
    }

    async fn list_webhooks(&self, owner: &str, repo: &str) -> RepoLensResult<Vec<Webhook>> {
        self.repository(owner, repo)?.webhooks.clone()
    }

    async fn get_encoded_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> RepoLensResult<Option<String>> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);
        match self.repository(owner, repo)?.contents.get(path) {
            Some(content) => content.clone(),
            None => Err(RepoLensError::not_found(
                format!("repos/{}/{}/contents/{}", owner, repo, path),
                "mock",
            )),
        }
    }

    async fn get_authenticated_login(&self) -> RepoLensResult<String> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(OWNER.to_string())
    }
}

pub fn webhook(id: u64, active: bool) -> Webhook {
    Webhook {
        id,
        name: Some("web".to_string()),
        active: Some(active),
        url: Some(format!("https://hooks.example.com/{}", id)),
    }
}

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_server(router: axum::Router) -> String {
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}
