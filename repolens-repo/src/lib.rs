//! RepoLens Repository - Repository analysis pipeline
//!
//! Fetches repository metadata from the remote API, offloads tree analysis and
//! content normalization to a worker pool, and assembles summary and detail records

pub mod analyzer;
pub mod api;
pub mod identity;
pub mod normalizer;
pub mod service;
pub mod worker_pool;

pub use analyzer::*;
pub use api::{ApiClientConfig, GitHubApiClient, RepositoryApiClient};
pub use identity::OwnerResolver;
pub use normalizer::*;
pub use service::RepositoryService;
pub use worker_pool::{WorkerPool, WorkerPoolStats};
