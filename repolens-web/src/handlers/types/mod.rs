//! Request and response types for the HTTP handlers

pub mod common;

pub use common::*;

// Repository payloads are the pipeline's own records
pub use repolens_core::{ActiveWebhook, ConfigSample, RepositoryDetails, RepositorySummary};
