//! RepoLens Core - Core data structures, errors and shared runtime utilities
//!
//! This crate defines the data model of the repository analysis pipeline and
//! the ambient pieces (errors, logging, configuration) every other crate uses

pub mod async_utils;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use async_utils::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
