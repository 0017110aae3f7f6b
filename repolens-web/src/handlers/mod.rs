//! HTTP request handlers for the RepoLens web server

pub mod health;
pub mod repository;
pub mod types;

pub use health::*;
pub use repository::*;

pub use types::*;
