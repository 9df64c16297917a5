//! Colloquium Common Library
//!
//! Shared code for the Colloquium research community site:
//! - Database models, schema creation and the repository
//! - Page views over researchers, references, projects, events and posts
//! - The admin capability table and its generic list query
//! - Upload path conventions
//! - Error types, configuration, metrics

pub mod admin;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod uploads;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
