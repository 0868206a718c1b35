//! Mexazon Core Library
//!
//! This crate provides the core functionality for Mexazon, including:
//! - Storage (SQLite connection pool + schema migrations)
//! - Directory lookups (businesses, addresses, postal catalog, dishes, reviews)
//! - Business search (composable predicate engine with pagination)
//! - Configuration management

pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::directory::DirectoryService;
    pub use crate::domain::search::{Page, SearchCriteria, SearchResult, SearchService};
    pub use crate::error::{Error, Result};
    pub use crate::storage::Database;
}
