//! Storage layer - SQLite
//!
//! - `database`: pool construction from [`DatabaseConfig`] and health checks
//! - `migrations`: the directory schema and its version history
//!
//! ```ignore
//! use mexazon_core::storage::{Database, DatabaseConfig};
//!
//! let db = Database::new(DatabaseConfig::with_path("mexazon.db")).await?;
//! let status = db.migration_status().await?;
//! assert!(!status.needs_migration);
//! ```

pub mod database;
pub mod migrations;

pub use database::{Database, DatabaseConfig, default_database_path};
pub use migrations::{CURRENT_VERSION, MigrationStatus, migration_status, run_migrations};
