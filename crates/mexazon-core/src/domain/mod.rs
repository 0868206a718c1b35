//! Domain layer
//!
//! Contains the directory lookups and the business search engine.

pub mod directory;
pub mod search;
pub mod specification;
