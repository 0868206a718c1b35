//! Repository trait for business search
//!
//! This module defines the trait for executing composed search predicates.
//! The trait abstracts over different storage backends (SQLite, etc.).

use async_trait::async_trait;

use crate::domain::specification::SqlPredicate;
use crate::error::Result;

use super::entity::{PageRequest, SortSpec};
use super::mapper::BusinessRecord;

/// Repository trait for business search
///
/// Both operations take the same predicate so a page and its total always
/// describe the same result set.
#[async_trait]
pub trait BusinessSearchRepositoryTrait: Send + Sync {
    /// Fetch one ordered page of businesses satisfying `predicate`
    async fn find_page(
        &self,
        predicate: &SqlPredicate,
        sort: SortSpec,
        page: PageRequest,
    ) -> Result<Vec<BusinessRecord>>;

    /// Count every business satisfying `predicate`
    async fn count(&self, predicate: &SqlPredicate) -> Result<u64>;
}
