//! Search service for business discovery
//!
//! Composes the predicate for a request, runs the page and count queries
//! against the same predicate, and maps rows into result cards.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::debug;

use super::entity::{Page, PageRequest, SearchCriteria, SearchResult, SortSpec};
use super::repository::BusinessSearchRepository;
use super::repository_trait::BusinessSearchRepositoryTrait;
use super::specification::BusinessSpecBuilder;
use crate::domain::directory::{DirectoryRepository, DirectoryRepositoryTrait};
use crate::domain::specification::SqlPredicate;
use crate::error::Result;

/// Stateless business search over the directory
#[derive(Clone)]
pub struct SearchService {
    businesses: Arc<dyn BusinessSearchRepositoryTrait>,
    directory: Arc<dyn DirectoryRepositoryTrait>,
}

impl SearchService {
    /// Create a new search service backed by SQLite
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_repositories(
            Arc::new(BusinessSearchRepository::new(pool.clone())),
            Arc::new(DirectoryRepository::new(pool)),
        )
    }

    /// Create a service over arbitrary repositories
    pub fn with_repositories(
        businesses: Arc<dyn BusinessSearchRepositoryTrait>,
        directory: Arc<dyn DirectoryRepositoryTrait>,
    ) -> Self {
        Self {
            businesses,
            directory,
        }
    }

    /// Filtered, sorted, paginated search over active businesses
    ///
    /// Every absent criterion is ignored; present ones are combined with AND.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Page<SearchResult>> {
        let predicate = BusinessSpecBuilder::from_criteria(criteria).build();
        self.execute(predicate, criteria.sort, criteria.page).await
    }

    /// Active businesses in the user's administrative area, best rated first
    ///
    /// Returns [`Page::empty`] when the user's area cannot be resolved.
    pub async fn top_in_area(
        &self,
        user_id: i64,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Result<Page<SearchResult>> {
        let area = self.directory.resolve_user_area(user_id).await?;
        let Some(area) = area.filter(|a| !a.trim().is_empty()) else {
            debug!(user_id, "No resolvable area; returning empty page");
            return Ok(Page::empty());
        };

        let predicate = BusinessSpecBuilder::new().with_area(&area).build();
        self.execute(predicate, SortSpec::RATING_DESC, PageRequest::new(page, size))
            .await
    }

    async fn execute(
        &self,
        predicate: SqlPredicate,
        sort: SortSpec,
        request: PageRequest,
    ) -> Result<Page<SearchResult>> {
        debug!(
            predicate = predicate.sql(),
            binds = predicate.binds().len(),
            sort = %sort,
            page = request.page,
            size = request.size,
            "Executing business search"
        );

        let rows = self.businesses.find_page(&predicate, sort, request).await?;
        let total = self.businesses.count(&predicate).await?;

        let content = rows.into_iter().map(SearchResult::from).collect();
        Ok(Page::new(content, request, total))
    }
}
