//! Directory service
//!
//! Business detail, postal catalog and menu category lookups used by
//! operators and the CLI.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::debug;

use super::entity::{BusinessDetail, MenuCategory, PostalCatalogEntry};
use super::repository::DirectoryRepository;
use super::repository_trait::DirectoryRepositoryTrait;
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct DirectoryService {
    repository: Arc<dyn DirectoryRepositoryTrait>,
}

impl DirectoryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_repository(Arc::new(DirectoryRepository::new(pool)))
    }

    pub fn with_repository(repository: Arc<dyn DirectoryRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Profile, address, area, menu and rating summary of one business
    pub async fn business_detail(&self, business_id: i64) -> Result<BusinessDetail> {
        let profile = self
            .repository
            .find_business(business_id)
            .await?
            .ok_or(Error::BusinessNotFound(business_id))?;

        let address = self.repository.find_address(business_id).await?;
        let area = match &address {
            Some(_) => self.repository.resolve_user_area(business_id).await?,
            None => None,
        };
        let dishes = self.repository.list_dishes(business_id).await?;
        let rating = self.repository.rating_summary(business_id).await?;

        debug!(
            business_id,
            dishes = dishes.len(),
            reviews = rating.review_count,
            "Loaded business detail"
        );

        Ok(BusinessDetail {
            profile,
            address,
            area,
            dishes,
            rating,
        })
    }

    /// Colonias registered under a postal code
    pub async fn colonias_for_postal_code(
        &self,
        postal_code: &str,
    ) -> Result<Vec<PostalCatalogEntry>> {
        let postal_code = postal_code.trim();
        if postal_code.is_empty() {
            return Err(Error::InvalidInput("postal code is blank".to_string()));
        }

        let entries = self
            .repository
            .list_catalog_by_postal_code(postal_code)
            .await?;
        if entries.is_empty() {
            return Err(Error::PostalCodeNotFound(postal_code.to_string()));
        }
        Ok(entries)
    }

    pub async fn menu_categories(&self) -> Result<Vec<MenuCategory>> {
        self.repository.list_menu_categories().await
    }
}
