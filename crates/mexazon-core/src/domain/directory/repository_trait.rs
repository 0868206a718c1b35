//! Repository trait for directory lookups
//!
//! Read-only access to the records search consumes but does not own.

use async_trait::async_trait;

use crate::error::Result;

use super::entity::{
    BusinessProfile, DishWithCategory, MenuCategory, PostalCatalogEntry, RatingSummary,
    ReviewAggregate, UserAddress,
};

#[async_trait]
pub trait DirectoryRepositoryTrait: Send + Sync {
    /// Look up a business with its owner's public fields
    async fn find_business(&self, business_id: i64) -> Result<Option<BusinessProfile>>;

    async fn list_active_businesses(&self) -> Result<Vec<BusinessProfile>>;

    async fn find_address(&self, user_id: i64) -> Result<Option<UserAddress>>;

    /// Single catalog row for an address. Search reaches the catalog through
    /// the area subquery instead.
    async fn find_catalog_entry(
        &self,
        postal_code: &str,
        colonia: &str,
    ) -> Result<Option<PostalCatalogEntry>>;

    /// Every colonia registered under a postal code
    async fn list_catalog_by_postal_code(&self, postal_code: &str)
    -> Result<Vec<PostalCatalogEntry>>;

    /// Administrative area of a user, following address then catalog.
    ///
    /// `None` when the user has no address or the address has no catalog row.
    async fn resolve_user_area(&self, user_id: i64) -> Result<Option<String>>;

    async fn list_dishes(&self, business_id: i64) -> Result<Vec<DishWithCategory>>;

    async fn list_menu_categories(&self) -> Result<Vec<MenuCategory>>;

    /// Review count and average; zeroes for a business without reviews.
    ///
    /// Search result cards read the same figures from the
    /// `business_review_stats` view in one join rather than per business.
    async fn review_aggregate(&self, business_id: i64) -> Result<ReviewAggregate>;

    async fn rating_summary(&self, business_id: i64) -> Result<RatingSummary>;
}
