//! Directory entities
//!
//! Read-only views over the records the directory collaborators own:
//! businesses and their owners, addresses, the postal catalog, menus and
//! review aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A business together with its owning user's public fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// Shared with the owning user's id
    pub business_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
}

/// A user's address (at most one per user)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAddress {
    pub user_id: i64,
    pub postal_code: String,
    pub colonia: String,
    pub street: Option<String>,
    pub number: Option<String>,
}

/// Postal catalog row keyed by (postal code, colonia)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalCatalogEntry {
    pub postal_code: String,
    pub colonia: String,
    /// Administrative area (alcaldía / municipality)
    pub alcaldia: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCategory {
    pub category_id: i64,
    pub name: String,
}

/// A dish joined to its category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishWithCategory {
    pub dish_id: i64,
    pub business_id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub photo_url: Option<String>,
    pub category: MenuCategory,
}

/// Review count and average rating of one business
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewAggregate {
    pub business_id: i64,
    pub review_count: i64,
    pub average_rating: f64,
}

impl ReviewAggregate {
    /// Aggregate of a business nobody has reviewed yet
    pub fn empty(business_id: i64) -> Self {
        Self {
            business_id,
            review_count: 0,
            average_rating: 0.0,
        }
    }
}

/// Rating aggregate plus the per-star distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub business_id: i64,
    pub review_count: i64,
    pub average_rating: f64,
    /// Review count per star, every star from 1 to 5 present
    pub distribution: BTreeMap<u8, i64>,
    pub latest_review_at: Option<DateTime<Utc>>,
}

impl RatingSummary {
    /// Build a summary from `(stars, count)` pairs; missing stars count zero
    pub fn from_counts(
        business_id: i64,
        counts: impl IntoIterator<Item = (u8, i64)>,
        latest_review_at: Option<DateTime<Utc>>,
    ) -> Self {
        let mut distribution: BTreeMap<u8, i64> = (1..=5).map(|star| (star, 0)).collect();
        for (star, count) in counts {
            *distribution.entry(star).or_insert(0) += count;
        }

        let review_count: i64 = distribution.values().sum();
        let weighted: i64 = distribution
            .iter()
            .map(|(star, count)| i64::from(*star) * count)
            .sum();
        let average_rating = if review_count == 0 {
            0.0
        } else {
            weighted as f64 / review_count as f64
        };

        Self {
            business_id,
            review_count,
            average_rating,
            distribution,
            latest_review_at,
        }
    }

    pub fn aggregate(&self) -> ReviewAggregate {
        ReviewAggregate {
            business_id: self.business_id,
            review_count: self.review_count,
            average_rating: self.average_rating,
        }
    }
}

/// Everything the directory knows about one business
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessDetail {
    pub profile: BusinessProfile,
    pub address: Option<UserAddress>,
    pub area: Option<String>,
    pub dishes: Vec<DishWithCategory>,
    pub rating: RatingSummary,
}
