//! Directory repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::entity::{
    BusinessProfile, DishWithCategory, MenuCategory, PostalCatalogEntry, RatingSummary,
    ReviewAggregate, UserAddress,
};
use super::repository_trait::DirectoryRepositoryTrait;
use crate::error::{Error, Result};

const SELECT_BUSINESS_PROFILE: &str = r#"
    SELECT b.business_id, u.name, u.description, u.avatar_url, b.is_active
    FROM business b
    JOIN users u ON u.user_id = b.business_id
"#;

/// Repository for directory database operations
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: SqlitePool,
}

impl DirectoryRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DirectoryRepositoryTrait for DirectoryRepository {
    async fn find_business(&self, business_id: i64) -> Result<Option<BusinessProfile>> {
        let sql = format!("{} WHERE b.business_id = ?", SELECT_BUSINESS_PROFILE);
        let row: Option<BusinessProfileRow> = sqlx::query_as(&sql)
            .bind(business_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        Ok(row.map(BusinessProfileRow::into_profile))
    }

    async fn list_active_businesses(&self) -> Result<Vec<BusinessProfile>> {
        let sql = format!(
            "{} WHERE b.is_active = 1 ORDER BY b.business_id ASC",
            SELECT_BUSINESS_PROFILE
        );
        let rows: Vec<BusinessProfileRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        Ok(rows.into_iter().map(BusinessProfileRow::into_profile).collect())
    }

    async fn find_address(&self, user_id: i64) -> Result<Option<UserAddress>> {
        let row: Option<UserAddressRow> = sqlx::query_as(
            r#"
            SELECT user_id, postal_code, colonia, street, number
            FROM users_address
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(row.map(UserAddressRow::into_address))
    }

    async fn find_catalog_entry(
        &self,
        postal_code: &str,
        colonia: &str,
    ) -> Result<Option<PostalCatalogEntry>> {
        let row: Option<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT postal_code, colonia, alcaldia
            FROM postal_code_catalog
            WHERE postal_code = ? AND colonia = ?
            "#,
        )
        .bind(postal_code)
        .bind(colonia)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(row.map(catalog_entry))
    }

    async fn list_catalog_by_postal_code(
        &self,
        postal_code: &str,
    ) -> Result<Vec<PostalCatalogEntry>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT postal_code, colonia, alcaldia
            FROM postal_code_catalog
            WHERE postal_code = ?
            ORDER BY colonia ASC
            "#,
        )
        .bind(postal_code)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(rows.into_iter().map(catalog_entry).collect())
    }

    async fn resolve_user_area(&self, user_id: i64) -> Result<Option<String>> {
        let area: Option<String> = sqlx::query_scalar(
            r#"
            SELECT pc.alcaldia
            FROM users_address ua
            JOIN postal_code_catalog pc
              ON pc.postal_code = ua.postal_code AND pc.colonia = ua.colonia
            WHERE ua.user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(area)
    }

    async fn list_dishes(&self, business_id: i64) -> Result<Vec<DishWithCategory>> {
        let rows: Vec<DishRow> = sqlx::query_as(
            r#"
            SELECT d.dish_id, d.business_id, d.dish_name, d.description, d.price,
                   d.photo_url, mc.category_id, mc.category_name
            FROM dishes d
            JOIN menu_categories mc ON mc.category_id = d.category_id
            WHERE d.business_id = ?
            ORDER BY mc.category_name ASC, d.dish_name ASC, d.dish_id ASC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(rows.into_iter().map(DishRow::into_dish).collect())
    }

    async fn list_menu_categories(&self) -> Result<Vec<MenuCategory>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT category_id, category_name FROM menu_categories ORDER BY category_name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(rows
            .into_iter()
            .map(|(category_id, name)| MenuCategory { category_id, name })
            .collect())
    }

    async fn review_aggregate(&self, business_id: i64) -> Result<ReviewAggregate> {
        let row: Option<(i64, Option<f64>)> = sqlx::query_as(
            "SELECT review_count, avg_rating FROM business_review_stats WHERE business_id = ?",
        )
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(match row {
            Some((review_count, avg_rating)) => ReviewAggregate {
                business_id,
                review_count,
                average_rating: avg_rating.unwrap_or(0.0),
            },
            None => ReviewAggregate::empty(business_id),
        })
    }

    async fn rating_summary(&self, business_id: i64) -> Result<RatingSummary> {
        let counts: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT rating, COUNT(*)
            FROM posts
            WHERE reviewed_business_id = ?
            GROUP BY rating
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        let latest: Option<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT MAX(created_at) FROM posts WHERE reviewed_business_id = ?",
        )
        .bind(business_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        let counts = counts
            .into_iter()
            .map(|(rating, count)| star(rating).map(|s| (s, count)))
            .collect::<Result<Vec<_>>>()?;

        Ok(RatingSummary::from_counts(business_id, counts, latest))
    }
}

fn star(rating: i64) -> Result<u8> {
    u8::try_from(rating)
        .ok()
        .filter(|s| (1..=5).contains(s))
        .ok_or_else(|| Error::Parse(format!("Invalid rating: {}", rating)))
}

fn catalog_entry((postal_code, colonia, alcaldia): (String, String, String)) -> PostalCatalogEntry {
    PostalCatalogEntry {
        postal_code,
        colonia,
        alcaldia,
    }
}

#[derive(sqlx::FromRow)]
struct BusinessProfileRow {
    business_id: i64,
    name: String,
    description: Option<String>,
    avatar_url: Option<String>,
    is_active: bool,
}

impl BusinessProfileRow {
    fn into_profile(self) -> BusinessProfile {
        BusinessProfile {
            business_id: self.business_id,
            name: self.name,
            description: self.description,
            avatar_url: self.avatar_url,
            is_active: self.is_active,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserAddressRow {
    user_id: i64,
    postal_code: String,
    colonia: String,
    street: Option<String>,
    number: Option<String>,
}

impl UserAddressRow {
    fn into_address(self) -> UserAddress {
        UserAddress {
            user_id: self.user_id,
            postal_code: self.postal_code,
            colonia: self.colonia,
            street: self.street,
            number: self.number,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DishRow {
    dish_id: i64,
    business_id: i64,
    dish_name: String,
    description: String,
    price: f64,
    photo_url: Option<String>,
    category_id: i64,
    category_name: String,
}

impl DishRow {
    fn into_dish(self) -> DishWithCategory {
        DishWithCategory {
            dish_id: self.dish_id,
            business_id: self.business_id,
            name: self.dish_name,
            description: self.description,
            price: self.price,
            photo_url: self.photo_url,
            category: MenuCategory {
                category_id: self.category_id,
                name: self.category_name,
            },
        }
    }
}
