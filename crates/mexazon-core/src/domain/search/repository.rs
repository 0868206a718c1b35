//! Search repository for database operations
//!
//! Executes composed business predicates against SQLite.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::entity::{PageRequest, SortSpec};
use super::mapper::BusinessRecord;
use super::repository_trait::BusinessSearchRepositoryTrait;
use crate::domain::specification::{BindValue, SqlPredicate};
use crate::error::{Error, Result};

/// Columns and joins shared by the page query
const SELECT_BUSINESS_CARDS: &str = r#"
    SELECT b.business_id,
           u.name AS owner_name,
           u.avatar_url,
           s.review_count,
           s.avg_rating
    FROM business b
    LEFT JOIN users u ON u.user_id = b.business_id
    LEFT JOIN business_review_stats s ON s.business_id = b.business_id
"#;

/// The count query never orders by the aggregate, so it skips that join
const COUNT_BUSINESSES: &str = r#"
    SELECT COUNT(*)
    FROM business b
    LEFT JOIN users u ON u.user_id = b.business_id
"#;

/// Repository for search database operations
#[derive(Debug, Clone)]
pub struct BusinessSearchRepository {
    pool: SqlitePool,
}

impl BusinessSearchRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Page query text and its binds (predicate values, then limit and offset)
    fn page_query(
        predicate: &SqlPredicate,
        sort: SortSpec,
        page: PageRequest,
    ) -> (String, Vec<BindValue>) {
        let sql = format!(
            "{} WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
            SELECT_BUSINESS_CARDS,
            predicate.sql(),
            sort.order_by()
        );

        let mut binds = predicate.binds().to_vec();
        binds.push(BindValue::Integer(page.limit()));
        binds.push(BindValue::Integer(page.offset()));
        (sql, binds)
    }

    fn count_query(predicate: &SqlPredicate) -> String {
        format!("{} WHERE {}", COUNT_BUSINESSES, predicate.sql())
    }
}

#[async_trait]
impl BusinessSearchRepositoryTrait for BusinessSearchRepository {
    async fn find_page(
        &self,
        predicate: &SqlPredicate,
        sort: SortSpec,
        page: PageRequest,
    ) -> Result<Vec<BusinessRecord>> {
        let (sql, binds) = Self::page_query(predicate, sort, page);

        tracing::debug!(
            sql = %sql,
            binds = binds.len(),
            page = page.page,
            size = page.size,
            "Executing business page query"
        );

        let mut query = sqlx::query_as::<_, BusinessRecord>(&sql);
        for value in binds {
            query = match value {
                BindValue::Text(v) => query.bind(v),
                BindValue::Integer(v) => query.bind(v),
            };
        }

        query
            .fetch_all(&self.pool)
            .await
            .map_err(Error::DatabaseError)
    }

    async fn count(&self, predicate: &SqlPredicate) -> Result<u64> {
        let sql = Self::count_query(predicate);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in predicate.binds().iter().cloned() {
            query = match value {
                BindValue::Text(v) => query.bind(v),
                BindValue::Integer(v) => query.bind(v),
            };
        }

        let total = query
            .fetch_one(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        u64::try_from(total).map_err(|_| Error::Parse(format!("Negative row count: {}", total)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::specification::BusinessSpecBuilder;
    use crate::storage::Database;

    async fn create_test_db() -> SqlitePool {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        db.pool().clone()
    }

    async fn insert_business(pool: &SqlitePool, id: i64, name: &str, active: bool) {
        sqlx::query(
            "INSERT INTO users (user_id, user_type, email, phone, name) VALUES (?, 'business', ?, ?, ?)",
        )
        .bind(id)
        .bind(format!("b{}@example.com", id))
        .bind(format!("55{:08}", id))
        .bind(name)
        .execute(pool)
        .await
        .unwrap();

        sqlx::query("INSERT INTO business (business_id, is_active) VALUES (?, ?)")
            .bind(id)
            .bind(active)
            .execute(pool)
            .await
            .unwrap();
    }

    #[test]
    fn test_page_query_appends_window_binds() {
        let predicate = BusinessSpecBuilder::new().with_text("pepe").build();
        let (sql, binds) = BusinessSearchRepository::page_query(
            &predicate,
            SortSpec::NAME_ASC,
            PageRequest::new(Some(2), Some(10)),
        );

        assert!(sql.contains("ORDER BY LOWER(u.name) ASC, b.business_id ASC LIMIT ? OFFSET ?"));
        assert_eq!(binds.len(), predicate.binds().len() + 2);
        assert_eq!(binds[binds.len() - 2], BindValue::Integer(10));
        assert_eq!(binds[binds.len() - 1], BindValue::Integer(20));
    }

    #[tokio::test]
    async fn test_find_page_and_count() {
        let pool = create_test_db().await;
        let repo = BusinessSearchRepository::new(pool.clone());

        insert_business(&pool, 1, "Birria La Güera", true).await;
        insert_business(&pool, 2, "antojitos mary", true).await;
        insert_business(&pool, 3, "Cerrado Temporal", false).await;

        let predicate = BusinessSpecBuilder::new().build();
        let rows = repo
            .find_page(&predicate, SortSpec::NAME_ASC, PageRequest::default())
            .await
            .unwrap();

        let ids: Vec<i64> = rows.iter().map(|r| r.business_id).collect();
        assert_eq!(ids, vec![2, 1], "name order must ignore case");
        assert!(rows.iter().all(|r| r.review_count.is_none()));

        assert_eq!(repo.count(&predicate).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_page_beyond_last_page_is_empty() {
        let pool = create_test_db().await;
        let repo = BusinessSearchRepository::new(pool.clone());
        insert_business(&pool, 1, "Solo", true).await;

        let predicate = BusinessSpecBuilder::new().build();
        let rows = repo
            .find_page(&predicate, SortSpec::NAME_ASC, PageRequest::new(Some(5), Some(10)))
            .await
            .unwrap();

        assert!(rows.is_empty());
        assert_eq!(repo.count(&predicate).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_closed_pool_propagates_database_error() {
        let pool = create_test_db().await;
        let repo = BusinessSearchRepository::new(pool.clone());
        pool.close().await;

        let err = repo
            .count(&BusinessSpecBuilder::new().build())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E400");
    }
}
