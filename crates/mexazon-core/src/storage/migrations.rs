//! Schema migrations
//!
//! Versioned steps recorded in `_migrations`; each step and its record commit
//! together, so a failed step leaves the previous version in place.

use anyhow::Context;
use sqlx::SqlitePool;

/// Latest schema version
pub const CURRENT_VERSION: i32 = 2;

/// SQL for creating the migrations tracking table
const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 1: Directory schema
const MIGRATION_V1: &str = r#"
    -- Users (customers and business owners share this table)
    CREATE TABLE IF NOT EXISTS users (
        user_id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_type TEXT NOT NULL DEFAULT 'customer' CHECK (user_type IN ('customer', 'business')),
        email TEXT NOT NULL UNIQUE,
        phone TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        description TEXT,
        avatar_url TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- A business shares its identifier with the owning user
    CREATE TABLE IF NOT EXISTS business (
        business_id INTEGER PRIMARY KEY NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
        is_active BOOLEAN NOT NULL DEFAULT 1
    );

    CREATE INDEX IF NOT EXISTS idx_business_is_active ON business(is_active);

    -- Postal code catalog (read-only reference data)
    CREATE TABLE IF NOT EXISTS postal_code_catalog (
        postal_code TEXT NOT NULL,
        colonia TEXT NOT NULL,
        alcaldia TEXT NOT NULL,
        PRIMARY KEY (postal_code, colonia)
    );

    CREATE INDEX IF NOT EXISTS idx_pcc_alcaldia ON postal_code_catalog(alcaldia);

    -- At most one address per user
    CREATE TABLE IF NOT EXISTS users_address (
        user_id INTEGER PRIMARY KEY NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
        postal_code TEXT NOT NULL,
        colonia TEXT NOT NULL,
        street TEXT,
        number TEXT,
        FOREIGN KEY (postal_code, colonia) REFERENCES postal_code_catalog(postal_code, colonia)
    );

    CREATE INDEX IF NOT EXISTS idx_ua_cp_colonia ON users_address(postal_code, colonia);

    -- Menu categories
    CREATE TABLE IF NOT EXISTS menu_categories (
        category_id INTEGER PRIMARY KEY AUTOINCREMENT,
        category_name TEXT NOT NULL,
        CONSTRAINT uq_category_name UNIQUE (category_name)
    );

    -- Dishes on a business menu
    CREATE TABLE IF NOT EXISTS dishes (
        dish_id INTEGER PRIMARY KEY AUTOINCREMENT,
        business_id INTEGER NOT NULL REFERENCES business(business_id) ON DELETE CASCADE,
        category_id INTEGER NOT NULL REFERENCES menu_categories(category_id),
        dish_name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        price REAL NOT NULL CHECK (price >= 0),
        photo_url TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_dishes_business_id ON dishes(business_id);
    CREATE INDEX IF NOT EXISTS idx_dishes_category_id ON dishes(category_id);
"#;

/// Migration 2: Reviews, photos and rating aggregates
const MIGRATION_V2: &str = r#"
    -- Reviews (one per author per business)
    CREATE TABLE IF NOT EXISTS posts (
        post_id INTEGER PRIMARY KEY AUTOINCREMENT,
        author_user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
        reviewed_business_id INTEGER NOT NULL REFERENCES business(business_id) ON DELETE CASCADE,
        rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
        description TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        CONSTRAINT uq_author_business_once UNIQUE (author_user_id, reviewed_business_id)
    );

    CREATE INDEX IF NOT EXISTS idx_posts_author_created ON posts(author_user_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_posts_business_created ON posts(reviewed_business_id, created_at);

    -- Photos attached to a review, ordered per post
    CREATE TABLE IF NOT EXISTS post_photos (
        photo_id INTEGER PRIMARY KEY AUTOINCREMENT,
        post_id INTEGER NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
        photo_url TEXT NOT NULL,
        photo_order INTEGER NOT NULL,
        CONSTRAINT uq_post_photo_order UNIQUE (post_id, photo_order)
    );

    -- Rating aggregate per reviewed business
    CREATE VIEW IF NOT EXISTS business_review_stats AS
        SELECT reviewed_business_id AS business_id,
               COUNT(*) AS review_count,
               AVG(rating) AS avg_rating
        FROM posts
        GROUP BY reviewed_business_id;
"#;

/// One schema step, applied atomically with its `_migrations` row
struct Migration {
    version: i32,
    name: &'static str,
    sql: &'static str,
}

/// Every schema step in application order
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "Directory schema",
        sql: MIGRATION_V1,
    },
    Migration {
        version: 2,
        name: "Reviews and rating aggregates",
        sql: MIGRATION_V2,
    },
];

async fn applied_version(pool: &SqlitePool) -> anyhow::Result<i32> {
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    let version: Option<i32> = sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
        .fetch_one(pool)
        .await?;
    Ok(version.unwrap_or(0))
}

/// Apply every migration newer than the recorded version
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let applied = applied_version(pool).await?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > applied).collect();

    if pending.is_empty() {
        tracing::debug!(version = applied, "Database schema is up to date");
        return Ok(());
    }

    for migration in pending {
        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.sql)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Migration v{} failed", migration.version))?;
        sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
            .bind(migration.version)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }

    tracing::info!(version = CURRENT_VERSION, "Database migrations completed");
    Ok(())
}

/// Recorded and target schema versions
pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<MigrationStatus> {
    let current_version = applied_version(pool).await?;
    Ok(MigrationStatus {
        current_version,
        target_version: CURRENT_VERSION,
        needs_migration: current_version < CURRENT_VERSION,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub current_version: i32,
    pub target_version: i32,
    pub needs_migration: bool,
}
