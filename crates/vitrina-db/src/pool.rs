//! Connection pool setup and schema initialization.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use vitrina_core::AppError;

const MAX_CONNECTIONS: u32 = 5;

/// Statements are executed one by one at startup; every table and index is
/// `IF NOT EXISTS` so re-running is safe. The unique index on
/// `upload_profiles.slug` is the store's only concurrency guard: concurrent
/// creations of the same slug serialize on it and the loser gets a conflict.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS upload_profiles (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    crop INTEGER NOT NULL,
    max_size INTEGER NOT NULL,
    aspect_ratio TEXT NOT NULL,
    thumbnail_width INTEGER NOT NULL,
    cropped_width INTEGER NOT NULL,
    original_path TEXT NOT NULL,
    cropped_path TEXT NOT NULL,
    thumbnails_path TEXT NOT NULL,
    created_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    full_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    image_original TEXT NOT NULL DEFAULT '',
    image_thumbnail TEXT NOT NULL DEFAULT '',
    image_cropped TEXT NOT NULL DEFAULT '',
    created_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sellers (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    description TEXT,
    address TEXT,
    city TEXT,
    country TEXT,
    email TEXT,
    image_original TEXT NOT NULL DEFAULT '',
    image_thumbnail TEXT NOT NULL DEFAULT '',
    image_cropped TEXT NOT NULL DEFAULT '',
    promotions INTEGER NOT NULL DEFAULT 0,
    created_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS promotions (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    description TEXT,
    seller_id TEXT NOT NULL,
    original_price REAL NOT NULL,
    discounted_price REAL NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    expiry TEXT NOT NULL,
    image_original TEXT NOT NULL DEFAULT '',
    image_thumbnail TEXT NOT NULL DEFAULT '',
    image_cropped TEXT NOT NULL DEFAULT '',
    created_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_promotions_seller ON promotions (seller_id);
CREATE INDEX IF NOT EXISTS idx_upload_profiles_name ON upload_profiles (name);
"#;

pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> Result<(), AppError> {
    let statements: Vec<&str> = SCHEMA
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    tracing::debug!("Running {} schema statements", statements.len());
    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    // A single connection keeps every test query on the same in-memory
    // database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    init_schema(&pool).await.expect("schema");
    pool
}
