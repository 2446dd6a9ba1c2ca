// Database connection and pool management
// This module handles SQLite database connections using sqlx

use anyhow::Result;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;

pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    pub async fn new(database_url: &str) -> Result<Self> {
        // Create database file directory if it doesn't exist
        let db_path = if database_url.starts_with("sqlite://") {
            database_url.trim_start_matches("sqlite://")
        } else if database_url.starts_with("sqlite:") {
            database_url.trim_start_matches("sqlite:")
        } else {
            database_url
        };

        if db_path != ":memory:" && !Path::new(db_path).exists() {
            if let Some(parent) = Path::new(db_path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            std::fs::File::create(db_path)?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// In-memory database, used by tests and single-shot tooling.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        let create_product_cache_sql = r#"
            CREATE TABLE IF NOT EXISTS product_cache (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id INTEGER NOT NULL,
                store_id INTEGER NOT NULL,
                serialized_data TEXT,
                in_sync INTEGER NOT NULL DEFAULT 0,
                is_dirty INTEGER NOT NULL DEFAULT 1,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (product_id, store_id)
            )
        "#;

        let create_sync_queue_sql = r#"
            CREATE TABLE IF NOT EXISTS sync_queue (
                id TEXT PRIMARY KEY,
                store_id INTEGER NOT NULL,
                product_ids TEXT NOT NULL,
                product_id_count INTEGER NOT NULL,
                action TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'new',
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                started_at DATETIME,
                completed_at DATETIME
            )
        "#;

        let create_cache_store_index_sql = r#"
            CREATE INDEX IF NOT EXISTS idx_product_cache_store_dirty
            ON product_cache (store_id, is_dirty, is_deleted)
        "#;

        let create_queue_store_index_sql = r#"
            CREATE INDEX IF NOT EXISTS idx_sync_queue_store_status
            ON sync_queue (store_id, status)
        "#;

        sqlx::query(create_product_cache_sql)
            .execute(&self.pool)
            .await?;
        sqlx::query(create_sync_queue_sql)
            .execute(&self.pool)
            .await?;
        sqlx::query(create_cache_store_index_sql)
            .execute(&self.pool)
            .await?;
        sqlx::query(create_queue_store_index_sql)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
