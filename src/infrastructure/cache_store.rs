//! Cache Store: the persisted table of per-(product, store) cache records.
//!
//! Single source of truth for "is this product's external copy fresh". All
//! bulk transitions are single set-based statements scoped by store, stamp
//! `updated_at`, de-duplicate their id set, and treat an empty set as a
//! no-op rather than an error.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use std::sync::Arc;
use tracing::debug;

use crate::SyncError;
use crate::domain::cache::CacheRecord;
use crate::domain::paging::dedup_ids;
use crate::domain::{ProductId, StoreId};

const SELECT_COLUMNS: &str =
    "id, product_id, store_id, serialized_data, in_sync, is_dirty, is_deleted, updated_at";

/// Repository over the `product_cache` table.
#[derive(Clone)]
pub struct CacheStore {
    pool: Arc<SqlitePool>,
}

impl CacheStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    // ===============================
    // KEYED LOOKUPS
    // ===============================

    /// The record for one (product, store) key, deleted or not.
    pub async fn get(
        &self,
        product_id: ProductId,
        store_id: StoreId,
    ) -> Result<Option<CacheRecord>, SyncError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM product_cache WHERE product_id = ? AND store_id = ?"
        );
        let row = sqlx::query(&sql)
            .bind(product_id)
            .bind(store_id)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.map(map_record))
    }

    /// Resolve a queue job's identifier hints back to current cache rows.
    pub async fn get_by_product_ids_and_store_id(
        &self,
        product_ids: &[ProductId],
        store_id: StoreId,
    ) -> Result<Vec<CacheRecord>, SyncError> {
        let ids = dedup_ids(product_ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM product_cache \
             WHERE store_id = ? AND product_id IN ({})",
            placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql).bind(store_id);
        for id in &ids {
            query = query.bind(*id);
        }
        let rows = query.fetch_all(&*self.pool).await?;
        Ok(rows.into_iter().map(map_record).collect())
    }

    /// Dirty, non-deleted product ids for a store in keyset order.
    ///
    /// `after_product_id` pages the result so a full sync pass can walk an
    /// arbitrarily large backlog in bounded fetches.
    pub async fn get_dirty_product_ids(
        &self,
        store_id: StoreId,
        after_product_id: ProductId,
        limit: i64,
    ) -> Result<Vec<ProductId>, SyncError> {
        let rows = sqlx::query(
            "SELECT product_id FROM product_cache \
             WHERE store_id = ? AND is_dirty = 1 AND is_deleted = 0 AND product_id > ? \
             ORDER BY product_id ASC LIMIT ?",
        )
        .bind(store_id)
        .bind(after_product_id)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows.into_iter().map(|row| row.get("product_id")).collect())
    }

    /// Deletion-flagged product ids whose removal has not been pushed yet.
    pub async fn get_pending_deletion_ids(
        &self,
        store_id: StoreId,
        after_product_id: ProductId,
        limit: i64,
    ) -> Result<Vec<ProductId>, SyncError> {
        let rows = sqlx::query(
            "SELECT product_id FROM product_cache \
             WHERE store_id = ? AND is_deleted = 1 AND is_dirty = 1 AND product_id > ? \
             ORDER BY product_id ASC LIMIT ?",
        )
        .bind(store_id)
        .bind(after_product_id)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows.into_iter().map(|row| row.get("product_id")).collect())
    }

    // ===============================
    // ROW PLUMBING (used by the Cache Service)
    // ===============================

    pub async fn insert(&self, record: &CacheRecord) -> Result<i64, SyncError> {
        let result = sqlx::query(
            "INSERT INTO product_cache \
             (product_id, store_id, serialized_data, in_sync, is_dirty, is_deleted, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.product_id)
        .bind(record.store_id)
        .bind(&record.serialized_data)
        .bind(record.in_sync)
        .bind(record.is_dirty)
        .bind(record.is_deleted)
        .bind(record.updated_at)
        .execute(&*self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn update(&self, record: &CacheRecord) -> Result<(), SyncError> {
        sqlx::query(
            "UPDATE product_cache \
             SET serialized_data = ?, in_sync = ?, is_dirty = ?, is_deleted = ?, updated_at = ? \
             WHERE product_id = ? AND store_id = ?",
        )
        .bind(&record.serialized_data)
        .bind(record.in_sync)
        .bind(record.is_dirty)
        .bind(record.is_deleted)
        .bind(record.updated_at)
        .bind(record.product_id)
        .bind(record.store_id)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    // ===============================
    // BULK TRANSITIONS
    // ===============================

    /// Invalidate every live record of a store, e.g. after a config change.
    pub async fn mark_all_dirty_by_store(&self, store_id: StoreId) -> Result<u64, SyncError> {
        let result = sqlx::query(
            "UPDATE product_cache SET is_dirty = 1, in_sync = 0, updated_at = ? \
             WHERE store_id = ? AND is_deleted = 0",
        )
        .bind(Utc::now())
        .bind(store_id)
        .execute(&*self.pool)
        .await?;
        debug!(store_id, rows = result.rows_affected(), "marked all dirty");
        Ok(result.rows_affected())
    }

    /// Flag records as needing a resend, creating a dirty placeholder row
    /// for any id that has never been cached. A product whose very first
    /// push fails must still surface as backlog, so the flag cannot be a
    /// plain UPDATE. Deletion-flagged rows are left untouched.
    pub async fn mark_dirty(
        &self,
        product_ids: &[ProductId],
        store_id: StoreId,
    ) -> Result<u64, SyncError> {
        let ids = dedup_ids(product_ids);
        if ids.is_empty() {
            return Ok(0);
        }
        let rows = vec!["(?, ?, NULL, 0, 1, 0, ?)"; ids.len()].join(", ");
        let sql = format!(
            "INSERT INTO product_cache \
             (product_id, store_id, serialized_data, in_sync, is_dirty, is_deleted, updated_at) \
             VALUES {rows} \
             ON CONFLICT(product_id, store_id) DO UPDATE \
             SET is_dirty = 1, in_sync = 0, updated_at = excluded.updated_at \
             WHERE product_cache.is_deleted = 0",
        );
        let now = Utc::now();
        let mut query = sqlx::query(&sql);
        for id in &ids {
            query = query.bind(*id).bind(store_id).bind(now);
        }
        let result = query.execute(&*self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Flag records as freshly pushed.
    pub async fn mark_in_sync(
        &self,
        product_ids: &[ProductId],
        store_id: StoreId,
    ) -> Result<u64, SyncError> {
        self.set_flags(
            product_ids,
            store_id,
            "in_sync = 1, is_dirty = 0",
            "is_deleted = 0",
        )
        .await
    }

    /// Flag records for deletion: the product left this store's catalog and
    /// the removal still has to be pushed to the external service.
    pub async fn flag_for_deletion(
        &self,
        product_ids: &[ProductId],
        store_id: StoreId,
    ) -> Result<u64, SyncError> {
        self.set_flags(
            product_ids,
            store_id,
            "is_deleted = 1, is_dirty = 1, in_sync = 0",
            "1 = 1",
        )
        .await
    }

    /// Confirm that the external service dropped these products.
    pub async fn mark_deleted(
        &self,
        product_ids: &[ProductId],
        store_id: StoreId,
    ) -> Result<u64, SyncError> {
        self.set_flags(
            product_ids,
            store_id,
            "is_deleted = 1, is_dirty = 0, in_sync = 0",
            "1 = 1",
        )
        .await
    }

    /// Hard eviction of every record of a store (store removal).
    pub async fn delete_by_store(&self, store_id: StoreId) -> Result<u64, SyncError> {
        let result = sqlx::query("DELETE FROM product_cache WHERE store_id = ?")
            .bind(store_id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ===============================
    // OPERATIONAL COUNTS
    // ===============================

    pub async fn get_total_dirty(&self, store_id: StoreId) -> Result<i64, SyncError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM product_cache \
             WHERE store_id = ? AND is_dirty = 1 AND is_deleted = 0",
        )
        .bind(store_id)
        .fetch_one(&*self.pool)
        .await?;
        Ok(count)
    }

    pub async fn get_total_out_of_sync(&self, store_id: StoreId) -> Result<i64, SyncError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM product_cache \
             WHERE store_id = ? AND in_sync = 0 AND is_deleted = 0",
        )
        .bind(store_id)
        .fetch_one(&*self.pool)
        .await?;
        Ok(count)
    }

    /// One set-based UPDATE over a de-duplicated id set. Empty set: no-op.
    async fn set_flags(
        &self,
        product_ids: &[ProductId],
        store_id: StoreId,
        assignments: &str,
        guard: &str,
    ) -> Result<u64, SyncError> {
        let ids = dedup_ids(product_ids);
        if ids.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "UPDATE product_cache SET {assignments}, updated_at = ? \
             WHERE store_id = ? AND {guard} AND product_id IN ({})",
            placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql).bind(Utc::now()).bind(store_id);
        for id in &ids {
            query = query.bind(*id);
        }
        let result = query.execute(&*self.pool).await?;
        Ok(result.rows_affected())
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn map_record(row: SqliteRow) -> CacheRecord {
    CacheRecord {
        id: Some(row.get("id")),
        product_id: row.get("product_id"),
        store_id: row.get("store_id"),
        serialized_data: row.get("serialized_data"),
        in_sync: row.get("in_sync"),
        is_dirty: row.get("is_dirty"),
        is_deleted: row.get("is_deleted"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }
}
