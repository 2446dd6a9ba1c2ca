//! Update Queue repository: persisted batch jobs over the `sync_queue` table.
//!
//! The queue is a derived, disposable work-list. Losing it only delays
//! resynchronization; the Cache Store keeps the truth.

use chrono::{DateTime, Duration, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::SyncError;
use crate::domain::StoreId;
use crate::domain::queue::{QueueAction, QueueJob, QueueStatus};

/// Repository over the `sync_queue` table.
#[derive(Clone)]
pub struct QueueStore {
    pool: Arc<SqlitePool>,
}

impl QueueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn save(&self, job: &QueueJob) -> Result<(), SyncError> {
        let product_ids = serde_json::to_string(&job.product_ids)?;
        sqlx::query(
            "INSERT INTO sync_queue \
             (id, store_id, product_ids, product_id_count, action, status, created_at, started_at, completed_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(job.id.to_string())
        .bind(job.store_id)
        .bind(product_ids)
        .bind(job.product_id_count)
        .bind(job.action.as_str())
        .bind(job.status.as_str())
        .bind(job.created_at)
        .bind(job.started_at)
        .bind(job.completed_at)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, job_id: Uuid) -> Result<Option<QueueJob>, SyncError> {
        let row = sqlx::query("SELECT * FROM sync_queue WHERE id = ?")
            .bind(job_id.to_string())
            .fetch_optional(&*self.pool)
            .await?;
        row.map(map_job).transpose()
    }

    pub async fn get_by_store(&self, store_id: StoreId) -> Result<Vec<QueueJob>, SyncError> {
        let rows = sqlx::query("SELECT * FROM sync_queue WHERE store_id = ? ORDER BY created_at ASC")
            .bind(store_id)
            .fetch_all(&*self.pool)
            .await?;
        rows.into_iter().map(map_job).collect()
    }

    /// Backlog size: jobs not yet done for a store.
    pub async fn get_total_count(&self, store_id: StoreId) -> Result<i64, SyncError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sync_queue WHERE store_id = ? AND status != 'done'")
                .bind(store_id)
                .fetch_one(&*self.pool)
                .await?;
        Ok(count)
    }

    /// Advance New -> Started. A replayed job that is already past New is
    /// left untouched; the guard keeps the lifecycle monotonic.
    pub async fn mark_started(&self, job_id: Uuid) -> Result<bool, SyncError> {
        let result = sqlx::query(
            "UPDATE sync_queue SET status = 'started', started_at = ? \
             WHERE id = ? AND status = 'new'",
        )
        .bind(Utc::now())
        .bind(job_id.to_string())
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Advance Started -> Done.
    pub async fn mark_done(&self, job_id: Uuid) -> Result<bool, SyncError> {
        let result = sqlx::query(
            "UPDATE sync_queue SET status = 'done', completed_at = ? \
             WHERE id = ? AND status = 'started'",
        )
        .bind(Utc::now())
        .bind(job_id.to_string())
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop done jobs older than the retention window.
    pub async fn purge_completed(&self, retention: Duration) -> Result<u64, SyncError> {
        let cutoff = Utc::now() - retention;
        let result = sqlx::query(
            "DELETE FROM sync_queue WHERE status = 'done' AND completed_at IS NOT NULL AND completed_at < ?",
        )
        .bind(cutoff)
        .execute(&*self.pool)
        .await?;
        if result.rows_affected() > 0 {
            debug!(purged = result.rows_affected(), "purged completed queue jobs");
        }
        Ok(result.rows_affected())
    }
}

fn map_job(row: SqliteRow) -> Result<QueueJob, SyncError> {
    let id: String = row.get("id");
    let action: String = row.get("action");
    let status: String = row.get("status");
    let product_ids: String = row.get("product_ids");
    Ok(QueueJob {
        id: Uuid::parse_str(&id)
            .map_err(|e| SyncError::Config(format!("malformed queue job id {id}: {e}")))?,
        store_id: row.get("store_id"),
        product_ids: serde_json::from_str(&product_ids)?,
        product_id_count: row.get("product_id_count"),
        action: QueueAction::parse(&action)
            .ok_or_else(|| SyncError::Config(format!("unknown queue action {action}")))?,
        status: QueueStatus::parse(&status)
            .ok_or_else(|| SyncError::Config(format!("unknown queue status {status}")))?,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        started_at: row.get::<Option<DateTime<Utc>>, _>("started_at"),
        completed_at: row.get::<Option<DateTime<Utc>>, _>("completed_at"),
    })
}
