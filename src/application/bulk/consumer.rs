//! Bulk Consumer: executes one durable work item.
//!
//! The payload is a hint of work, not a trusted snapshot: before acting the
//! consumer resolves the ids back to current cache rows and only syncs what
//! still needs it. That re-read is what makes at-least-once delivery and
//! stuck-job replays safe.

use std::sync::Arc;
use tracing::{error, info};

use crate::SyncError;
use crate::application::sync::{DeleteSyncService, UpsertSyncService};
use crate::domain::ProductId;
use crate::domain::queue::{BulkChunk, QueueAction, WorkItem, WorkOutcome};
use crate::infrastructure::cache_store::CacheStore;
use crate::infrastructure::queue_store::QueueStore;

pub struct BulkSyncConsumer {
    cache: CacheStore,
    queue_store: QueueStore,
    upsert: Arc<UpsertSyncService>,
    delete: Arc<DeleteSyncService>,
}

impl BulkSyncConsumer {
    pub fn new(
        cache: CacheStore,
        queue_store: QueueStore,
        upsert: Arc<UpsertSyncService>,
        delete: Arc<DeleteSyncService>,
    ) -> Self {
        Self {
            cache,
            queue_store,
            upsert,
            delete,
        }
    }

    /// Process one work item and report its terminal status.
    ///
    /// Errors never escape: a failure becomes `WorkOutcome::Failed` with a
    /// code and message for the operator, the worker stays alive, and the
    /// affected records stay dirty for the next full pass.
    pub async fn process(&self, item: &WorkItem) -> WorkOutcome {
        match self.do_operation(item).await {
            Ok(()) => WorkOutcome::Complete,
            Err(e) => {
                error!(item_id = %item.id, error = %e, "bulk operation failed");
                WorkOutcome::Failed {
                    code: e.code().to_string(),
                    message: e.to_string(),
                }
            }
        }
    }

    async fn do_operation(&self, item: &WorkItem) -> Result<(), SyncError> {
        let chunk: BulkChunk = item.decode()?;
        self.queue_store.mark_started(chunk.job_id).await?;

        let ids = self.resolve_current_ids(&chunk).await?;
        info!(
            job_id = %chunk.job_id,
            store_id = chunk.store_id,
            hinted = chunk.product_ids.len(),
            resolved = ids.len(),
            action = chunk.action.as_str(),
            "processing bulk chunk"
        );

        match chunk.action {
            QueueAction::Upsert => {
                self.upsert.sync(chunk.store_id, &ids).await?;
            }
            QueueAction::Delete => {
                self.delete.delete(&ids, chunk.store_id).await?;
            }
        }

        self.queue_store.mark_done(chunk.job_id).await?;
        Ok(())
    }

    /// Re-resolve the hinted ids against current cache state: keep only the
    /// ones that still need this chunk's action. Ids with no cache row yet
    /// are kept for upserts (first sync creates the row) and for deletes
    /// (explicit action, nothing recorded to contradict it); rows already
    /// in the target state are dropped.
    async fn resolve_current_ids(&self, chunk: &BulkChunk) -> Result<Vec<ProductId>, SyncError> {
        let records = self
            .cache
            .get_by_product_ids_and_store_id(&chunk.product_ids, chunk.store_id)
            .await?;
        let by_id: std::collections::HashMap<ProductId, _> = records
            .into_iter()
            .map(|record| (record.product_id, record))
            .collect();

        let ids = chunk
            .product_ids
            .iter()
            .copied()
            .filter(|id| match by_id.get(id) {
                None => true,
                Some(record) => match chunk.action {
                    QueueAction::Upsert => record.is_dirty && !record.is_deleted,
                    QueueAction::Delete => !(record.is_deleted && !record.is_dirty),
                },
            })
            .collect();
        Ok(ids)
    }
}
