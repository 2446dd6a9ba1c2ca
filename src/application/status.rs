//! Operational read surface: per-store backlog counts for dashboards.

use serde::Serialize;

use crate::SyncError;
use crate::domain::StoreId;
use crate::infrastructure::cache_store::CacheStore;
use crate::infrastructure::queue_store::QueueStore;

/// Per-store snapshot of the synchronization backlog.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatusReport {
    pub store_id: StoreId,
    /// Records flagged for resend.
    pub total_dirty: i64,
    /// Records whose external copy is not confirmed fresh, synced-then-
    /// staled and never-yet-synced alike.
    pub total_out_of_sync: i64,
    /// Queue jobs not yet done.
    pub queue_backlog: i64,
}

#[derive(Clone)]
pub struct SyncStatusService {
    cache: CacheStore,
    queue: QueueStore,
}

impl SyncStatusService {
    pub fn new(cache: CacheStore, queue: QueueStore) -> Self {
        Self { cache, queue }
    }

    pub async fn report(&self, store_id: StoreId) -> Result<SyncStatusReport, SyncError> {
        Ok(SyncStatusReport {
            store_id,
            total_dirty: self.cache.get_total_dirty(store_id).await?,
            total_out_of_sync: self.cache.get_total_out_of_sync(store_id).await?,
            queue_backlog: self.queue.get_total_count(store_id).await?,
        })
    }
}
