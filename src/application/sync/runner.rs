//! Full-pass entry points, the scheduled-cron surface of the engine.
//!
//! These walk the whole store's backlog in bounded id fetches. They are
//! also what gives failed bulk chunks their eventual retry: anything still
//! dirty or pending deletion is picked up here on the next pass.

use std::sync::Arc;
use tracing::info;

use crate::SyncError;
use crate::domain::StoreId;
use crate::infrastructure::cache_store::CacheStore;
use crate::infrastructure::config::ConfigProvider;

use super::delete::DeleteSyncService;
use super::upsert::UpsertSyncService;
use super::{SyncOutcome, SyncReport};

pub struct SyncRunner {
    cache: CacheStore,
    upsert: Arc<UpsertSyncService>,
    delete: Arc<DeleteSyncService>,
    config: Arc<dyn ConfigProvider>,
}

impl SyncRunner {
    pub fn new(
        cache: CacheStore,
        upsert: Arc<UpsertSyncService>,
        delete: Arc<DeleteSyncService>,
        config: Arc<dyn ConfigProvider>,
    ) -> Self {
        Self {
            cache,
            upsert,
            delete,
            config,
        }
    }

    /// Resync every dirty, non-deleted product of a store.
    pub async fn sync_indexed_products(&self, store_id: StoreId) -> Result<SyncOutcome, SyncError> {
        let settings = self.config.settings().await?;
        let fetch_size = settings.id_fetch_batch_size as i64;

        let mut combined = SyncReport::default();
        let mut after_id = 0;
        loop {
            let ids = self
                .cache
                .get_dirty_product_ids(store_id, after_id, fetch_size)
                .await?;
            if ids.is_empty() {
                break;
            }
            if let Some(&last) = ids.last() {
                after_id = last;
            }

            match self.upsert.sync(store_id, &ids).await? {
                SyncOutcome::Completed(report) => combined.merge(&report),
                // Config changed under us; stop the pass.
                SyncOutcome::Skipped(reason) => return Ok(SyncOutcome::Skipped(reason)),
            }
            if (ids.len() as i64) < fetch_size {
                break;
            }
        }

        info!(
            store_id,
            items = combined.items_synced,
            failed_pages = combined.pages_failed,
            "indexed-product pass finished"
        );
        Ok(SyncOutcome::Completed(combined))
    }

    /// Push every still-pending product removal of a store.
    pub async fn sync_deleted_products(&self, store_id: StoreId) -> Result<SyncReport, SyncError> {
        let settings = self.config.settings().await?;
        let fetch_size = settings.id_fetch_batch_size as i64;

        let mut combined = SyncReport::default();
        let mut after_id = 0;
        loop {
            let ids = self
                .cache
                .get_pending_deletion_ids(store_id, after_id, fetch_size)
                .await?;
            if ids.is_empty() {
                break;
            }
            if let Some(&last) = ids.last() {
                after_id = last;
            }

            let report = self.delete.delete(&ids, store_id).await?;
            combined.merge(&report);
            if (ids.len() as i64) < fetch_size {
                break;
            }
        }

        info!(
            store_id,
            items = combined.items_synced,
            failed_chunks = combined.pages_failed,
            "deleted-product pass finished"
        );
        Ok(combined)
    }
}
