//! Delete Sync Service: pushes product removals in chunks.
//!
//! Deletion is an explicit, intentional action: a missing export account is
//! a hard error here, never a silent skip. Chunks are independent, one bad
//! chunk must not block the rest.

use std::sync::Arc;
use tracing::{info, warn};

use crate::SyncError;
use crate::application::benchmark::SyncBenchmark;
use crate::domain::collaborators::ExportApiClient;
use crate::domain::paging::{PageIter, dedup_ids};
use crate::domain::{ProductId, StoreId};
use crate::infrastructure::cache_store::CacheStore;
use crate::infrastructure::config::ConfigProvider;

use super::SyncReport;

pub struct DeleteSyncService {
    cache: CacheStore,
    api: Arc<dyn ExportApiClient>,
    config: Arc<dyn ConfigProvider>,
}

impl DeleteSyncService {
    pub fn new(
        cache: CacheStore,
        api: Arc<dyn ExportApiClient>,
        config: Arc<dyn ConfigProvider>,
    ) -> Self {
        Self { cache, api, config }
    }

    /// Push the removal of the given products to the external service.
    ///
    /// Empty input is a no-op: zero external calls, zero cache writes.
    pub async fn delete(
        &self,
        product_ids: &[ProductId],
        store_id: StoreId,
    ) -> Result<SyncReport, SyncError> {
        if product_ids.is_empty() {
            return Ok(SyncReport::default());
        }

        let store_config = self.config.store_config(store_id).await?;
        let account = store_config
            .account
            .ok_or(SyncError::MissingAccount { store_id })?;

        let settings = self.config.settings().await?;
        let timeout = settings.delete_timeout();
        let ids = dedup_ids(product_ids);

        let mut benchmark = SyncBenchmark::start("delete");
        let mut report = SyncReport::default();

        for chunk in PageIter::new(&ids, settings.delete_batch_size)? {
            report.pages_total += 1;
            match self.api.delete_products(&account, chunk, timeout).await {
                Ok(()) => {
                    self.cache.mark_deleted(chunk, store_id).await?;
                    report.items_synced += chunk.len() as u64;
                }
                Err(e) => {
                    warn!(
                        store_id,
                        chunk_size = chunk.len(),
                        error = %e,
                        "delete batch call failed, continuing with next chunk"
                    );
                    report.pages_failed += 1;
                }
            }
            benchmark.record_page(chunk.len());
        }

        report.elapsed = benchmark.finish();
        info!(
            store_id,
            deleted = report.items_synced,
            failed_chunks = report.pages_failed,
            "delete sync finished"
        );
        Ok(report)
    }
}
