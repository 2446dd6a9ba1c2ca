//! Recrawl Sync Service: asks the external service to re-fetch products.
//!
//! Used when a full re-derivation is cheaper done remotely than serializing
//! locally. Pages like upsert, but throttled with an inter-batch delay so
//! the external crawler endpoint is not overwhelmed, and guarded by a
//! resident-memory ceiling: crossing it aborts the whole run.

use std::sync::Arc;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::SyncError;
use crate::application::benchmark::SyncBenchmark;
use crate::domain::collaborators::ExportApiClient;
use crate::domain::paging::{PageIter, dedup_ids};
use crate::domain::{ProductId, StoreId};
use crate::infrastructure::cache_store::CacheStore;
use crate::infrastructure::config::ConfigProvider;
use crate::infrastructure::memory::MemoryProbe;

use super::{SkipReason, SyncOutcome, SyncReport};

pub struct RecrawlSyncService {
    cache: CacheStore,
    api: Arc<dyn ExportApiClient>,
    config: Arc<dyn ConfigProvider>,
    memory: Arc<dyn MemoryProbe>,
}

impl RecrawlSyncService {
    pub fn new(
        cache: CacheStore,
        api: Arc<dyn ExportApiClient>,
        config: Arc<dyn ConfigProvider>,
        memory: Arc<dyn MemoryProbe>,
    ) -> Self {
        Self {
            cache,
            api,
            config,
            memory,
        }
    }

    pub async fn recrawl(
        &self,
        store_id: StoreId,
        product_ids: &[ProductId],
    ) -> Result<SyncOutcome, SyncError> {
        let store_config = self.config.store_config(store_id).await?;
        if !store_config.product_sync_enabled {
            info!(store_id, "product updates disabled, skipping recrawl");
            return Ok(SyncOutcome::Skipped(SkipReason::SyncDisabled));
        }
        let account = store_config
            .account
            .ok_or(SyncError::MissingAccount { store_id })?;

        let settings = self.config.settings().await?;
        let timeout = settings.response_timeout();
        let delay = settings.recrawl_delay();
        let ceiling = settings.memory_ceiling_bytes;
        let ids = dedup_ids(product_ids);

        let mut benchmark = SyncBenchmark::start("recrawl");
        let mut report = SyncReport::default();

        let mut pages = PageIter::new(&ids, settings.upsert_batch_size)?.peekable();
        while let Some(page) = pages.next() {
            // Abort outright rather than degrade the host process.
            let resident = self.memory.resident_bytes();
            if ceiling > 0 && resident > ceiling {
                benchmark.finish();
                return Err(SyncError::MemoryOutOfBounds {
                    used: resident,
                    ceiling,
                });
            }

            report.pages_total += 1;
            match self.api.recrawl_products(&account, page, timeout).await {
                Ok(()) => {
                    self.cache.mark_in_sync(page, store_id).await?;
                    report.items_synced += page.len() as u64;
                }
                Err(e) => {
                    warn!(
                        store_id,
                        page_size = page.len(),
                        error = %e,
                        "recrawl batch call failed, records stay dirty"
                    );
                    report.pages_failed += 1;
                }
            }
            benchmark.record_page(page.len());

            if pages.peek().is_some() && !delay.is_zero() {
                sleep(delay).await;
            }
        }

        report.elapsed = benchmark.finish();
        Ok(SyncOutcome::Completed(report))
    }
}
