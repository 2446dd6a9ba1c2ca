//! Upsert Sync Service: pushes product representations in pages.
//!
//! Per store the state machine is {updates disabled -> skip, enabled ->
//! process}. Each page is all-or-nothing: one failed representation build
//! keeps the whole page from being sent (a partial batch at the external
//! API is worse than none), while a failed batch call is logged and the
//! remaining pages still run. Failed pages leave their records dirty; the
//! next scheduled pass picks them up, there is no in-run retry.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::SyncError;
use crate::application::benchmark::SyncBenchmark;
use crate::application::cache_service::CacheService;
use crate::domain::collaborators::{ExportApiClient, RepresentationProvider};
use crate::domain::paging::{PageIter, dedup_ids};
use crate::domain::product::ProductRepresentation;
use crate::domain::{ProductId, StoreId};
use crate::infrastructure::cache_store::CacheStore;
use crate::infrastructure::config::ConfigProvider;

use super::{SkipReason, SyncOutcome, SyncReport};

pub struct UpsertSyncService {
    cache: CacheStore,
    cache_service: CacheService,
    provider: Arc<dyn RepresentationProvider>,
    api: Arc<dyn ExportApiClient>,
    config: Arc<dyn ConfigProvider>,
}

impl UpsertSyncService {
    pub fn new(
        cache: CacheStore,
        cache_service: CacheService,
        provider: Arc<dyn RepresentationProvider>,
        api: Arc<dyn ExportApiClient>,
        config: Arc<dyn ConfigProvider>,
    ) -> Self {
        Self {
            cache,
            cache_service,
            provider,
            api,
            config,
        }
    }

    /// Sync the given working set for one store.
    ///
    /// An empty working set is a legitimate terminal state; a store without
    /// an export account is a configuration error surfaced to the caller.
    pub async fn sync(
        &self,
        store_id: StoreId,
        product_ids: &[ProductId],
    ) -> Result<SyncOutcome, SyncError> {
        let store_config = self.config.store_config(store_id).await?;
        if !store_config.product_sync_enabled {
            info!(store_id, "product updates disabled, skipping upsert sync");
            return Ok(SyncOutcome::Skipped(SkipReason::SyncDisabled));
        }
        let account = store_config
            .account
            .ok_or(SyncError::MissingAccount { store_id })?;

        let settings = self.config.settings().await?;
        let timeout = settings.response_timeout();
        let ids = dedup_ids(product_ids);

        let mut benchmark = SyncBenchmark::start("upsert");
        let mut report = SyncReport::default();

        for page in PageIter::new(&ids, settings.upsert_batch_size)? {
            report.pages_total += 1;

            let representations = match self.build_page(page, store_id).await {
                Ok(representations) => representations,
                Err(e) => {
                    // Fail fast for this page only; its records stay dirty.
                    error!(store_id, error = %e, "page build failed, page not sent");
                    report.pages_failed += 1;
                    benchmark.record_page(0);
                    continue;
                }
            };

            match self
                .api
                .upsert_products(&account, &representations, timeout)
                .await
            {
                Ok(()) => {
                    for representation in &representations {
                        self.cache_service.upsert(representation, store_id).await?;
                    }
                    report.items_synced += representations.len() as u64;
                }
                Err(e) => {
                    warn!(
                        store_id,
                        page_size = page.len(),
                        error = %e,
                        "upsert batch call failed, records stay dirty for the next pass"
                    );
                    self.cache.mark_dirty(page, store_id).await?;
                    report.pages_failed += 1;
                }
            }
            benchmark.record_page(page.len());
        }

        report.elapsed = benchmark.finish();
        Ok(SyncOutcome::Completed(report))
    }

    async fn build_page(
        &self,
        page: &[ProductId],
        store_id: StoreId,
    ) -> Result<Vec<ProductRepresentation>, SyncError> {
        let mut representations = Vec::with_capacity(page.len());
        for &product_id in page {
            let representation = self.provider.build(product_id, store_id).await?;
            representations.push(representation);
        }
        Ok(representations)
    }
}
