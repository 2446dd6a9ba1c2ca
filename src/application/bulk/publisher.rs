//! Bulk Publisher: fragments a large id set into durable work items.
//!
//! One queue job and one work item per chunk, decoupling "how many items
//! changed" from "how many background executions occur". Per-execution
//! memory and external-API batch size stay bounded no matter how large the
//! triggering mutation was.

use std::sync::Arc;
use tracing::info;

use crate::SyncError;
use crate::application::queue_builder::QueueBuilder;
use crate::domain::collaborators::DurableWorkQueue;
use crate::domain::paging::{chunk_ids, dedup_ids};
use crate::domain::queue::{BulkChunk, QueueAction, WorkItem};
use crate::domain::{ProductId, StoreId};
use crate::infrastructure::config::ConfigProvider;
use crate::infrastructure::queue_store::QueueStore;

pub struct BulkPublisher {
    builder: QueueBuilder,
    durable: Arc<dyn DurableWorkQueue>,
    config: Arc<dyn ConfigProvider>,
}

impl BulkPublisher {
    pub fn new(
        queue_store: QueueStore,
        durable: Arc<dyn DurableWorkQueue>,
        config: Arc<dyn ConfigProvider>,
    ) -> Self {
        Self {
            builder: QueueBuilder::new(queue_store),
            durable,
            config,
        }
    }

    /// Fragment `product_ids` and enqueue one work item per chunk.
    ///
    /// Each chunk is persisted as its own queue job first, so the table
    /// keeps an auditable record even if the broker loses the item.
    /// Returns the number of work items enqueued.
    pub async fn publish(
        &self,
        store_id: StoreId,
        product_ids: &[ProductId],
        action: QueueAction,
    ) -> Result<usize, SyncError> {
        let settings = self.config.settings().await?;
        let ids = dedup_ids(product_ids);
        let chunks = chunk_ids(&ids, settings.bulk_chunk_size)?;
        let chunk_count = chunks.len();

        for chunk in chunks {
            let job = self.builder.enqueue(store_id, chunk, action).await?;

            let payload = BulkChunk {
                job_id: job.id,
                store_id,
                product_ids: job.product_ids.clone(),
                action,
            };
            let item = WorkItem::from_chunk(&payload)?;
            self.durable.enqueue(item).await?;
        }

        info!(
            store_id,
            ids = ids.len(),
            chunks = chunk_count,
            action = action.as_str(),
            "bulk publish finished"
        );
        Ok(chunk_count)
    }
}
