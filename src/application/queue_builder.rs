//! Queue Builder: constructs and persists batch jobs from changed ids.
//!
//! Jobs are never merged; callers are responsible for not enqueueing
//! overlapping work, and overlap stays harmless because consumers re-read
//! current cache state before acting.

use tracing::info;

use crate::SyncError;
use crate::domain::queue::{QueueAction, QueueJob};
use crate::domain::{ProductId, StoreId};
use crate::infrastructure::queue_store::QueueStore;

#[derive(Clone)]
pub struct QueueBuilder {
    queue: QueueStore,
}

impl QueueBuilder {
    pub fn new(queue: QueueStore) -> Self {
        Self { queue }
    }

    /// Build and persist in one step.
    pub async fn enqueue(
        &self,
        store_id: StoreId,
        product_ids: Vec<ProductId>,
        action: QueueAction,
    ) -> Result<QueueJob, SyncError> {
        let job = QueueJob::new(store_id, product_ids, action);
        self.queue.save(&job).await?;
        info!(
            job_id = %job.id,
            store_id,
            count = job.product_id_count,
            action = action.as_str(),
            "queue job created"
        );
        Ok(job)
    }
}
