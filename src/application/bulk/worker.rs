//! Background worker: drains the durable queue with bounded concurrency.
//!
//! Work items run concurrently and independently, with no global lock:
//! correctness relies on consumers re-reading cache state and on the cache
//! store's set-based, idempotent updates, so racing workers converge.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::SyncError;
use crate::domain::collaborators::DurableWorkQueue;

use super::consumer::BulkSyncConsumer;

pub struct BulkWorker {
    queue: Arc<dyn DurableWorkQueue>,
    consumer: Arc<BulkSyncConsumer>,
    concurrency: usize,
    poll_interval: Duration,
    cancellation_token: CancellationToken,
}

impl BulkWorker {
    pub fn new(
        queue: Arc<dyn DurableWorkQueue>,
        consumer: Arc<BulkSyncConsumer>,
        concurrency: usize,
    ) -> Self {
        Self {
            queue,
            consumer,
            concurrency: concurrency.max(1),
            poll_interval: Duration::from_millis(250),
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Token that stops `run` after in-flight items finish.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Run until cancelled, polling when the queue is empty.
    pub async fn run(&self) -> Result<(), SyncError> {
        info!(concurrency = self.concurrency, "bulk worker started");
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        loop {
            if self.cancellation_token.is_cancelled() {
                break;
            }
            // Reap whatever finished before taking on more work, otherwise
            // the join set grows for as long as the queue stays non-empty.
            while tasks.try_join_next().is_some() {}
            match self.queue.dequeue().await? {
                Some(item) => {
                    let permit = semaphore
                        .clone()
                        .acquire_owned()
                        .await
                        .map_err(|e| SyncError::Config(format!("worker semaphore closed: {e}")))?;
                    let queue = Arc::clone(&self.queue);
                    let consumer = Arc::clone(&self.consumer);
                    tasks.spawn(async move {
                        let outcome = consumer.process(&item).await;
                        if let Err(e) = queue.complete(item.id, outcome).await {
                            warn!(item_id = %item.id, error = %e, "failed to report work outcome");
                        }
                        drop(permit);
                    });
                }
                None => {
                    tokio::select! {
                        () = self.cancellation_token.cancelled() => break,
                        () = sleep(self.poll_interval) => {}
                    }
                }
            }
        }

        while tasks.join_next().await.is_some() {}
        info!("bulk worker stopped");
        Ok(())
    }

    /// Process everything currently queued, then return. Used by tests and
    /// one-shot maintenance commands.
    pub async fn run_until_drained(&self) -> Result<(), SyncError> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        while let Some(item) = self.queue.dequeue().await? {
            while tasks.try_join_next().is_some() {}
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| SyncError::Config(format!("worker semaphore closed: {e}")))?;
            let queue = Arc::clone(&self.queue);
            let consumer = Arc::clone(&self.consumer);
            tasks.spawn(async move {
                let outcome = consumer.process(&item).await;
                if let Err(e) = queue.complete(item.id, outcome).await {
                    warn!(item_id = %item.id, error = %e, "failed to report work outcome");
                }
                drop(permit);
            });
        }

        while tasks.join_next().await.is_some() {}
        Ok(())
    }
}
