//! In-process durable work queue.
//!
//! Single-process stand-in for a broker-backed queue: pending items in a
//! FIFO, terminal outcomes kept for inspection. The consumer contract is the
//! same either way, so swapping in a real broker only replaces this type.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::SyncError;
use crate::domain::collaborators::DurableWorkQueue;
use crate::domain::queue::{WorkItem, WorkOutcome};

#[derive(Default)]
struct QueueState {
    pending: VecDeque<WorkItem>,
    outcomes: Vec<(Uuid, WorkOutcome)>,
}

/// FIFO queue with an outcome log.
#[derive(Clone, Default)]
pub struct InMemoryWorkQueue {
    state: Arc<Mutex<QueueState>>,
}

impl InMemoryWorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn pending_count(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    /// Snapshot of reported outcomes, oldest first.
    pub async fn outcomes(&self) -> Vec<(Uuid, WorkOutcome)> {
        self.state.lock().await.outcomes.clone()
    }

    /// Snapshot of pending items without consuming them.
    pub async fn pending_items(&self) -> Vec<WorkItem> {
        self.state.lock().await.pending.iter().cloned().collect()
    }
}

#[async_trait]
impl DurableWorkQueue for InMemoryWorkQueue {
    async fn enqueue(&self, item: WorkItem) -> Result<(), SyncError> {
        let mut state = self.state.lock().await;
        state.pending.push_back(item);
        debug!(pending = state.pending.len(), "work item enqueued");
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<WorkItem>, SyncError> {
        Ok(self.state.lock().await.pending.pop_front())
    }

    async fn complete(&self, item_id: Uuid, outcome: WorkOutcome) -> Result<(), SyncError> {
        self.state.lock().await.outcomes.push((item_id, outcome));
        Ok(())
    }
}
