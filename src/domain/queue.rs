//! Update-queue jobs and durable work items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ProductId, StoreId};

/// What a batch job asks the engine to do with its product ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueAction {
    Upsert,
    Delete,
}

impl QueueAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upsert => "upsert",
            Self::Delete => "delete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "upsert" => Some(Self::Upsert),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Job lifecycle. Transitions are monotonic: New -> Started -> Done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    New,
    Started,
    Done,
}

impl QueueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Started => "started",
            Self::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Self::New),
            "started" => Some(Self::Started),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Whether advancing to `next` respects the monotonic lifecycle.
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Started) | (Self::Started, Self::Done)
        )
    }
}

/// One enqueued batch of product identifiers for a store.
///
/// The embedded id list is a hint of work, not a trusted snapshot: consumers
/// re-resolve current cache state before acting, which is what makes a job
/// safe to replay if it is left in `Started` past a timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueJob {
    pub id: Uuid,
    pub store_id: StoreId,
    pub product_ids: Vec<ProductId>,
    pub product_id_count: i64,
    pub action: QueueAction,
    pub status: QueueStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl QueueJob {
    pub fn new(store_id: StoreId, product_ids: Vec<ProductId>, action: QueueAction) -> Self {
        let product_id_count = product_ids.len() as i64;
        Self {
            id: Uuid::new_v4(),
            store_id,
            product_ids,
            product_id_count,
            action,
            status: QueueStatus::New,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn for_upsert(store_id: StoreId, product_ids: Vec<ProductId>) -> Self {
        Self::new(store_id, product_ids, QueueAction::Upsert)
    }

    pub fn for_deletion(store_id: StoreId, product_ids: Vec<ProductId>) -> Self {
        Self::new(store_id, product_ids, QueueAction::Delete)
    }
}

/// Payload of one durable work item: a bounded fragment of a queue job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkChunk {
    pub job_id: Uuid,
    pub store_id: StoreId,
    pub product_ids: Vec<ProductId>,
    pub action: QueueAction,
}

/// One durable work item handed to the background worker.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub id: Uuid,
    /// JSON-encoded `BulkChunk`.
    pub payload: String,
    pub enqueued_at: DateTime<Utc>,
}

impl WorkItem {
    pub fn from_chunk(chunk: &BulkChunk) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Uuid::new_v4(),
            payload: serde_json::to_string(chunk)?,
            enqueued_at: Utc::now(),
        })
    }

    pub fn decode(&self) -> Result<BulkChunk, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }
}

/// Terminal status the worker reports back to the durable queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkOutcome {
    Complete,
    Failed { code: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_count_matches_id_list() {
        let job = QueueJob::for_upsert(1, vec![10, 20, 30]);
        assert_eq!(job.product_id_count, 3);
        assert_eq!(job.status, QueueStatus::New);
        assert_eq!(job.action, QueueAction::Upsert);
        assert!(job.started_at.is_none());

        let job = QueueJob::for_deletion(2, vec![5]);
        assert_eq!(job.action, QueueAction::Delete);
        assert_eq!(job.product_id_count, 1);
    }

    #[test]
    fn status_transitions_are_monotonic() {
        assert!(QueueStatus::New.can_advance_to(QueueStatus::Started));
        assert!(QueueStatus::Started.can_advance_to(QueueStatus::Done));
        assert!(!QueueStatus::Done.can_advance_to(QueueStatus::Started));
        assert!(!QueueStatus::Started.can_advance_to(QueueStatus::New));
        assert!(!QueueStatus::New.can_advance_to(QueueStatus::Done));
    }

    #[test]
    fn work_item_round_trips_chunk_payload() {
        let chunk = BulkChunk {
            job_id: Uuid::new_v4(),
            store_id: 2,
            product_ids: vec![1, 2, 3],
            action: QueueAction::Delete,
        };
        let item = WorkItem::from_chunk(&chunk).unwrap();
        let decoded = item.decode().unwrap();
        assert_eq!(decoded.job_id, chunk.job_id);
        assert_eq!(decoded.product_ids, chunk.product_ids);
        assert_eq!(decoded.action, QueueAction::Delete);
    }
}
