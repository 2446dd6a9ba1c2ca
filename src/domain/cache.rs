//! Cache record entity: one row per (product, store) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ProductId, StoreId};

/// Last-known state of a product's externally-held copy for one store.
///
/// Invariants enforced by the stores and services that mutate this:
/// - exactly one non-deleted record exists per (product_id, store_id)
/// - `in_sync` and `is_dirty` are never both true after a completed pass
/// - `is_deleted` stays set until a new upsert for the key supersedes it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Surrogate key; `None` until first persisted.
    pub id: Option<i64>,
    pub product_id: ProductId,
    pub store_id: StoreId,
    /// Opaque blob of the last representation pushed to the external API.
    pub serialized_data: Option<String>,
    /// Last-pushed representation matches what the external service holds.
    pub in_sync: bool,
    /// External copy is known or suspected stale and needs a resend.
    pub is_dirty: bool,
    /// Product was removed from this store's catalog.
    pub is_deleted: bool,
    pub updated_at: DateTime<Utc>,
}

impl CacheRecord {
    /// Fresh record for a key that has never been synced.
    pub fn new(product_id: ProductId, store_id: StoreId) -> Self {
        Self {
            id: None,
            product_id,
            store_id,
            serialized_data: None,
            in_sync: false,
            is_dirty: true,
            is_deleted: false,
            updated_at: Utc::now(),
        }
    }

    /// Apply a freshly pushed representation: the external copy is current.
    pub fn apply_synced(&mut self, serialized: String, now: DateTime<Utc>) {
        self.serialized_data = Some(serialized);
        self.in_sync = true;
        self.is_dirty = false;
        self.is_deleted = false;
        self.updated_at = now;
    }
}
