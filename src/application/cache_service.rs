//! Cache Service: read-modify-write façade over the Cache Store.
//!
//! The only write path for representation data. Callers must not bypass it;
//! the lookup-then-write sequence is what keeps at most one record per
//! (product, store) key, the unique index is just a backstop.

use chrono::Utc;
use tracing::{debug, warn};

use crate::SyncError;
use crate::domain::StoreId;
use crate::domain::cache::CacheRecord;
use crate::domain::product::ProductRepresentation;
use crate::infrastructure::cache_store::CacheStore;

#[derive(Clone)]
pub struct CacheService {
    store: CacheStore,
}

impl CacheService {
    pub fn new(store: CacheStore) -> Self {
        Self { store }
    }

    /// Persist a freshly pushed representation for its (product, store) key.
    ///
    /// Builds a new record when absent, otherwise overwrites the existing
    /// one; a second call with the same key simply overwrites again, no
    /// duplicate rows. A serialization failure is logged and the write
    /// skipped, leaving any pre-existing record stale and dirty for retry.
    pub async fn upsert(
        &self,
        representation: &ProductRepresentation,
        store_id: StoreId,
    ) -> Result<(), SyncError> {
        let serialized = match serde_json::to_string(&representation.payload) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!(
                    product_id = representation.product_id,
                    store_id, error = %e,
                    "representation serialization failed, cache write skipped"
                );
                return Ok(());
            }
        };

        let now = Utc::now();
        match self.store.get(representation.product_id, store_id).await? {
            Some(mut record) => {
                record.apply_synced(serialized, now);
                self.store.update(&record).await?;
                debug!(
                    product_id = representation.product_id,
                    store_id, "cache record updated"
                );
            }
            None => {
                let mut record = CacheRecord::new(representation.product_id, store_id);
                record.apply_synced(serialized, now);
                self.store.insert(&record).await?;
                debug!(
                    product_id = representation.product_id,
                    store_id, "cache record created"
                );
            }
        }
        Ok(())
    }
}
