//! Collaborator seams the engine depends on.
//!
//! These are the boundaries to the host platform and the external service:
//! narrow traits injected through constructors, no ambient state. The
//! infrastructure module ships one implementation of each where the crate
//! can sensibly provide one.

use std::time::Duration;

use async_trait::async_trait;

use crate::SyncError;

use super::product::{ExportAccount, ProductRepresentation};
use super::queue::{WorkItem, WorkOutcome};
use super::{ProductId, StoreId};

/// Builds the external-API-ready representation of one catalog product.
///
/// A failure here means the product cannot be exported; the sync services
/// treat it as fatal for the containing page.
#[async_trait]
pub trait RepresentationProvider: Send + Sync {
    async fn build(
        &self,
        product_id: ProductId,
        store_id: StoreId,
    ) -> Result<ProductRepresentation, SyncError>;
}

/// Transport client for the external personalization API.
///
/// Accepts one batch per call, bounded by `timeout`. No retry logic lives
/// here; retries happen through the cache's dirty-flag mechanism.
#[async_trait]
pub trait ExportApiClient: Send + Sync {
    async fn upsert_products(
        &self,
        account: &ExportAccount,
        items: &[ProductRepresentation],
        timeout: Duration,
    ) -> Result<(), SyncError>;

    async fn delete_products(
        &self,
        account: &ExportAccount,
        product_ids: &[ProductId],
        timeout: Duration,
    ) -> Result<(), SyncError>;

    /// Ask the external service to re-fetch the products itself.
    async fn recrawl_products(
        &self,
        account: &ExportAccount,
        product_ids: &[ProductId],
        timeout: Duration,
    ) -> Result<(), SyncError>;
}

/// Durable work queue with at-least-once delivery.
///
/// Consumers must stay safe to re-invoke with the same payload; they treat
/// it as a hint and re-resolve current cache state before acting.
#[async_trait]
pub trait DurableWorkQueue: Send + Sync {
    async fn enqueue(&self, item: WorkItem) -> Result<(), SyncError>;

    /// Next pending item, or `None` when the queue is currently empty.
    async fn dequeue(&self) -> Result<Option<WorkItem>, SyncError>;

    /// Report the terminal status of a dequeued item.
    async fn complete(&self, item_id: uuid::Uuid, outcome: WorkOutcome) -> Result<(), SyncError>;
}
