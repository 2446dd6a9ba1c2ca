//! Shared fixtures: in-memory database setup and mock collaborators.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use catalog_sync::SyncError;
use catalog_sync::application::bulk::{BulkPublisher, BulkSyncConsumer, BulkWorker};
use catalog_sync::application::cache_service::CacheService;
use catalog_sync::application::sync::{DeleteSyncService, RecrawlSyncService, UpsertSyncService};
use catalog_sync::domain::collaborators::{DurableWorkQueue, ExportApiClient, RepresentationProvider};
use catalog_sync::domain::product::{ExportAccount, ProductRepresentation};
use catalog_sync::domain::{ProductId, StoreId};
use catalog_sync::infrastructure::cache_store::CacheStore;
use catalog_sync::infrastructure::config::{
    ConfigProvider, StaticConfigProvider, StoreSyncConfig, SyncSettings,
};
use catalog_sync::infrastructure::database_connection::DatabaseConnection;
use catalog_sync::infrastructure::memory::MemoryProbe;
use catalog_sync::infrastructure::queue_store::QueueStore;
use catalog_sync::infrastructure::work_queue::InMemoryWorkQueue;

pub async fn setup_stores() -> (CacheStore, QueueStore) {
    let db = DatabaseConnection::in_memory()
        .await
        .expect("in-memory database");
    db.migrate().await.expect("migrations");
    let pool = db.pool().clone();
    (CacheStore::new(pool.clone()), QueueStore::new(pool))
}

/// Representation provider that renders a trivial payload and can be told
/// to fail for specific product ids.
#[derive(Default)]
pub struct MockProvider {
    pub fail_ids: HashSet<ProductId>,
}

impl MockProvider {
    pub fn failing_for(ids: impl IntoIterator<Item = ProductId>) -> Self {
        Self {
            fail_ids: ids.into_iter().collect(),
        }
    }
}

#[async_trait]
impl RepresentationProvider for MockProvider {
    async fn build(
        &self,
        product_id: ProductId,
        store_id: StoreId,
    ) -> Result<ProductRepresentation, SyncError> {
        if self.fail_ids.contains(&product_id) {
            return Err(SyncError::RepresentationBuild {
                product_id,
                reason: "not buildable".to_string(),
            });
        }
        Ok(ProductRepresentation::new(
            product_id,
            store_id,
            json!({ "id": product_id, "store": store_id }),
        ))
    }
}

/// API client that records every batch call and can be told to fail any
/// call containing specific product ids.
#[derive(Default)]
pub struct RecordingApiClient {
    pub upsert_calls: Mutex<Vec<Vec<ProductId>>>,
    pub delete_calls: Mutex<Vec<Vec<ProductId>>>,
    pub recrawl_calls: Mutex<Vec<Vec<ProductId>>>,
    pub fail_ids: Mutex<HashSet<ProductId>>,
}

impl RecordingApiClient {
    pub fn fail_calls_containing(&self, ids: impl IntoIterator<Item = ProductId>) {
        self.fail_ids.lock().unwrap().extend(ids);
    }

    fn check(&self, ids: &[ProductId]) -> Result<(), SyncError> {
        let fail_ids = self.fail_ids.lock().unwrap();
        if ids.iter().any(|id| fail_ids.contains(id)) {
            return Err(SyncError::Api {
                message: "simulated transport failure".to_string(),
            });
        }
        Ok(())
    }

    pub fn upsert_call_sizes(&self) -> Vec<usize> {
        self.upsert_calls.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn delete_call_sizes(&self) -> Vec<usize> {
        self.delete_calls.lock().unwrap().iter().map(Vec::len).collect()
    }
}

#[async_trait]
impl ExportApiClient for RecordingApiClient {
    async fn upsert_products(
        &self,
        _account: &ExportAccount,
        items: &[ProductRepresentation],
        _timeout: Duration,
    ) -> Result<(), SyncError> {
        let ids: Vec<ProductId> = items.iter().map(|r| r.product_id).collect();
        self.upsert_calls.lock().unwrap().push(ids.clone());
        self.check(&ids)
    }

    async fn delete_products(
        &self,
        _account: &ExportAccount,
        product_ids: &[ProductId],
        _timeout: Duration,
    ) -> Result<(), SyncError> {
        self.delete_calls.lock().unwrap().push(product_ids.to_vec());
        self.check(product_ids)
    }

    async fn recrawl_products(
        &self,
        _account: &ExportAccount,
        product_ids: &[ProductId],
        _timeout: Duration,
    ) -> Result<(), SyncError> {
        self.recrawl_calls.lock().unwrap().push(product_ids.to_vec());
        self.check(product_ids)
    }
}

/// Memory probe reporting a fixed value.
pub struct FixedMemoryProbe(pub u64);

impl MemoryProbe for FixedMemoryProbe {
    fn resident_bytes(&self) -> u64 {
        self.0
    }
}

pub fn enabled_store(store_id: StoreId) -> StoreSyncConfig {
    StoreSyncConfig {
        store_id,
        product_sync_enabled: true,
        inventory_tagging_enabled: true,
        account: Some(ExportAccount::new("acct-test")),
    }
}

pub fn disabled_store(store_id: StoreId) -> StoreSyncConfig {
    StoreSyncConfig {
        store_id,
        product_sync_enabled: false,
        inventory_tagging_enabled: false,
        account: Some(ExportAccount::new("acct-test")),
    }
}

pub fn store_without_account(store_id: StoreId) -> StoreSyncConfig {
    StoreSyncConfig {
        store_id,
        product_sync_enabled: true,
        inventory_tagging_enabled: false,
        account: None,
    }
}

pub fn fast_settings() -> SyncSettings {
    SyncSettings {
        recrawl_delay_ms: 0,
        ..SyncSettings::default()
    }
}

/// Fully wired engine over in-memory storage and mock collaborators.
pub struct TestEngine {
    pub cache_store: CacheStore,
    pub queue_store: QueueStore,
    pub cache_service: CacheService,
    pub api: Arc<RecordingApiClient>,
    pub upsert: Arc<UpsertSyncService>,
    pub delete: Arc<DeleteSyncService>,
    pub recrawl: Arc<RecrawlSyncService>,
    pub publisher: BulkPublisher,
    pub consumer: Arc<BulkSyncConsumer>,
    pub work_queue: Arc<InMemoryWorkQueue>,
    pub config: Arc<dyn ConfigProvider>,
}

impl TestEngine {
    pub async fn build(settings: SyncSettings, stores: Vec<StoreSyncConfig>) -> Self {
        Self::build_with_provider(settings, stores, MockProvider::default()).await
    }

    pub async fn build_with_provider(
        settings: SyncSettings,
        stores: Vec<StoreSyncConfig>,
        provider: MockProvider,
    ) -> Self {
        let (cache_store, queue_store) = setup_stores().await;
        let mut config = StaticConfigProvider::new(settings);
        for store in stores {
            config = config.with_store(store);
        }
        let config: Arc<dyn ConfigProvider> = Arc::new(config);
        let api = Arc::new(RecordingApiClient::default());
        let provider: Arc<dyn RepresentationProvider> = Arc::new(provider);
        let cache_service = CacheService::new(cache_store.clone());

        let upsert = Arc::new(UpsertSyncService::new(
            cache_store.clone(),
            cache_service.clone(),
            Arc::clone(&provider),
            api.clone(),
            Arc::clone(&config),
        ));
        let delete = Arc::new(DeleteSyncService::new(
            cache_store.clone(),
            api.clone(),
            Arc::clone(&config),
        ));
        let recrawl = Arc::new(RecrawlSyncService::new(
            cache_store.clone(),
            api.clone(),
            Arc::clone(&config),
            Arc::new(FixedMemoryProbe(0)),
        ));

        let work_queue = Arc::new(InMemoryWorkQueue::new());
        let durable: Arc<dyn DurableWorkQueue> = work_queue.clone();
        let publisher = BulkPublisher::new(queue_store.clone(), durable, Arc::clone(&config));
        let consumer = Arc::new(BulkSyncConsumer::new(
            cache_store.clone(),
            queue_store.clone(),
            upsert.clone(),
            delete.clone(),
        ));

        Self {
            cache_store,
            queue_store,
            cache_service,
            api,
            upsert,
            delete,
            recrawl,
            publisher,
            consumer,
            work_queue,
            config,
        }
    }

    pub fn worker(&self, concurrency: usize) -> BulkWorker {
        let durable: Arc<dyn DurableWorkQueue> = self.work_queue.clone();
        BulkWorker::new(durable, self.consumer.clone(), concurrency)
    }
}
