//! Engine configuration.
//!
//! Two tiers, both re-read per invocation so a config change takes effect on
//! the next sync call without a restart:
//! 1. Engine-wide tuning knobs (`SyncSettings`)
//! 2. Per-store flags and the export account (`StoreSyncConfig`)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::SyncError;
use crate::domain::StoreId;
use crate::domain::product::ExportAccount;

/// Engine-wide tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Products per external upsert call.
    #[serde(default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,

    /// Product ids per working-set fetch from the cache store.
    #[serde(default = "default_id_fetch_batch_size")]
    pub id_fetch_batch_size: usize,

    /// Product ids per external delete call.
    #[serde(default = "default_delete_batch_size")]
    pub delete_batch_size: usize,

    /// Product ids per durable work item.
    #[serde(default = "default_bulk_chunk_size")]
    pub bulk_chunk_size: usize,

    /// Response timeout for upsert and recrawl calls, in seconds.
    #[serde(default = "default_response_timeout_secs")]
    pub response_timeout_secs: u64,

    /// Response timeout for delete calls, in seconds.
    #[serde(default = "default_delete_timeout_secs")]
    pub delete_timeout_secs: u64,

    /// Pause between recrawl pages, in milliseconds.
    #[serde(default = "default_recrawl_delay_ms")]
    pub recrawl_delay_ms: u64,

    /// Resident-memory ceiling for a recrawl run, in bytes. Zero disables
    /// the check.
    #[serde(default = "default_memory_ceiling_bytes")]
    pub memory_ceiling_bytes: u64,

    /// Hours a done queue job is retained for troubleshooting.
    #[serde(default = "default_queue_retention_hours")]
    pub queue_retention_hours: i64,

    /// Concurrent work items per background worker.
    #[serde(default = "default_worker_concurrency")]
    pub worker_concurrency: usize,
}

fn default_upsert_batch_size() -> usize {
    50
}
fn default_id_fetch_batch_size() -> usize {
    500
}
fn default_delete_batch_size() -> usize {
    100
}
fn default_bulk_chunk_size() -> usize {
    100
}
fn default_response_timeout_secs() -> u64 {
    60
}
fn default_delete_timeout_secs() -> u64 {
    30
}
fn default_recrawl_delay_ms() -> u64 {
    500
}
fn default_memory_ceiling_bytes() -> u64 {
    768 * 1024 * 1024
}
fn default_queue_retention_hours() -> i64 {
    24
}
fn default_worker_concurrency() -> usize {
    4
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            upsert_batch_size: default_upsert_batch_size(),
            id_fetch_batch_size: default_id_fetch_batch_size(),
            delete_batch_size: default_delete_batch_size(),
            bulk_chunk_size: default_bulk_chunk_size(),
            response_timeout_secs: default_response_timeout_secs(),
            delete_timeout_secs: default_delete_timeout_secs(),
            recrawl_delay_ms: default_recrawl_delay_ms(),
            memory_ceiling_bytes: default_memory_ceiling_bytes(),
            queue_retention_hours: default_queue_retention_hours(),
            worker_concurrency: default_worker_concurrency(),
        }
    }
}

impl SyncSettings {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }

    pub fn delete_timeout(&self) -> Duration {
        Duration::from_secs(self.delete_timeout_secs)
    }

    pub fn recrawl_delay(&self) -> Duration {
        Duration::from_millis(self.recrawl_delay_ms)
    }
}

/// Per-store flags and account, as supplied by the host platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSyncConfig {
    pub store_id: StoreId,
    /// Product update syncing for the store. Off means the upsert and
    /// recrawl services skip the store silently.
    #[serde(default)]
    pub product_sync_enabled: bool,
    /// Inventory-level tagging in built representations.
    #[serde(default)]
    pub inventory_tagging_enabled: bool,
    /// Account on the external service; absent means the store cannot sync.
    #[serde(default)]
    pub account: Option<ExportAccount>,
}

impl StoreSyncConfig {
    pub fn disabled(store_id: StoreId) -> Self {
        Self {
            store_id,
            product_sync_enabled: false,
            inventory_tagging_enabled: false,
            account: None,
        }
    }
}

/// Configuration source, re-read on every call.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn settings(&self) -> Result<SyncSettings, SyncError>;
    async fn store_config(&self, store_id: StoreId) -> Result<StoreSyncConfig, SyncError>;
}

/// On-disk JSON configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncConfigFile {
    #[serde(default)]
    pub settings: SyncSettings,
    #[serde(default)]
    pub stores: Vec<StoreSyncConfig>,
}

/// Reads the JSON config file on every call, so edits apply to the next
/// sync invocation.
pub struct JsonFileConfigProvider {
    path: PathBuf,
}

impl JsonFileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<SyncConfigFile, SyncError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SyncError::Config(format!("cannot read {}: {e}", self.path.display()))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| SyncError::Config(format!("cannot parse {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl ConfigProvider for JsonFileConfigProvider {
    async fn settings(&self) -> Result<SyncSettings, SyncError> {
        Ok(self.load().await?.settings)
    }

    async fn store_config(&self, store_id: StoreId) -> Result<StoreSyncConfig, SyncError> {
        let file = self.load().await?;
        file.stores
            .into_iter()
            .find(|s| s.store_id == store_id)
            .ok_or_else(|| SyncError::Config(format!("store {store_id} not configured")))
    }
}

/// Fixed in-memory configuration, for tests and embedded setups.
#[derive(Default)]
pub struct StaticConfigProvider {
    settings: SyncSettings,
    stores: HashMap<StoreId, StoreSyncConfig>,
}

impl StaticConfigProvider {
    pub fn new(settings: SyncSettings) -> Self {
        Self {
            settings,
            stores: HashMap::new(),
        }
    }

    pub fn with_store(mut self, store: StoreSyncConfig) -> Self {
        self.stores.insert(store.store_id, store);
        self
    }
}

#[async_trait]
impl ConfigProvider for StaticConfigProvider {
    async fn settings(&self) -> Result<SyncSettings, SyncError> {
        Ok(self.settings.clone())
    }

    async fn store_config(&self, store_id: StoreId) -> Result<StoreSyncConfig, SyncError> {
        self.stores
            .get(&store_id)
            .cloned()
            .ok_or_else(|| SyncError::Config(format!("store {store_id} not configured")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults_match_documented_values() {
        let settings = SyncSettings::default();
        assert_eq!(settings.upsert_batch_size, 50);
        assert_eq!(settings.id_fetch_batch_size, 500);
        assert_eq!(settings.delete_batch_size, 100);
        assert_eq!(settings.bulk_chunk_size, 100);
        assert_eq!(settings.response_timeout_secs, 60);
        assert_eq!(settings.delete_timeout_secs, 30);
    }

    #[tokio::test]
    async fn json_file_provider_rereads_on_every_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.json");

        let mut file = SyncConfigFile::default();
        file.stores.push(StoreSyncConfig::disabled(7));
        tokio::fs::write(&path, serde_json::to_string(&file).unwrap())
            .await
            .unwrap();

        let provider = JsonFileConfigProvider::new(&path);
        assert!(!provider.store_config(7).await.unwrap().product_sync_enabled);

        // Edit the file; the very next call sees the change.
        file.stores[0].product_sync_enabled = true;
        tokio::fs::write(&path, serde_json::to_string(&file).unwrap())
            .await
            .unwrap();
        assert!(provider.store_config(7).await.unwrap().product_sync_enabled);
    }

    #[tokio::test]
    async fn unknown_store_is_a_config_error() {
        let provider = StaticConfigProvider::new(SyncSettings::default());
        assert!(matches!(
            provider.store_config(99).await,
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn partial_config_file_fills_defaults() {
        let file: SyncConfigFile =
            serde_json::from_str(r#"{ "settings": { "upsert_batch_size": 10 } }"#).unwrap();
        assert_eq!(file.settings.upsert_batch_size, 10);
        assert_eq!(file.settings.delete_batch_size, 100);
        assert!(file.stores.is_empty());
    }
}
