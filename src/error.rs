//! Engine-wide error taxonomy.
//!
//! Expected skips (sync disabled for a store) are not errors; they are
//! reported through `application::sync::SyncOutcome::Skipped` so callers
//! never have to inspect error variants to tell a skip from a failure.

use thiserror::Error;

use crate::domain::{ProductId, StoreId};

/// Errors produced by the cache and synchronization engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No export account is configured for the store. Fatal for any
    /// operation that talks to the external API.
    #[error("no export account configured for store {store_id}")]
    MissingAccount { store_id: StoreId },

    /// A product could not be turned into an external representation.
    /// Aborts the containing page, never the whole collection.
    #[error("failed to build representation for product {product_id}: {reason}")]
    RepresentationBuild {
        product_id: ProductId,
        reason: String,
    },

    /// The external API rejected a batch call or the transport failed.
    #[error("export API call failed: {message}")]
    Api { message: String },

    /// Resident memory crossed the configured ceiling during a recrawl run.
    #[error("memory out of bounds: {used} bytes resident, ceiling {ceiling}")]
    MemoryOutOfBounds { used: u64, ceiling: u64 },

    /// A page or chunk size of zero was supplied.
    #[error("invalid batch size: {0}")]
    InvalidBatchSize(usize),

    /// Configuration could not be loaded or is missing the store.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("payload encoding error: {0}")]
    Payload(#[from] serde_json::Error),
}

impl SyncError {
    /// Stable code reported to the bulk-operation framework when a consumer
    /// fails a work item.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAccount { .. } => "missing_account",
            Self::RepresentationBuild { .. } => "representation_build",
            Self::Api { .. } => "api",
            Self::MemoryOutOfBounds { .. } => "memory_out_of_bounds",
            Self::InvalidBatchSize(_) => "invalid_batch_size",
            Self::Config(_) => "config",
            Self::Database(_) => "database",
            Self::Payload(_) => "payload",
        }
    }
}
