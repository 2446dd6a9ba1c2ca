//! Catalog Sync - Product Cache & Synchronization Engine
//!
//! Exports a merchant catalog to an external personalization service and
//! keeps the external copy consistent with local changes: a per-(product,
//! store) cache with sync-state tracking, a batch update queue, and the
//! asynchronous bulk pipeline that pushes batches off the request path.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

mod error;

pub use domain::{ProductId, StoreId};
pub use error::SyncError;
