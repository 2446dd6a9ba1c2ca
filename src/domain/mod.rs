//! Domain model: cache records, queue jobs, paging, collaborator seams.

pub mod cache;
pub mod collaborators;
pub mod paging;
pub mod product;
pub mod queue;

/// Catalog product identifier, as the host platform assigns them.
pub type ProductId = i64;

/// Store (sales channel) identifier.
pub type StoreId = i64;
