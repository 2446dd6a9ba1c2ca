//! External-facing product types.

use serde::{Deserialize, Serialize};

use super::{ProductId, StoreId};

/// External-API-ready representation of one catalog product.
///
/// The attribute mapping is arbitrary and platform specific, so the payload
/// is carried as an opaque JSON value built by the representation provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRepresentation {
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub payload: serde_json::Value,
}

impl ProductRepresentation {
    pub fn new(product_id: ProductId, store_id: StoreId, payload: serde_json::Value) -> Self {
        Self {
            product_id,
            store_id,
            payload,
        }
    }
}

/// Account on the external personalization service that a store exports to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportAccount {
    /// Account identifier on the external service.
    pub account_id: String,
    /// API token used by the transport client.
    #[serde(default)]
    pub api_token: Option<String>,
}

impl ExportAccount {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            api_token: None,
        }
    }
}
