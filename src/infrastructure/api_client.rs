//! HTTP transport for the external personalization API.
//!
//! One batch per call, bounded by the caller-supplied response timeout.
//! No retry logic lives here: a failed call leaves the affected cache
//! records dirty and the next sync pass resends them.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::SyncError;
use crate::domain::ProductId;
use crate::domain::collaborators::ExportApiClient;
use crate::domain::product::{ExportAccount, ProductRepresentation};

const USER_AGENT: &str = "catalog-sync/0.2";

/// reqwest-backed client for the external batch endpoints.
pub struct HttpExportClient {
    client: Client,
    base_url: Url,
}

impl HttpExportClient {
    pub fn new(base_url: &str) -> Result<Self, SyncError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SyncError::Config(format!("invalid export API base url: {e}")))?;
        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| SyncError::Api {
                message: format!("cannot build HTTP client: {e}"),
            })?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, account: &ExportAccount, path: &str) -> Result<Url, SyncError> {
        self.base_url
            .join(&format!("v1/accounts/{}/{path}", account.account_id))
            .map_err(|e| SyncError::Api {
                message: format!("cannot build endpoint url: {e}"),
            })
    }

    async fn post_batch(
        &self,
        account: &ExportAccount,
        path: &str,
        body: serde_json::Value,
        timeout: Duration,
    ) -> Result<(), SyncError> {
        let url = self.endpoint(account, path)?;
        let mut request = self.client.post(url.clone()).timeout(timeout).json(&body);
        if let Some(token) = &account.api_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| SyncError::Api {
            message: format!("POST {url} failed: {e}"),
        })?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SyncError::Api {
                message: format!("POST {url} returned {status}: {text}"),
            });
        }
        debug!(%url, %status, "batch call accepted");
        Ok(())
    }
}

#[async_trait]
impl ExportApiClient for HttpExportClient {
    async fn upsert_products(
        &self,
        account: &ExportAccount,
        items: &[ProductRepresentation],
        timeout: Duration,
    ) -> Result<(), SyncError> {
        let products: Vec<&serde_json::Value> = items.iter().map(|r| &r.payload).collect();
        self.post_batch(account, "products/upsert", json!({ "products": products }), timeout)
            .await
    }

    async fn delete_products(
        &self,
        account: &ExportAccount,
        product_ids: &[ProductId],
        timeout: Duration,
    ) -> Result<(), SyncError> {
        self.post_batch(
            account,
            "products/discontinue",
            json!({ "product_ids": product_ids }),
            timeout,
        )
        .await
    }

    async fn recrawl_products(
        &self,
        account: &ExportAccount,
        product_ids: &[ProductId],
        timeout: Duration,
    ) -> Result<(), SyncError> {
        self.post_batch(
            account,
            "products/recrawl",
            json!({ "product_ids": product_ids }),
            timeout,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_base_url() {
        assert!(matches!(
            HttpExportClient::new("not a url"),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn builds_account_scoped_endpoints() {
        let client = HttpExportClient::new("https://export.example.com/").unwrap();
        let account = ExportAccount {
            account_id: "acct-7".into(),
            api_token: None,
        };
        let url = client.endpoint(&account, "products/upsert").unwrap();
        assert_eq!(
            url.as_str(),
            "https://export.example.com/v1/accounts/acct-7/products/upsert"
        );
    }
}
