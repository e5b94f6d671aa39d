//! Default transport over [`HttpClient`]
//!
//! Implements the page fetching contract and the resource operations on top
//! of a shared HTTP client.

use super::client::{HttpClient, RequestConfig};
use crate::decode;
use crate::error::Result;
use crate::pagination::{PageFetcher, PageTarget, RawPage};
use crate::resource::{Params, ResourceTransport};
use crate::types::JsonValue;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Transport backed by a shared [`HttpClient`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Arc<HttpClient>,
}

impl HttpTransport {
    /// Wrap a client
    pub fn new(client: HttpClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpTransport {
    async fn fetch_page(&self, target: &PageTarget) -> Result<RawPage> {
        let (url, config) = match target {
            PageTarget::Url(url) => (url.as_str(), RequestConfig::new()),
            PageTarget::Query { base_uri, params } => {
                (base_uri.as_str(), RequestConfig::new().query_pairs(params))
            }
        };

        let body: JsonValue = self.client.get_json_with_config(url, config).await?;
        let page = decode::decode_page(&body, url)?;
        debug!(
            "Decoded page {} from {url}: {} records, next={}",
            page.page_number,
            page.records.len(),
            page.next_page_url.is_some() || page.next_page_token.is_some()
        );
        Ok(page)
    }
}

#[async_trait]
impl ResourceTransport for HttpTransport {
    async fn create(&self, uri: &str, params: &Params) -> Result<JsonValue> {
        self.client.post_form_json(uri, params.as_pairs()).await
    }

    async fn fetch(&self, uri: &str) -> Result<JsonValue> {
        self.client.get_json(uri).await
    }

    async fn update(&self, uri: &str, params: &Params) -> Result<JsonValue> {
        self.client.post_form_json(uri, params.as_pairs()).await
    }

    async fn remove(&self, uri: &str) -> Result<bool> {
        let response = self.client.delete(uri).await?;
        Ok(response.status().is_success())
    }
}
