//! Transport contract for resource operations

use crate::error::Result;
use crate::pagination::PageFetcher;
use crate::types::JsonValue;
use async_trait::async_trait;

use super::Params;

/// Performs the non-paging requests of a collection
///
/// Implementors also fetch pages, so one value serves both the reader and
/// the create/fetch/update/remove operations.
#[async_trait]
pub trait ResourceTransport: PageFetcher {
    /// `POST` a form body to a collection URI
    async fn create(&self, uri: &str, params: &Params) -> Result<JsonValue>;

    /// `GET` a single record
    async fn fetch(&self, uri: &str) -> Result<JsonValue>;

    /// `POST` a form body to an item URI
    async fn update(&self, uri: &str, params: &Params) -> Result<JsonValue>;

    /// `DELETE` an item, returning whether the server accepted it
    async fn remove(&self, uri: &str) -> Result<bool>;
}
