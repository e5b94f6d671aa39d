//! Collections and item contexts

use super::{Params, ResourceTransport};
use crate::error::{Error, Result};
use crate::http::HttpTransport;
use crate::pagination::{Control, EachOutcome, ListQuery, Page, PageFetcher, PagedCollectionReader};
use crate::types::JsonValue;
use futures::Stream;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// A list endpoint of `R` records
///
/// `uri` excludes the format suffix; the 2010 API appends `.json` to both
/// the collection and its items, the v1/v2 APIs append nothing.
pub struct Collection<R, X = HttpTransport> {
    transport: Arc<X>,
    uri: String,
    suffix: String,
    reader: PagedCollectionReader<R>,
}

impl<R, X> Clone for Collection<R, X> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            uri: self.uri.clone(),
            suffix: self.suffix.clone(),
            reader: self.reader.clone(),
        }
    }
}

impl<R, X> fmt::Debug for Collection<R, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("uri", &self.uri)
            .field("suffix", &self.suffix)
            .finish_non_exhaustive()
    }
}

impl<R, X> Collection<R, X>
where
    R: DeserializeOwned + Send + 'static,
    X: ResourceTransport + 'static,
{
    /// Collection at `uri`; `suffix` follows it and every item URI
    pub fn new(transport: Arc<X>, uri: impl Into<String>, suffix: impl Into<String>) -> Self {
        let uri = uri.into().trim_end_matches('/').to_string();
        let suffix = suffix.into();
        let fetcher: Arc<dyn PageFetcher> = transport.clone();
        let reader = PagedCollectionReader::new(fetcher, format!("{uri}{suffix}"));

        Self {
            transport,
            uri,
            suffix,
            reader,
        }
    }

    /// URI of the list endpoint
    pub fn uri(&self) -> &str {
        self.reader.base_uri()
    }

    /// The reader behind the list operations
    pub fn reader(&self) -> &PagedCollectionReader<R> {
        &self.reader
    }

    /// Address one record by id
    pub fn item(&self, id: &str) -> Result<ItemContext<R, X>> {
        validate_id(id)?;
        Ok(ItemContext {
            transport: Arc::clone(&self.transport),
            uri: format!("{}/{id}", self.uri),
            suffix: self.suffix.clone(),
            id: id.to_string(),
            _record: PhantomData,
        })
    }

    /// Create a record
    pub async fn create(&self, params: &Params) -> Result<R> {
        debug!("Creating record in {} ({} params)", self.uri(), params.len());
        let body = self.transport.create(self.uri(), params).await?;
        typed(body, self.uri())
    }

    /// Every record matching `query`
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<R>> {
        self.reader.list(query).await
    }

    /// Deliver records matching `query` one at a time
    pub async fn each<C>(&self, query: &ListQuery, on_record: C) -> Result<EachOutcome>
    where
        C: FnMut(R) -> Control,
    {
        self.reader.each(query, on_record).await
    }

    /// Lazily stream records matching `query`
    pub fn stream(&self, query: ListQuery) -> Result<impl Stream<Item = Result<R>> + Send> {
        self.reader.stream(query)
    }

    /// First page matching `query`
    pub async fn page(&self, query: &ListQuery) -> Result<Page<R>> {
        self.reader.page(query).await
    }

    /// First page with default settings
    pub async fn page_default(&self) -> Result<Page<R>> {
        self.reader.page_default().await
    }

    /// One page by a server-provided URL
    pub async fn get_page(&self, url: &str) -> Result<Page<R>> {
        self.reader.get_page(url).await
    }

    /// The page after `page`, if the server linked one
    pub async fn next_page(&self, page: &Page<R>) -> Result<Option<Page<R>>> {
        match page.next_page_url() {
            Some(url) => self.reader.get_page(url).await.map(Some),
            None => Ok(None),
        }
    }
}

/// One record of a collection, addressed by id
pub struct ItemContext<R, X = HttpTransport> {
    transport: Arc<X>,
    uri: String,
    suffix: String,
    id: String,
    _record: PhantomData<fn() -> R>,
}

impl<R, X> Clone for ItemContext<R, X> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            uri: self.uri.clone(),
            suffix: self.suffix.clone(),
            id: self.id.clone(),
            _record: PhantomData,
        }
    }
}

impl<R, X> fmt::Debug for ItemContext<R, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemContext")
            .field("uri", &self.uri)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<R, X> ItemContext<R, X>
where
    R: DeserializeOwned + Send + 'static,
    X: ResourceTransport + 'static,
{
    /// URI of the record, including the format suffix
    pub fn uri(&self) -> String {
        format!("{}{}", self.uri, self.suffix)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fetch the record
    pub async fn fetch(&self) -> Result<R> {
        let uri = self.uri();
        let body = self.transport.fetch(&uri).await?;
        typed(body, &uri)
    }

    /// Update the record
    pub async fn update(&self, params: &Params) -> Result<R> {
        let uri = self.uri();
        let body = self.transport.update(&uri, params).await?;
        typed(body, &uri)
    }

    /// Delete the record
    pub async fn remove(&self) -> Result<bool> {
        self.transport.remove(&self.uri()).await
    }

    /// A collection nested under this record
    ///
    /// Built fresh on every call.
    pub fn collection<S>(&self, path: &str) -> Collection<S, X>
    where
        S: DeserializeOwned + Send + 'static,
    {
        Collection::new(
            Arc::clone(&self.transport),
            format!("{}/{}", self.uri, path.trim_matches('/')),
            self.suffix.clone(),
        )
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::invalid_argument("id", "record id is empty"));
    }
    if id.contains(['/', '?', '#']) {
        return Err(Error::invalid_argument(
            "id",
            format!("record id '{id}' contains a reserved URI character"),
        ));
    }
    Ok(())
}

fn typed<R: DeserializeOwned>(body: JsonValue, uri: &str) -> Result<R> {
    serde_json::from_value(body)
        .map_err(|e| Error::decode(format!("Unexpected record shape from {uri}: {e}")))
}
