//! Paged collection reader
//!
//! Every access mode runs the same [`Traversal`]: a strictly sequential walk
//! that requests page N+1 only after page N has come back.

use super::fetcher::{PageFetcher, PageTarget};
use super::types::{
    Control, Cursor, EachOutcome, ListQuery, Page, TraversalEnd, TraversalState, PAGE_PARAM,
    PAGE_SIZE_PARAM, PAGE_TOKEN_PARAM,
};
use crate::error::{Error, Result};
use futures::stream::{self, Stream};
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Reads a cursor-paginated collection of `T` records
pub struct PagedCollectionReader<T> {
    fetcher: Arc<dyn PageFetcher>,
    base_uri: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for PagedCollectionReader<T> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            base_uri: self.base_uri.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for PagedCollectionReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedCollectionReader")
            .field("base_uri", &self.base_uri)
            .finish_non_exhaustive()
    }
}

impl<T> PagedCollectionReader<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Create a reader over the collection at `base_uri`
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_uri: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_uri: base_uri.into(),
            _record: PhantomData,
        }
    }

    /// Collection URI
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Fetch the first page matching `query` without following links
    pub async fn page(&self, query: &ListQuery) -> Result<Page<T>> {
        query.validate()?;
        if query.limit() == Some(0) {
            return Ok(Page::new(Vec::new(), None, None, 0));
        }
        let size = query.requested_page_size(query.limit());
        let target = PageTarget::query(&self.base_uri, query.request_params(size));

        let mut page = fetch_typed::<T>(self.fetcher.as_ref(), &target).await?;
        if let Some(limit) = query.limit() {
            page.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(page)
    }

    /// Fetch the first page with default settings
    pub async fn page_default(&self) -> Result<Page<T>> {
        self.page(&ListQuery::default()).await
    }

    /// Fetch one page by a server-provided URL
    pub async fn get_page(&self, url: &str) -> Result<Page<T>> {
        if url.trim().is_empty() {
            return Err(Error::invalid_argument("url", "page URL is empty"));
        }
        fetch_typed::<T>(self.fetcher.as_ref(), &PageTarget::url(url)).await
    }

    /// Collect every record matching `query`
    ///
    /// Memory grows with the result set; use [`each`](Self::each) or
    /// [`stream`](Self::stream) for large collections. Any page failure fails
    /// the whole call and discards what was collected.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<T>> {
        let mut traversal = self.traversal(query)?;
        let mut records = Vec::new();
        while let Some(batch) = traversal.next_batch().await? {
            records.extend(batch);
        }
        Ok(records)
    }

    /// Deliver records one at a time to `on_record`
    ///
    /// Only argument errors are returned as `Err`. Transport failures end the
    /// traversal and are reported in [`EachOutcome::end`], after every record
    /// fetched before the failure has been delivered.
    pub async fn each<C>(&self, query: &ListQuery, mut on_record: C) -> Result<EachOutcome>
    where
        C: FnMut(T) -> Control,
    {
        let mut traversal = self.traversal(query)?;
        let mut delivered = 0u64;

        let end = loop {
            let batch = match traversal.next_batch().await {
                Ok(Some(batch)) => batch,
                Ok(None) => break traversal.end(),
                Err(e) => break TraversalEnd::Failed(e),
            };

            let mut stopped = false;
            for record in batch {
                delivered += 1;
                if on_record(record).is_stop() {
                    stopped = true;
                    break;
                }
            }

            if stopped {
                traversal.cancel();
                break TraversalEnd::Cancelled;
            }
        };

        Ok(EachOutcome {
            delivered,
            pages_fetched: traversal.cursor.pages_fetched(),
            end,
        })
    }

    /// Lazily stream records matching `query`
    ///
    /// At most one page is buffered. Dropping the stream cancels the
    /// traversal. The stream ends after yielding an error.
    pub fn stream(&self, query: ListQuery) -> Result<impl Stream<Item = Result<T>> + Send> {
        let traversal = self.traversal(&query)?;

        Ok(stream::try_unfold(
            (traversal, VecDeque::new()),
            |(mut traversal, mut buffer)| async move {
                loop {
                    if let Some(record) = buffer.pop_front() {
                        return Ok::<_, Error>(Some((record, (traversal, buffer))));
                    }
                    match traversal.next_batch().await? {
                        Some(batch) => buffer.extend(batch),
                        None => return Ok(None),
                    }
                }
            },
        ))
    }

    fn traversal(&self, query: &ListQuery) -> Result<Traversal<T>> {
        query.validate()?;
        Ok(Traversal {
            fetcher: Arc::clone(&self.fetcher),
            base_uri: self.base_uri.clone(),
            query: query.clone(),
            cursor: Cursor::new(),
            _record: PhantomData,
        })
    }
}

async fn fetch_typed<T: DeserializeOwned>(
    fetcher: &dyn PageFetcher,
    target: &PageTarget,
) -> Result<Page<T>> {
    let raw = fetcher.fetch_page(target).await?;
    Page::from_raw(raw)
}

// ============================================================================
// Traversal
// ============================================================================

/// A single sequential walk over a collection
struct Traversal<T> {
    fetcher: Arc<dyn PageFetcher>,
    base_uri: String,
    query: ListQuery,
    cursor: Cursor,
    _record: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Traversal<T> {
    /// Fetch the next page and return its records, truncated to the budget
    ///
    /// Returns `None` once the traversal has ended.
    async fn next_batch(&mut self) -> Result<Option<Vec<T>>> {
        if self.cursor.state().is_terminal() {
            return Ok(None);
        }

        let remaining = self.cursor.remaining(self.query.limit());
        if remaining == Some(0) {
            self.cursor.transition(TraversalState::LimitReached);
            return Ok(None);
        }

        let target = match self.next_target(remaining) {
            Ok(Some(target)) => target,
            Ok(None) => {
                self.cursor.transition(TraversalState::Exhausted);
                return Ok(None);
            }
            Err(e) => {
                self.cursor.transition(TraversalState::Fetching);
                self.cursor.transition(TraversalState::Failed);
                return Err(e);
            }
        };

        self.cursor.transition(TraversalState::Fetching);
        debug!("Fetching page {}: {target}", self.cursor.pages_fetched() + 1);

        let mut page = match fetch_typed::<T>(self.fetcher.as_ref(), &target).await {
            Ok(page) => page,
            Err(e) => {
                self.cursor.transition(TraversalState::Failed);
                debug!(
                    "Page {} failed after {} records: {e}",
                    self.cursor.pages_fetched() + 1,
                    self.cursor.yielded()
                );
                return Err(e);
            }
        };

        self.cursor.transition(TraversalState::HasPage);
        self.cursor.record_page(&page);

        if let Some(remaining) = remaining {
            page.truncate(usize::try_from(remaining).unwrap_or(usize::MAX));
        }
        let fetched_empty = page.is_empty();
        let records = page.into_records();
        self.cursor.add_yielded(records.len() as u64);

        debug!(
            "Page {}: {} records ({} total)",
            self.cursor.pages_fetched(),
            records.len(),
            self.cursor.yielded()
        );

        if self.cursor.remaining(self.query.limit()) == Some(0) {
            self.cursor.transition(TraversalState::LimitReached);
        } else if fetched_empty || !self.has_successor() {
            self.cursor.transition(TraversalState::Exhausted);
        }

        Ok(Some(records))
    }

    fn has_successor(&self) -> bool {
        self.cursor.next_page_url().is_some() || self.cursor.next_page_token().is_some()
    }

    /// Where the next request goes, if anywhere
    fn next_target(&self, remaining: Option<u64>) -> Result<Option<PageTarget>> {
        let size = self.query.requested_page_size(remaining);

        if self.cursor.pages_fetched() == 0 {
            return Ok(Some(PageTarget::query(
                &self.base_uri,
                self.query.request_params(size),
            )));
        }

        if let Some(url) = self.cursor.next_page_url() {
            let url = if size < self.query.effective_page_size() {
                with_page_size(url, size)?
            } else {
                url.to_string()
            };
            return Ok(Some(PageTarget::Url(url)));
        }

        if let Some(token) = self.cursor.next_page_token() {
            let mut params = self.query.request_params(size);
            params.push((PAGE_PARAM.to_string(), (self.cursor.page_number() + 1).to_string()));
            params.push((PAGE_TOKEN_PARAM.to_string(), token.to_string()));
            return Ok(Some(PageTarget::query(&self.base_uri, params)));
        }

        Ok(None)
    }

    /// Stop before the next fetch
    fn cancel(&mut self) {
        if !self.cursor.state().is_terminal() {
            self.cursor.transition(TraversalState::Cancelled);
        }
    }

    /// Terminal reason once `next_batch` has returned `None`
    fn end(&self) -> TraversalEnd {
        match self.cursor.state() {
            TraversalState::LimitReached => TraversalEnd::LimitReached,
            TraversalState::Cancelled => TraversalEnd::Cancelled,
            _ => TraversalEnd::Exhausted,
        }
    }
}

/// Rewrite the `PageSize` parameter of a server URL
fn with_page_size(url: &str, size: u32) -> Result<String> {
    let mut parsed = url::Url::parse(url)?;
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| k != PAGE_SIZE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    parsed
        .query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair(PAGE_SIZE_PARAM, &size.to_string());

    Ok(parsed.to_string())
}
