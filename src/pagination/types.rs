//! Pagination types
//!
//! Query, page, cursor and outcome types shared by every access mode.

use super::fetcher::RawPage;
use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::de::DeserializeOwned;

/// Page size used when the query does not set one
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page size the server accepts
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Query parameter carrying the page size
pub const PAGE_SIZE_PARAM: &str = "PageSize";

/// Query parameter carrying the page number
pub const PAGE_PARAM: &str = "Page";

/// Query parameter carrying the page token
pub const PAGE_TOKEN_PARAM: &str = "PageToken";

const RESERVED_PARAMS: [&str; 3] = [PAGE_SIZE_PARAM, PAGE_PARAM, PAGE_TOKEN_PARAM];

// ============================================================================
// ListQuery
// ============================================================================

/// Caller-supplied filters, page size and record limit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    filters: Vec<(String, String)>,
    page_size: Option<u32>,
    limit: Option<u64>,
}

impl ListQuery {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter, replacing any earlier value for the same key
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.filters.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.filters.push((key, value)),
        }
        self
    }

    /// Add a filter when a value is present
    #[must_use]
    pub fn with_filter_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with_filter(key, value),
            None => self,
        }
    }

    /// Add a date filter, rendered as `YYYY-MM-DD`
    #[must_use]
    pub fn with_date_filter(self, key: impl Into<String>, date: NaiveDate) -> Self {
        self.with_filter(key, date.format("%Y-%m-%d").to_string())
    }

    /// Add a timestamp filter, rendered as RFC 3339 UTC
    #[must_use]
    pub fn with_datetime_filter(self, key: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.with_filter(key, at.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    /// Set the page size hint
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the maximum number of records to yield
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Filters in insertion order
    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    /// Page size as set by the caller
    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    /// Page size that will be requested absent a limit
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Record limit, if any
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Check the query before any request is made
    pub fn validate(&self) -> Result<()> {
        if let Some(size) = self.page_size {
            if !(1..=MAX_PAGE_SIZE).contains(&size) {
                return Err(Error::invalid_argument(
                    "page_size",
                    format!("must be between 1 and {MAX_PAGE_SIZE}, got {size}"),
                ));
            }
        }

        for (key, _) in &self.filters {
            if key.is_empty() {
                return Err(Error::invalid_argument("filter", "filter name is empty"));
            }
            if RESERVED_PARAMS.contains(&key.as_str()) {
                return Err(Error::invalid_argument(
                    key.clone(),
                    "reserved for pagination; use with_page_size or with_limit",
                ));
            }
        }

        Ok(())
    }

    /// Page size to request given the remaining record budget
    pub fn requested_page_size(&self, remaining: Option<u64>) -> u32 {
        let size = self.effective_page_size();
        match remaining {
            Some(remaining) if remaining < u64::from(size) => remaining as u32,
            _ => size,
        }
    }

    /// Query parameters for a first-page request
    pub(crate) fn request_params(&self, page_size: u32) -> Vec<(String, String)> {
        let mut params = self.filters.clone();
        params.push((PAGE_SIZE_PARAM.to_string(), page_size.to_string()));
        params
    }
}

// ============================================================================
// Page
// ============================================================================

/// One server response: a batch of records plus pagination links
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    records: Vec<T>,
    next_page_url: Option<String>,
    next_page_token: Option<String>,
    page_number: u32,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(
        records: Vec<T>,
        next_page_url: Option<String>,
        next_page_token: Option<String>,
        page_number: u32,
    ) -> Self {
        Self {
            records,
            next_page_url,
            next_page_token,
            page_number,
        }
    }

    /// Records in server order
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Take ownership of the records
    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    /// Absolute URL of the next page
    pub fn next_page_url(&self) -> Option<&str> {
        self.next_page_url.as_deref()
    }

    /// Token identifying the next page
    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }

    /// Zero-based page number
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the page has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True if the server linked a further page
    pub fn has_next(&self) -> bool {
        self.next_page_url.is_some() || self.next_page_token.is_some()
    }

    /// Drop records past `len`
    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Type the records of a raw page
    pub fn from_raw(raw: RawPage) -> Result<Self> {
        let records = raw
            .records
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                serde_json::from_value(value).map_err(|e| {
                    Error::decode(format!("record {i} of page {}: {e}", raw.page_number))
                })
            })
            .collect::<Result<Vec<T>>>()?;

        Ok(Self::new(
            records,
            raw.next_page_url,
            raw.next_page_token,
            raw.page_number,
        ))
    }
}

// ============================================================================
// Traversal control
// ============================================================================

/// Returned by an `each` callback after every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Control {
    /// Deliver the next record
    #[default]
    Continue,
    /// Stop the traversal; no further page is fetched
    Stop,
}

impl Control {
    /// Check if we should stop
    pub fn is_stop(self) -> bool {
        matches!(self, Self::Stop)
    }
}

impl From<bool> for Control {
    /// `true` means keep going
    fn from(keep_going: bool) -> Self {
        if keep_going {
            Self::Continue
        } else {
            Self::Stop
        }
    }
}

/// Position of a traversal in its life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalState {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A page request is in flight
    Fetching,
    /// A page arrived and more may follow
    HasPage,
    /// The server reported no further page
    Exhausted,
    /// The record limit was reached
    LimitReached,
    /// The caller stopped the traversal
    Cancelled,
    /// A page request failed
    Failed,
}

impl TraversalState {
    /// Terminal states accept no further transition
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Exhausted | Self::LimitReached | Self::Cancelled | Self::Failed
        )
    }

    /// Whether `next` is a legal successor
    pub fn can_transition_to(self, next: Self) -> bool {
        use TraversalState::{Cancelled, Exhausted, Failed, Fetching, HasPage, Idle, LimitReached};
        matches!(
            (self, next),
            (Idle, Fetching | LimitReached)
                | (Fetching, HasPage | Failed)
                | (HasPage, Fetching | Exhausted | LimitReached | Cancelled)
        )
    }
}

// ============================================================================
// Cursor
// ============================================================================

/// Client-side state of a single traversal
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    state: TraversalState,
    yielded: u64,
    pages_fetched: u32,
    page_number: u32,
    next_page_url: Option<String>,
    next_page_token: Option<String>,
}

impl Cursor {
    /// Create an idle cursor
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> TraversalState {
        self.state
    }

    /// Records handed out so far
    pub fn yielded(&self) -> u64 {
        self.yielded
    }

    /// Pages fetched so far
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Page number of the last page seen
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Next page URL of the last page seen
    pub fn next_page_url(&self) -> Option<&str> {
        self.next_page_url.as_deref()
    }

    /// Next page token of the last page seen
    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }

    /// Records still allowed under `limit`
    pub fn remaining(&self, limit: Option<u64>) -> Option<u64> {
        limit.map(|limit| limit.saturating_sub(self.yielded))
    }

    /// Move to `next`
    pub(crate) fn transition(&mut self, next: TraversalState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal traversal transition {:?} -> {next:?}",
            self.state
        );
        self.state = next;
    }

    /// Remember the links of a freshly fetched page
    pub(crate) fn record_page<T>(&mut self, page: &Page<T>) {
        self.pages_fetched += 1;
        self.page_number = page.page_number;
        self.next_page_url = page.next_page_url.clone();
        self.next_page_token = page.next_page_token.clone();
    }

    pub(crate) fn add_yielded(&mut self, count: u64) {
        self.yielded += count;
    }
}

// ============================================================================
// Outcome of `each`
// ============================================================================

/// Why an `each` traversal ended
#[derive(Debug)]
pub enum TraversalEnd {
    /// The server had no further page
    Exhausted,
    /// The record limit was reached
    LimitReached,
    /// The callback returned [`Control::Stop`]
    Cancelled,
    /// A page request failed after `delivered` records
    Failed(Error),
}

/// Summary of an `each` traversal
#[derive(Debug)]
pub struct EachOutcome {
    /// Records passed to the callback
    pub delivered: u64,
    /// Pages that arrived successfully
    pub pages_fetched: u32,
    /// How the traversal ended
    pub end: TraversalEnd,
}

impl EachOutcome {
    /// Ended without failure and without the caller stopping it
    pub fn is_complete(&self) -> bool {
        matches!(
            self.end,
            TraversalEnd::Exhausted | TraversalEnd::LimitReached
        )
    }

    /// Stopped by the callback
    pub fn is_cancelled(&self) -> bool {
        matches!(self.end, TraversalEnd::Cancelled)
    }

    /// The failure, if the traversal failed
    pub fn error(&self) -> Option<&Error> {
        match &self.end {
            TraversalEnd::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Delivered count, or the failure
    pub fn into_result(self) -> Result<u64> {
        match self.end {
            TraversalEnd::Failed(e) => Err(e),
            _ => Ok(self.delivered),
        }
    }
}
