//! The page fetching contract
//!
//! The reader never talks to the network itself. It builds a [`PageTarget`]
//! and hands it to a [`PageFetcher`], which returns a decoded [`RawPage`].

use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;
use std::fmt;

/// Where the next page lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTarget {
    /// A server-provided URL, used verbatim
    Url(String),
    /// A collection URI plus query parameters built by the reader
    Query {
        /// Collection URI
        base_uri: String,
        /// Query parameters, in request order
        params: Vec<(String, String)>,
    },
}

impl PageTarget {
    /// Target a server-provided URL
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// Target a collection URI with query parameters
    pub fn query(base_uri: impl Into<String>, params: Vec<(String, String)>) -> Self {
        Self::Query {
            base_uri: base_uri.into(),
            params,
        }
    }

    /// Look up a query parameter
    ///
    /// For URL targets the URL's own query string is searched.
    pub fn param(&self, key: &str) -> Option<String> {
        match self {
            Self::Url(url) => url::Url::parse(url).ok().and_then(|u| {
                u.query_pairs()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.into_owned())
            }),
            Self::Query { params, .. } => params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone()),
        }
    }
}

impl fmt::Display for PageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Query { base_uri, params } => {
                match url::Url::parse_with_params(base_uri, params) {
                    Ok(url) => write!(f, "{url}"),
                    Err(_) => f.write_str(base_uri),
                }
            }
        }
    }
}

/// A page as returned by the fetcher, before records are typed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPage {
    /// Records in server order
    pub records: Vec<JsonValue>,
    /// Absolute URL of the next page
    pub next_page_url: Option<String>,
    /// Opaque token identifying the next page
    pub next_page_token: Option<String>,
    /// Zero-based page number reported by the server
    pub page_number: u32,
}

impl RawPage {
    /// Create a page with no successor
    pub fn last(records: Vec<JsonValue>, page_number: u32) -> Self {
        Self {
            records,
            page_number,
            ..Default::default()
        }
    }

    /// Set the next page URL
    #[must_use]
    pub fn with_next_url(mut self, url: impl Into<String>) -> Self {
        self.next_page_url = Some(url.into());
        self
    }

    /// Set the next page token
    #[must_use]
    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_page_token = Some(token.into());
        self
    }
}

/// Performs one page request
///
/// Implementations must be safe to share between concurrent traversals.
/// Retries, timeouts and rate limiting belong here, not in the reader.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch and decode a single page
    async fn fetch_page(&self, target: &PageTarget) -> Result<RawPage>;
}
