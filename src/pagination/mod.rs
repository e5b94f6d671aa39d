//! Pagination module
//!
//! Traverses cursor-paginated REST collections.
//!
//! # Overview
//!
//! A [`PagedCollectionReader`] walks a collection by following the next-page
//! links the server hands back, one page at a time. It offers four access
//! modes over the same traversal:
//!
//! - [`page`](PagedCollectionReader::page) / [`get_page`](PagedCollectionReader::get_page):
//!   exactly one page, page boundaries visible
//! - [`list`](PagedCollectionReader::list): every record, materialized, all-or-nothing
//! - [`each`](PagedCollectionReader::each): push-style callback with early stop
//! - [`stream`](PagedCollectionReader::stream): pull-style `Stream`
//!
//! Network I/O is delegated to an injected [`PageFetcher`].

mod fetcher;
mod reader;
mod types;

pub use fetcher::{PageFetcher, PageTarget, RawPage};
pub use reader::PagedCollectionReader;
pub use types::{
    Control, Cursor, EachOutcome, ListQuery, Page, TraversalEnd, TraversalState,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PAGE_PARAM, PAGE_SIZE_PARAM, PAGE_TOKEN_PARAM,
};

#[cfg(test)]
mod tests;
