//! Response decoder module
//!
//! Interprets list payloads returned by the REST API.
//!
//! # Overview
//!
//! Two page layouts are in use:
//!
//! - v1/v2 APIs nest pagination under `meta` and name the record array
//!   in `meta.key`, with an absolute `meta.next_page_url`
//! - the 2010 API keeps pagination fields at the top level and links the
//!   next page with a relative `next_page_uri`
//!
//! Both decode to a [`RawPage`](crate::pagination::RawPage).

mod payload;

pub use payload::{decode_page, decode_page_str, record_key, META_KEYS};
