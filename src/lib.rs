// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # twilio-paging
//!
//! Cursor-paginated collection traversal for the Twilio REST API.
//!
//! ## Features
//!
//! - **One paging surface**: every collection offers `page`, `get_page`,
//!   `list`, `each` and `stream` over the same traversal
//! - **Bounded memory**: at most one page is held by `each` and `stream`
//! - **Limits**: the requested page size shrinks as a limit approaches
//! - **Resilient transport**: retries with backoff and a shared rate limiter
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use twilio_paging::{ListQuery, Control, RestClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = RestClient::from_env()?;
//!
//!     // First 25 messages, fetched 10 at a time
//!     let query = ListQuery::new().with_page_size(10).with_limit(25);
//!     let messages = client.messages().list(&query).await?;
//!
//!     // Walk channels until the one we want
//!     let channels = client.chat_services().item("ISxxx")?.channels();
//!     channels
//!         .each(&ListQuery::new(), |channel| {
//!             Control::from(channel.unique_name.as_deref() != Some("support"))
//!         })
//!         .await?
//!         .into_result()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ RestClient → Collection<R> / ItemContext<R>                  │
//! │   create · item(id).fetch/update/remove · nested collections │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴───────────────────────────────┐
//! │ PagedCollectionReader<R>: page · get_page · list · each ·    │
//! │ stream, one sequential Traversal per call                    │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ PageFetcher
//! ┌──────────┬───────────────────┴───────┬──────────────────────┐
//! │   Auth   │   HTTP                    │   Decode             │
//! ├──────────┼───────────────────────────┼──────────────────────┤
//! │ Basic    │ Retry, Backoff            │ meta.next_page_url   │
//! │ Bearer   │ Rate Limit, Form bodies   │ next_page_uri (2010) │
//! └──────────┴───────────────────────────┴──────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Paged collection traversal
pub mod pagination;

/// Page payload decoding
pub mod decode;

/// Collections and item contexts
pub mod resource;

/// Typed resources
pub mod resources;

/// REST client root
pub mod client;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use client::{Domain, RestClient};
pub use config::ClientConfig;
pub use http::HttpTransport;
pub use pagination::{
    Control, EachOutcome, ListQuery, Page, PageFetcher, PagedCollectionReader, TraversalEnd,
};
pub use resource::{Collection, ItemContext, Params, ResourceTransport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
