//! HTTP client module
//!
//! Provides HTTP client with retry, rate limiting, and backoff strategies,
//! and the transport that plugs it into the paging and resource layers.
//!
//! # Features
//!
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Authentication**: Integration with auth module

mod client;
mod rate_limit;
mod transport;

pub use client::{
    default_user_agent, HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::HttpTransport;
