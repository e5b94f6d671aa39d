//! Authentication module
//!
//! Supports: Basic (account SID + auth token), Bearer, none.
//!
//! Credentials are resolved once from configuration and applied to every
//! outgoing request by the HTTP client.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AuthConfig;
