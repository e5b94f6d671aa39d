//! Client configuration
//!
//! Loaded from a YAML file or from `TWILIO_*` environment variables.
//!
//! ```yaml
//! account_sid: ACxxxxxxxx
//! auth_token: secret
//! region: au1
//! edge: sydney
//! page_size: 100
//! http:
//!   timeout_seconds: 10
//!   max_retries: 2
//!   rate_limit:
//!     requests_per_second: 5
//! ```

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::{ListQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::types::{BackoffType, OptionStringExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Environment variable names read by [`ClientConfig::from_env`]
pub mod env {
    pub const ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
    pub const AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
    pub const API_KEY: &str = "TWILIO_API_KEY";
    pub const API_SECRET: &str = "TWILIO_API_SECRET";
    pub const BASE_URL: &str = "TWILIO_BASE_URL";
    pub const REGION: &str = "TWILIO_REGION";
    pub const EDGE: &str = "TWILIO_EDGE";
}

// ============================================================================
// Client Config
// ============================================================================

/// Everything needed to build a [`RestClient`](crate::RestClient)
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Account the collections belong to
    #[serde(default)]
    pub account_sid: String,

    /// Auth token, unused when an API key is configured
    #[serde(default)]
    pub auth_token: String,

    /// API key credentials, preferred over the auth token
    #[serde(default)]
    pub api_key: Option<ApiKeyConfig>,

    /// Replaces every domain host, e.g. a mock server
    #[serde(default)]
    pub base_url: Option<String>,

    /// Processing region, e.g. `au1`
    #[serde(default)]
    pub region: Option<String>,

    /// Edge location, e.g. `sydney`
    #[serde(default)]
    pub edge: Option<String>,

    /// Page size of the query returned by `default_query`
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// API key credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    /// Key SID (`SK...`)
    pub sid: String,
    pub secret: String,
}

impl fmt::Debug for ApiKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyConfig")
            .field("sid", &self.sid)
            .field("secret", &"***")
            .finish()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"***")
            .field("api_key", &self.api_key)
            .field("base_url", &self.base_url)
            .field("region", &self.region)
            .field("edge", &self.edge)
            .field("page_size", &self.page_size)
            .field("http", &self.http)
            .finish()
    }
}

impl ClientConfig {
    /// Config with account credentials and defaults elsewhere
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            api_key: None,
            base_url: None,
            region: None,
            edge: None,
            page_size: default_page_size(),
            http: HttpConfig::default(),
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Load from `TWILIO_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).none_if_empty();

        let account_sid = var(env::ACCOUNT_SID).ok_or_else(|| Error::missing_field(env::ACCOUNT_SID))?;
        let api_key = match (var(env::API_KEY), var(env::API_SECRET)) {
            (Some(sid), Some(secret)) => Some(ApiKeyConfig { sid, secret }),
            (Some(_), None) => return Err(Error::missing_field(env::API_SECRET)),
            _ => None,
        };
        let auth_token = var(env::AUTH_TOKEN).unwrap_or_default();

        let config = Self {
            api_key,
            base_url: var(env::BASE_URL),
            region: var(env::REGION),
            edge: var(env::EDGE),
            ..Self::new(account_sid, auth_token)
        };
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and ranges
    pub fn validate(&self) -> Result<()> {
        if self.account_sid.trim().is_empty() {
            return Err(Error::missing_field("account_sid"));
        }
        if self.api_key.is_none() && self.auth_token.is_empty() {
            return Err(Error::missing_field("auth_token"));
        }
        if let Some(ref key) = self.api_key {
            if key.sid.is_empty() || key.secret.is_empty() {
                return Err(Error::missing_field("api_key"));
            }
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(Error::config(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        if let Some(ref base_url) = self.base_url {
            url::Url::parse(base_url)?;
        }
        Ok(())
    }

    /// Credentials applied to every request
    pub fn auth(&self) -> AuthConfig {
        match self.api_key {
            Some(ref key) => AuthConfig::basic(&key.sid, &key.secret),
            None => AuthConfig::basic(&self.account_sid, &self.auth_token),
        }
    }

    /// HTTP client settings
    pub fn http_client_config(&self) -> HttpClientConfig {
        let backoff = &self.http.retry_backoff;
        let builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .max_retries(self.http.max_retries)
            .backoff(
                backoff.backoff_type,
                Duration::from_millis(backoff.initial_ms),
                Duration::from_millis(backoff.max_ms),
            );
        let builder = match self.http.rate_limit {
            Some(rate_limit) => builder.rate_limit(rate_limit),
            None => builder.no_rate_limit(),
        };
        builder.build()
    }

    /// Empty query carrying the configured page size
    pub fn default_query(&self) -> ListQuery {
        ListQuery::new().with_page_size(self.page_size)
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Rate limiting; `null` disables it
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: default_rate_limit(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60000
}
