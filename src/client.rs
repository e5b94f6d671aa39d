//! REST client root
//!
//! Owns one shared transport and hands out collections rooted at the right
//! domain host. Collections are cheap; they are built on every call.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{HttpClient, HttpTransport};
use crate::pagination::ListQuery;
use crate::resource::Collection;
use crate::resources::{ChatService, Message};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Region implied when only an edge is configured
const DEFAULT_REGION: &str = "us1";

/// API host family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// `api.twilio.com`, the 2010 API
    Api,
    /// `chat.twilio.com`
    Chat,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Chat => "chat",
        }
    }
}

/// Entry point to the REST collections
#[derive(Debug, Clone)]
pub struct RestClient {
    transport: Arc<HttpTransport>,
    account_sid: String,
    base_url: Option<String>,
    region: Option<String>,
    edge: Option<String>,
    page_size: u32,
}

impl RestClient {
    /// Build a client from validated configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::with_auth(config.http_client_config(), config.auth())?;
        Ok(Self::with_transport(&config, Arc::new(HttpTransport::new(http))))
    }

    /// Build a client from `TWILIO_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Build a client over an existing transport
    pub fn with_transport(config: &ClientConfig, transport: Arc<HttpTransport>) -> Self {
        let client = Self {
            transport,
            account_sid: config.account_sid.clone(),
            base_url: config
                .base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            region: config.region.clone(),
            edge: config.edge.clone(),
            page_size: config.page_size,
        };
        debug!(
            "RestClient for {} (api host {})",
            client.account_sid,
            client.domain_url(Domain::Api)
        );
        client
    }

    pub fn account_sid(&self) -> &str {
        &self.account_sid
    }

    pub fn transport(&self) -> &Arc<HttpTransport> {
        &self.transport
    }

    /// Empty query carrying the configured page size
    pub fn default_query(&self) -> ListQuery {
        ListQuery::new().with_page_size(self.page_size)
    }

    /// Base URL of a domain
    ///
    /// `https://{domain}[.{edge}].{region}.twilio.com`, or the configured
    /// base URL for every domain.
    pub fn domain_url(&self, domain: Domain) -> String {
        if let Some(ref base_url) = self.base_url {
            return base_url.clone();
        }

        let region = match (&self.region, &self.edge) {
            (Some(region), _) => Some(region.as_str()),
            (None, Some(_)) => Some(DEFAULT_REGION),
            (None, None) => None,
        };

        let mut host = domain.as_str().to_string();
        if let Some(ref edge) = self.edge {
            host.push('.');
            host.push_str(edge);
        }
        if let Some(region) = region {
            host.push('.');
            host.push_str(region);
        }
        format!("https://{host}.twilio.com")
    }

    /// Any collection under a domain
    ///
    /// Records can be typed or read as [`JsonObject`](crate::types::JsonObject).
    pub fn collection<R>(&self, domain: Domain, path: &str, suffix: &str) -> Collection<R>
    where
        R: DeserializeOwned + Send + 'static,
    {
        Collection::new(
            Arc::clone(&self.transport),
            format!("{}/{}", self.domain_url(domain), path.trim_start_matches('/')),
            suffix,
        )
    }

    /// `/2010-04-01/Accounts/{sid}/Messages.json`
    pub fn messages(&self) -> Collection<Message> {
        self.collection(
            Domain::Api,
            &format!("2010-04-01/Accounts/{}/Messages", self.account_sid),
            ".json",
        )
    }

    /// `/v2/Services` on the Chat domain
    pub fn chat_services(&self) -> Collection<ChatService> {
        self.collection(Domain::Chat, "v2/Services", "")
    }
}
