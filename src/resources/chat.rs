//! Chat services, channels and members (v2 Chat API)
//!
//! `Services/{sid}/Channels/{sid}/Members/{sid}`

use crate::resource::{Collection, ItemContext, Params, ResourceTransport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A Chat service instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatService {
    pub sid: String,
    pub account_sid: String,
    pub friendly_name: String,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub default_service_role_sid: Option<String>,
    #[serde(default)]
    pub default_channel_role_sid: Option<String>,
    #[serde(default)]
    pub default_channel_creator_role_sid: Option<String>,
    #[serde(default)]
    pub reachability_enabled: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub links: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    #[default]
    Public,
    Private,
    #[serde(other)]
    Unknown,
}

/// A channel within a Chat service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub sid: String,
    pub account_sid: String,
    pub service_sid: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub unique_name: Option<String>,
    /// JSON-encoded string
    #[serde(default)]
    pub attributes: Option<String>,
    #[serde(rename = "type", default)]
    pub channel_type: ChannelType,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub members_count: u64,
    #[serde(default)]
    pub messages_count: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub links: HashMap<String, String>,
}

/// A member of a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub sid: String,
    pub account_sid: String,
    pub channel_sid: String,
    pub service_sid: String,
    pub identity: String,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub role_sid: Option<String>,
    #[serde(default)]
    pub last_consumed_message_index: Option<u64>,
    #[serde(default)]
    pub last_consumption_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attributes: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of a create-channel request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewChannel {
    pub friendly_name: Option<String>,
    pub unique_name: Option<String>,
    pub attributes: Option<String>,
    pub channel_type: Option<ChannelType>,
}

impl NewChannel {
    pub fn params(&self) -> Params {
        let channel_type = self.channel_type.map(|t| match t {
            ChannelType::Private => "private",
            _ => "public",
        });
        Params::new()
            .set_opt("FriendlyName", self.friendly_name.clone())
            .set_opt("UniqueName", self.unique_name.clone())
            .set_opt("Attributes", self.attributes.clone())
            .set_opt("Type", channel_type)
    }
}

impl<X: ResourceTransport + 'static> ItemContext<ChatService, X> {
    /// Channels of this service
    pub fn channels(&self) -> Collection<Channel, X> {
        self.collection("Channels")
    }
}

impl<X: ResourceTransport + 'static> ItemContext<Channel, X> {
    /// Members of this channel
    pub fn members(&self) -> Collection<Member, X> {
        self.collection("Members")
    }
}
