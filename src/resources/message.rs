//! Messages (2010 API)

use super::dates::{rfc2822, rfc2822_option};
use crate::pagination::ListQuery;
use crate::resource::Params;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Delivery status of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Accepted,
    Scheduled,
    Canceled,
    Queued,
    Sending,
    Sent,
    Failed,
    Delivered,
    Undelivered,
    Receiving,
    Received,
    Read,
    PartiallyDelivered,
    /// A status this crate does not know yet
    #[serde(other)]
    Unknown,
}

impl MessageStatus {
    /// Whether the status can still change
    pub fn is_final(self) -> bool {
        matches!(
            self,
            Self::Canceled
                | Self::Failed
                | Self::Delivered
                | Self::Undelivered
                | Self::Received
                | Self::Read
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Inbound,
    OutboundApi,
    OutboundCall,
    OutboundReply,
    #[serde(other)]
    Unknown,
}

/// An SMS/MMS message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sid: String,
    pub account_sid: String,
    #[serde(default)]
    pub messaging_service_sid: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    pub to: String,
    #[serde(default)]
    pub body: String,
    pub status: MessageStatus,
    pub direction: Direction,
    /// Reported as a string by the API
    #[serde(default)]
    pub num_segments: Option<String>,
    #[serde(default)]
    pub num_media: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub price_unit: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(with = "rfc2822")]
    pub date_created: DateTime<Utc>,
    #[serde(with = "rfc2822_option", default)]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(with = "rfc2822_option", default)]
    pub date_sent: Option<DateTime<Utc>>,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub subresource_uris: HashMap<String, String>,
}

/// List filters accepted by the Messages collection
///
/// `DateSent<` and `DateSent>` are inclusive day bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    pub to: Option<String>,
    pub from: Option<String>,
    pub date_sent: Option<NaiveDate>,
    pub date_sent_before: Option<NaiveDate>,
    pub date_sent_after: Option<NaiveDate>,
}

impl MessageFilter {
    /// Start `query` with these filters
    pub fn apply(&self, query: ListQuery) -> ListQuery {
        let mut query = query
            .with_filter_opt("To", self.to.clone())
            .with_filter_opt("From", self.from.clone());
        if let Some(date) = self.date_sent {
            query = query.with_date_filter("DateSent", date);
        }
        if let Some(date) = self.date_sent_before {
            query = query.with_date_filter("DateSent<", date);
        }
        if let Some(date) = self.date_sent_after {
            query = query.with_date_filter("DateSent>", date);
        }
        query
    }
}

impl From<MessageFilter> for ListQuery {
    fn from(filter: MessageFilter) -> Self {
        filter.apply(ListQuery::new())
    }
}

/// Body of a create-message request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMessage {
    pub to: String,
    pub from: Option<String>,
    pub messaging_service_sid: Option<String>,
    pub body: Option<String>,
    pub media_url: Option<String>,
    pub status_callback: Option<String>,
}

impl NewMessage {
    /// A text message from a phone number
    pub fn text(to: impl Into<String>, from: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            from: Some(from.into()),
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn params(&self) -> Params {
        Params::new()
            .set("To", self.to.clone())
            .set_opt("From", self.from.clone())
            .set_opt("MessagingServiceSid", self.messaging_service_sid.clone())
            .set_opt("Body", self.body.clone())
            .set_opt("MediaUrl", self.media_url.clone())
            .set_opt("StatusCallback", self.status_callback.clone())
    }
}
