//! Typed resources
//!
//! A few representative records. Everything else can be read as
//! [`JsonObject`](crate::types::JsonObject) through a generic collection.
//!
//! - [`Message`]: 2010 API, RFC 2822 timestamps, `.json` suffix
//! - [`ChatService`], [`Channel`], [`Member`]: v2 Chat API, ISO 8601 timestamps

mod chat;
pub mod dates;
mod message;

pub use chat::{Channel, ChannelType, ChatService, Member, NewChannel};
pub use message::{Direction, Message, MessageFilter, MessageStatus, NewMessage};
