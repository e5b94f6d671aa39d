//! Serde helpers for the 2010 API's RFC 2822 timestamps
//!
//! `Wed, 18 Aug 2010 20:01:40 +0000`. The v1/v2 APIs use ISO 8601, which
//! chrono's own serde support already handles.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};

/// Parse an RFC 2822 timestamp into UTC
pub fn parse_rfc2822(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::decode(format!("Invalid RFC 2822 date '{value}': {e}")))
}

/// Render a timestamp the way the 2010 API does
pub fn format_rfc2822(at: &DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S %z").to_string()
}

/// `#[serde(with = "rfc2822")]` for `DateTime<Utc>`
pub mod rfc2822 {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_rfc2822(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let value = String::deserialize(deserializer)?;
        super::parse_rfc2822(&value).map_err(de::Error::custom)
    }
}

/// `#[serde(with = "rfc2822_option", default)]` for nullable timestamps
///
/// Null and empty strings both read as `None`.
pub mod rfc2822_option {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        at: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match at {
            Some(at) => serializer.serialize_str(&super::format_rfc2822(at)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(value) if !value.trim().is_empty() => super::parse_rfc2822(&value)
                .map(Some)
                .map_err(de::Error::custom),
            _ => Ok(None),
        }
    }
}
