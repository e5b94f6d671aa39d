//! Page payload decoding

use crate::error::{Error, Result};
use crate::pagination::{RawPage, PAGE_TOKEN_PARAM};
use crate::types::{JsonObject, JsonValue, OptionStringExt};
use url::Url;

/// Top-level fields of a 2010-style page that are not records
pub const META_KEYS: [&str; 12] = [
    "end",
    "first_page_uri",
    "last_page_uri",
    "meta",
    "next_page_uri",
    "num_pages",
    "page",
    "page_size",
    "previous_page_uri",
    "start",
    "total",
    "uri",
];

/// Decode a page body
///
/// `request_url` is the URL the page was fetched from; relative next-page
/// links are resolved against it.
pub fn decode_page_str(body: &str, request_url: &str) -> Result<RawPage> {
    let value: JsonValue = serde_json::from_str(body)
        .map_err(|e| Error::decode(format!("Failed to parse page JSON: {e}")))?;
    decode_page(&value, request_url)
}

/// Decode a parsed page payload
pub fn decode_page(value: &JsonValue, request_url: &str) -> Result<RawPage> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::decode("page payload is not a JSON object"))?;

    let key = record_key(object)?;
    let records = match object.get(&key) {
        Some(JsonValue::Array(items)) => items.clone(),
        Some(JsonValue::Null) => Vec::new(),
        Some(_) => {
            return Err(Error::decode(format!("page field '{key}' is not an array")));
        }
        None => return Err(Error::decode(format!("page has no '{key}' field"))),
    };

    let meta = object.get("meta").and_then(JsonValue::as_object);

    let next_page_url = match meta.and_then(|m| string_field(m, "next_page_url")) {
        Some(url) => Some(url),
        None => match string_field(object, "next_page_uri") {
            Some(uri) => Some(Url::parse(request_url)?.join(&uri)?.to_string()),
            None => None,
        },
    };

    let next_page_token = next_page_url.as_deref().and_then(page_token);

    let page_number = meta
        .and_then(|m| m.get("page"))
        .or_else(|| object.get("page"))
        .and_then(JsonValue::as_u64)
        .unwrap_or(0);

    Ok(RawPage {
        records,
        next_page_url,
        next_page_token,
        page_number: u32::try_from(page_number).unwrap_or(u32::MAX),
    })
}

/// Name of the field holding the record array
///
/// `meta.key` when present; otherwise the single field that is not
/// pagination metadata.
pub fn record_key(object: &JsonObject) -> Result<String> {
    if let Some(key) = object
        .get("meta")
        .and_then(JsonValue::as_object)
        .and_then(|m| string_field(m, "key"))
    {
        return Ok(key);
    }

    let mut candidates = object
        .keys()
        .filter(|k| !META_KEYS.contains(&k.as_str()));

    match (candidates.next(), candidates.next()) {
        (Some(key), None) => Ok(key.clone()),
        (None, _) => Err(Error::decode("page has no record field")),
        (Some(first), Some(second)) => Err(Error::decode(format!(
            "page record field is ambiguous: '{first}' or '{second}'"
        ))),
    }
}

fn string_field(object: &JsonObject, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .none_if_empty()
}

fn page_token(url: &str) -> Option<String> {
    Url::parse(url).ok().and_then(|u| {
        u.query_pairs()
            .find(|(k, _)| k == PAGE_TOKEN_PARAM)
            .map(|(_, v)| v.into_owned())
    })
}
