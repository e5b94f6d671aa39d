//! Form parameters for write requests

use crate::types::JsonValue;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Ordered form-encoded body of a create or update request
///
/// Setting a key that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
        self
    }

    /// Set a parameter when a value is present
    #[must_use]
    pub fn set_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    /// Set a boolean, rendered `true` / `false`
    #[must_use]
    pub fn set_bool(self, key: impl Into<String>, value: bool) -> Self {
        self.set(key, value.to_string())
    }

    /// Set a date, rendered `YYYY-MM-DD`
    #[must_use]
    pub fn set_date(self, key: impl Into<String>, date: NaiveDate) -> Self {
        self.set(key, date.format("%Y-%m-%d").to_string())
    }

    /// Set a timestamp, rendered RFC 3339 in UTC
    #[must_use]
    pub fn set_datetime(self, key: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.set(key, at.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    /// Set a JSON-valued parameter such as `Attributes`
    #[must_use]
    pub fn set_json(self, key: impl Into<String>, value: &JsonValue) -> Self {
        self.set(key, value.to_string())
    }

    /// Pairs in insertion order
    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// Look up a parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |params, (k, v)| params.set(k, v))
    }
}
