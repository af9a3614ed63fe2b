//! The persisted item envelope and its decoded form.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::time::parse_timestamp;
use crate::value::Value;

/// Kind tag written next to every persisted value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Date,
    Regex,
    Function,
    Boolean,
    String,
    Number,
    Object,
    Undefined,
    /// Any tag this version does not know; the payload passes through.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Date => "date",
            Self::Regex => "regex",
            Self::Function => "function",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Number => "number",
            Self::Object => "object",
            Self::Undefined => "undefined",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Per-item metadata persisted alongside the value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOptions {
    /// Absolute expiry as a UTC string. Omitted entirely when the item never
    /// expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

impl ItemOptions {
    /// Options carrying an expiry string.
    pub fn expiring(expires: impl Into<String>) -> Self {
        Self {
            expires: Some(expires.into()),
        }
    }

    /// The expiry as an instant. Unparseable strings never expire.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires.as_deref().and_then(parse_timestamp)
    }

    /// Returns `true` if the expiry lies strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at < now)
    }
}

/// The on-disk record: `{"dataType": ..., "value": ..., "options": {...}}`.
///
/// `value` is absent for `undefined`; `options` is absent in records written
/// without metadata, and readers accept both shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredItem {
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ItemOptions>,
}

/// A decoded record: the value with its kind restored.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedItem {
    pub data_type: DataType,
    pub value: Value,
    pub options: Option<ItemOptions>,
}

impl TypedItem {
    /// Returns `true` if the item's expiry lies strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.options.as_ref().is_some_and(|o| o.is_expired_at(now))
    }

    /// Returns `true` if the item is expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use serde_json::json;

    #[test]
    fn record_without_options_parses() {
        let item: StoredItem = serde_json::from_str(r#"{"dataType":"number","value":2}"#).unwrap();
        assert_eq!(item.data_type, DataType::Number);
        assert_eq!(item.value, Some(json!(2)));
        assert!(item.options.is_none());
    }

    #[test]
    fn undefined_record_omits_value() {
        let item = StoredItem {
            data_type: DataType::Undefined,
            value: None,
            options: Some(ItemOptions::default()),
        };
        let text = serde_json::to_string(&item).unwrap();
        assert_eq!(text, r#"{"dataType":"undefined","options":{}}"#);
    }

    #[test]
    fn unknown_tag_is_tolerated() {
        let item: StoredItem = serde_json::from_str(r#"{"dataType":"bigint","value":"9"}"#).unwrap();
        assert_eq!(item.data_type, DataType::Unknown);
    }

    #[test]
    fn expiry_is_strictly_before_now() {
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap();
        let exact = ItemOptions::expiring("Wed, 01 Jan 2020 12:00:00 GMT");
        assert!(!exact.is_expired_at(now));
        assert!(exact.is_expired_at(now + TimeDelta::seconds(1)));
    }

    #[test]
    fn unparseable_expiry_never_expires() {
        let options = ItemOptions::expiring("whenever");
        assert!(!options.is_expired_at(Utc::now()));
    }

    #[test]
    fn item_without_options_never_expires() {
        let item = TypedItem {
            data_type: DataType::String,
            value: Value::from("v"),
            options: None,
        };
        assert!(!item.is_expired());
    }
}
