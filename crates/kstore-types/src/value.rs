//! The tagged union of storable value kinds.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value as Json};

use crate::item::DataType;
use crate::path;
use crate::time::to_utc_string;

/// A value held by a storage.
///
/// Structured values (`Array`, `Object`) carry plain JSON: only the top-level
/// kind is tagged, so a date nested inside an object is stored as its ISO
/// string and reads back as a string.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// No value at all. Dropped when embedded into a structure.
    Undefined,
    /// Explicit null.
    Null,
    /// A boolean.
    Boolean(bool),
    /// A double-precision number.
    Number(f64),
    /// A text string.
    String(String),
    /// A point in time (second precision once persisted).
    Date(DateTime<Utc>),
    /// A regular expression source pattern. Flags are never kept.
    Regex(String),
    /// Function source text. Inert: it is never evaluated.
    Function(String),
    /// An ordered list.
    Array(Vec<Json>),
    /// A string-keyed map.
    Object(Map<String, Json>),
}

impl Value {
    /// Build a regex value from its source pattern.
    pub fn regex(source: impl Into<String>) -> Self {
        Self::Regex(source.into())
    }

    /// Build a function value from its source text.
    pub fn function(source: impl Into<String>) -> Self {
        Self::Function(source.into())
    }

    /// The persisted kind tag for this value.
    ///
    /// Null, arrays, and maps all share the `object` tag.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Undefined => DataType::Undefined,
            Self::Date(_) => DataType::Date,
            Self::Regex(_) => DataType::Regex,
            Self::Function(_) => DataType::Function,
            Self::Boolean(_) => DataType::Boolean,
            Self::Number(_) => DataType::Number,
            Self::String(_) => DataType::String,
            Self::Null | Self::Array(_) | Self::Object(_) => DataType::Object,
        }
    }

    /// Lift plain JSON into a value. Strings stay strings.
    pub fn from_json(json: Json) -> Self {
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Boolean(b),
            Json::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::Array(items),
            Json::Object(map) => Self::Object(map),
        }
    }

    /// Lower this value into JSON for embedding inside a structure.
    ///
    /// Returns `None` for kinds that have no JSON form (`Undefined`,
    /// `Function`); a property holding one of those disappears. Dates become
    /// ISO strings, regexes become empty objects, non-finite numbers become
    /// null.
    pub fn to_json(&self) -> Option<Json> {
        match self {
            Self::Undefined | Self::Function(_) => None,
            Self::Null => Some(Json::Null),
            Self::Boolean(b) => Some(Json::Bool(*b)),
            Self::Number(n) => Some(number_to_json(*n)),
            Self::String(s) => Some(Json::String(s.clone())),
            Self::Date(at) => Some(Json::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))),
            Self::Regex(_) => Some(Json::Object(Map::new())),
            Self::Array(items) => Some(Json::Array(items.clone())),
            Self::Object(map) => Some(Json::Object(map.clone())),
        }
    }

    /// Turn a structured value into its JSON container; anything else
    /// becomes a fresh empty object.
    pub fn into_container(self) -> Json {
        match self {
            Self::Array(items) => Json::Array(items),
            Self::Object(map) => Json::Object(map),
            _ => Json::Object(Map::new()),
        }
    }

    /// Returns `true` for `Array` and `Object`.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Read the value at a nested path. Scalars have no nested paths.
    pub fn get_path(&self, nested: &str) -> Option<Value> {
        let container = match self {
            Self::Array(items) => Json::Array(items.clone()),
            Self::Object(map) => Json::Object(map.clone()),
            _ => return None,
        };
        path::get_path(&container, nested).cloned().map(Value::from_json)
    }
}

/// Encode a number the way a text envelope expects: integral values without
/// a fractional part, non-finite values as null.
pub(crate) fn number_to_json(n: f64) -> Json {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Json::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Json::Number).unwrap_or(Json::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", number_to_json(*n)),
            Self::String(s) => f.write_str(s),
            Self::Date(at) => f.write_str(&to_utc_string(at)),
            Self::Regex(source) => write!(f, "/{source}/"),
            Self::Function(source) => f.write_str(source),
            Self::Array(items) => write!(f, "{}", Json::Array(items.clone())),
            Self::Object(map) => write!(f, "{}", Json::Object(map.clone())),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(at: DateTime<Utc>) -> Self {
        Self::Date(at)
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Self::from_json(json)
    }
}
