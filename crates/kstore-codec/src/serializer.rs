use chrono::DateTime;
use serde_json::Value as Json;

use kstore_types::{parse_timestamp, to_utc_string, DataType, ItemOptions, StoredItem, TypedItem, Value};

use crate::error::{CodecError, CodecResult};

/// Converts values to and from the text stored by a driver.
///
/// Implementations must satisfy:
/// - `deserialize(None)` is `Ok(None)`: a missing record is not an error.
/// - `deserialize(Some(serialize(v, o)))` restores `v` up to the documented
///   lossiness of its kind, and restores `o` verbatim.
pub trait Serializer: Send + Sync {
    /// Encode a value and optional item metadata into one text blob.
    fn serialize(&self, value: &Value, options: Option<&ItemOptions>) -> CodecResult<String>;

    /// Decode a text blob. Returns `Ok(None)` for `None` input.
    fn deserialize(&self, text: Option<&str>) -> CodecResult<Option<TypedItem>>;
}

/// The default serializer: a JSON envelope tagged with the value kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct TypedSerializer;

impl TypedSerializer {
    /// Create a new serializer.
    pub fn new() -> Self {
        Self
    }

    /// Wrap a value in its tagged envelope.
    pub fn encode(value: &Value, options: Option<&ItemOptions>) -> StoredItem {
        let payload = match value {
            Value::Date(at) => Some(Json::String(to_utc_string(at))),
            Value::Regex(source) | Value::Function(source) => Some(Json::String(source.clone())),
            other => other.to_json(),
        };
        StoredItem {
            data_type: value.data_type(),
            value: payload,
            options: options.cloned(),
        }
    }

    /// Restore the value kind named by an envelope's tag.
    pub fn decode(item: StoredItem) -> CodecResult<TypedItem> {
        let value = match item.data_type {
            DataType::Date => Value::Date(decode_date(item.value.as_ref())?),
            DataType::Regex => Value::Regex(payload_text(item.value.as_ref())),
            DataType::Function => Value::Function(payload_text(item.value.as_ref())),
            DataType::Boolean => Value::Boolean(truthy(item.value.as_ref())),
            DataType::Undefined => Value::Undefined,
            _ => item.value.map(Value::from_json).unwrap_or(Value::Null),
        };
        Ok(TypedItem {
            data_type: item.data_type,
            value,
            options: item.options,
        })
    }
}

impl Serializer for TypedSerializer {
    fn serialize(&self, value: &Value, options: Option<&ItemOptions>) -> CodecResult<String> {
        serde_json::to_string(&Self::encode(value, options))
            .map_err(|e| CodecError::Serialization(e.to_string()))
    }

    fn deserialize(&self, text: Option<&str>) -> CodecResult<Option<TypedItem>> {
        let Some(text) = text else {
            return Ok(None);
        };
        let item: StoredItem =
            serde_json::from_str(text).map_err(|e| CodecError::Malformed(e.to_string()))?;
        Self::decode(item).map(Some)
    }
}

fn decode_date(payload: Option<&Json>) -> CodecResult<chrono::DateTime<chrono::Utc>> {
    match payload {
        Some(Json::String(text)) => {
            parse_timestamp(text).ok_or_else(|| CodecError::InvalidDate(text.clone()))
        }
        Some(Json::Number(ms)) => ms
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| CodecError::InvalidDate(ms.to_string())),
        other => Err(CodecError::InvalidDate(payload_text(other))),
    }
}

/// String coercion of a payload.
fn payload_text(payload: Option<&Json>) -> String {
    match payload {
        None => "undefined".to_string(),
        Some(Json::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Boolean coercion of a payload: empty, zero, null, and absent are false.
fn truthy(payload: Option<&Json>) -> bool {
    match payload {
        None | Some(Json::Null) => false,
        Some(Json::Bool(b)) => *b,
        Some(Json::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Json::String(s)) => !s.is_empty(),
        Some(Json::Array(_)) | Some(Json::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use serde_json::json;

    fn round_trip(value: &Value) -> Value {
        let codec = TypedSerializer::new();
        let text = codec.serialize(value, None).unwrap();
        codec.deserialize(Some(&text)).unwrap().unwrap().value
    }

    #[test]
    fn none_input_is_a_miss() {
        assert!(TypedSerializer::new().deserialize(None).unwrap().is_none());
    }

    #[test]
    fn malformed_text_is_an_error() {
        let err = TypedSerializer::new().deserialize(Some("{not json")).unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
    }

    #[test]
    fn date_round_trips_at_second_precision() {
        let at = Utc.with_ymd_and_hms(1986, 5, 14, 0, 0, 0).unwrap();
        assert_eq!(round_trip(&Value::Date(at)), Value::Date(at));

        let text = TypedSerializer::new().serialize(&Value::Date(at), None).unwrap();
        assert_eq!(text, r#"{"dataType":"date","value":"Wed, 14 May 1986 00:00:00 GMT"}"#);
    }

    #[test]
    fn regex_keeps_source_only() {
        assert_eq!(round_trip(&Value::regex("^k[0-9]+$")), Value::regex("^k[0-9]+$"));
    }

    #[test]
    fn function_stays_text() {
        let source = "function (a) { return a * 2; }";
        assert_eq!(round_trip(&Value::function(source)), Value::function(source));
    }

    #[test]
    fn primitives_and_structures_pass_through() {
        for value in [
            Value::Null,
            Value::Undefined,
            Value::from(true),
            Value::from(false),
            Value::from(2),
            Value::from(0.75),
            Value::from("Value 3"),
            Value::from(json!([1, "two", null])),
            Value::from(json!({"a": "a", "b": {"c": "c"}})),
        ] {
            assert_eq!(round_trip(&value), value);
        }
    }

    #[test]
    fn options_are_written_and_read_back() {
        let codec = TypedSerializer::new();
        let options = ItemOptions::expiring("Wed, 14 May 1986 00:00:00 GMT");
        let text = codec.serialize(&Value::from(1), Some(&options)).unwrap();
        assert_eq!(
            text,
            r#"{"dataType":"number","value":1,"options":{"expires":"Wed, 14 May 1986 00:00:00 GMT"}}"#
        );
        let item = codec.deserialize(Some(&text)).unwrap().unwrap();
        assert_eq!(item.options, Some(options));
    }

    #[test]
    fn boolean_tag_coerces_payload() {
        let codec = TypedSerializer::new();
        let decode = |text: &str| codec.deserialize(Some(text)).unwrap().unwrap().value;
        assert_eq!(decode(r#"{"dataType":"boolean","value":0}"#), Value::Boolean(false));
        assert_eq!(decode(r#"{"dataType":"boolean","value":"yes"}"#), Value::Boolean(true));
        assert_eq!(decode(r#"{"dataType":"boolean"}"#), Value::Boolean(false));
    }

    #[test]
    fn date_tag_accepts_epoch_millis() {
        let codec = TypedSerializer::new();
        let item = codec
            .deserialize(Some(r#"{"dataType":"date","value":516412800000}"#))
            .unwrap()
            .unwrap();
        assert_eq!(
            item.value,
            Value::Date(Utc.with_ymd_and_hms(1986, 5, 14, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn unreadable_date_is_an_error() {
        let err = TypedSerializer::new()
            .deserialize(Some(r#"{"dataType":"date","value":"someday"}"#))
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidDate(_)));
    }

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Boolean),
            any::<i32>().prop_map(Value::from),
            "[ -~]{0,32}".prop_map(Value::String),
            "[a-z0-9^$+*]{0,16}".prop_map(Value::Regex),
            (0i64..4_102_444_800).prop_map(|secs| {
                Value::Date(DateTime::from_timestamp(secs, 0).unwrap())
            }),
        ]
    }

    proptest! {
        #[test]
        fn scalars_round_trip(value in scalar()) {
            prop_assert_eq!(round_trip(&value), value);
        }
    }
}
