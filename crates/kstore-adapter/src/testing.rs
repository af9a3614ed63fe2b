//! Shared fixture for adapter tests.

use chrono::{DateTime, TimeZone, Utc};
use kstore_types::Value;
use serde_json::json;

use crate::adapter::Adapter;
use crate::config::WriteOptions;

pub(crate) fn birthday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1986, 5, 14, 0, 0, 0).unwrap()
}

pub(crate) fn json(value: serde_json::Value) -> Value {
    Value::from_json(value)
}

/// Seven roots: `key5` and `key7` are written already expired, and `key6`
/// is built up through nested writes.
pub(crate) fn seed(adapter: &dyn Adapter) {
    let none = WriteOptions::new();
    let expired = WriteOptions::expiring(birthday());

    assert!(adapter.set("key1", Value::Null, &none).unwrap());
    assert!(adapter.set("key2", Value::from(2), &none).unwrap());
    assert!(adapter.set("key3", Value::from("Value 3"), &none).unwrap());
    assert!(adapter.set("key4", Value::Date(birthday()), &none).unwrap());
    assert!(adapter.set("key5", Value::Date(birthday()), &expired).unwrap());
    assert!(adapter.set("key6", json(json!({"a": "a", "b": {"c": "c"}})), &none).unwrap());
    assert!(adapter.set("key6.e", json(json!({"f": "f"})), &none).unwrap());
    assert!(adapter.set("key6.b.c.d", Value::from(0.75), &none).unwrap());
    assert!(adapter.set("key7.a", Value::from(1), &none).unwrap());
    assert!(adapter.set("key7.b", Value::from(2), &expired).unwrap());
}

pub(crate) fn key6() -> Value {
    json(json!({"a": "a", "b": {"c": {"d": 0.75}}, "e": {"f": "f"}}))
}

pub(crate) fn live_items() -> Vec<(String, Value)> {
    vec![
        ("key1".to_string(), Value::Null),
        ("key2".to_string(), Value::from(2)),
        ("key3".to_string(), Value::from("Value 3")),
        ("key4".to_string(), Value::Date(birthday())),
        ("key6".to_string(), key6()),
    ]
}

/// Read-side behavior every adapter shares once seeded.
pub(crate) fn assert_seeded_reads(adapter: &dyn Adapter) {
    assert!(adapter.has("key1").unwrap());
    assert!(adapter.has("key2").unwrap());
    assert!(!adapter.has("key5").unwrap());
    assert!(adapter.has("key6.b.c").unwrap());
    assert!(!adapter.has("key6.a.d").unwrap());
    assert!(!adapter.has("key7").unwrap());

    assert_eq!(adapter.get("key1", Value::Null).unwrap(), Value::Null);
    assert_eq!(adapter.get("key2", Value::Null).unwrap(), Value::from(2));
    assert_eq!(adapter.get("key3", Value::Null).unwrap(), Value::from("Value 3"));
    assert_eq!(adapter.get("key4", Value::Null).unwrap(), Value::Date(birthday()));
    assert_eq!(adapter.get("key5", Value::Null).unwrap(), Value::Null);
    assert_eq!(
        adapter.get("key5", Value::from("Default Value")).unwrap(),
        Value::from("Default Value")
    );
    assert_eq!(adapter.get("key6", Value::Null).unwrap(), key6());
    assert_eq!(adapter.get("key6.b", Value::Null).unwrap(), json(json!({"c": {"d": 0.75}})));
    assert_eq!(adapter.get("key6.b.c", Value::Null).unwrap(), json(json!({"d": 0.75})));
    assert_eq!(adapter.get("key6.b.c.d", Value::Null).unwrap(), Value::from(0.75));
    assert_eq!(
        adapter.get("key6.b.c.f", Value::from("Default Value")).unwrap(),
        Value::from("Default Value")
    );

    let values = adapter
        .get_multiple(&["key1", "key2", "key8"], Value::from("Default Value"))
        .unwrap();
    assert_eq!(values["key1"], Value::Null);
    assert_eq!(values["key2"], Value::from(2));
    assert_eq!(values["key8"], Value::from("Default Value"));

    assert_eq!(adapter.length().unwrap(), 5);
    assert!(!adapter.is_empty().unwrap());
}

/// Write-side behavior every adapter shares once seeded.
pub(crate) fn assert_seeded_writes(adapter: &dyn Adapter) {
    let none = WriteOptions::new();

    let pairs = vec![
        ("key7".to_string(), Value::from("Value 7")),
        ("key8".to_string(), Value::from("Value 8")),
    ];
    assert!(adapter.set_multiple(pairs, &none).unwrap());
    assert_eq!(adapter.get("key7", Value::Null).unwrap(), Value::from("Value 7"));
    assert_eq!(adapter.get("key8", Value::Null).unwrap(), Value::from("Value 8"));
    assert!(adapter.delete_multiple(&["key7", "key8"], &none).unwrap());
    assert_eq!(adapter.get("key7", Value::Null).unwrap(), Value::Null);
    assert_eq!(adapter.get("key8", Value::Null).unwrap(), Value::Null);

    assert!(adapter.delete("key2", &none).unwrap());
    assert_eq!(adapter.get("key2", Value::Null).unwrap(), Value::Null);

    assert!(adapter.delete("key6.e", &none).unwrap());
    assert_eq!(
        adapter.get("key6", Value::Null).unwrap(),
        json(json!({"a": "a", "b": {"c": {"d": 0.75}}}))
    );
    assert!(adapter.delete("key6.b.c", &none).unwrap());
    assert_eq!(adapter.get("key6", Value::Null).unwrap(), json(json!({"a": "a", "b": {}})));

    assert!(adapter.clear().unwrap());
    assert_eq!(adapter.length().unwrap(), 0);
    assert!(adapter.is_empty().unwrap());
}

/// Prefixed keys read the same items, and results come back under user keys.
pub(crate) fn assert_prefixed_lookups(adapter: &dyn Adapter) {
    let prefixed = format!("{}key2", adapter.key_prefix());
    let values = adapter
        .get_multiple(&[prefixed.as_str(), "missing"], Value::from("D"))
        .unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values["key2"], Value::from(2));
    assert_eq!(values["missing"], Value::from("D"));
    assert!(!values.contains_key(&prefixed));
}
