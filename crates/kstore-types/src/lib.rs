//! Foundation types for kstore.
//!
//! Every crate in the workspace speaks in terms of the types defined here:
//!
//! - [`Value`] -- the tagged union of value kinds a storage can hold
//! - [`DataType`] -- the persisted kind tag (`date`, `regex`, `function`, ...)
//! - [`StoredItem`] / [`TypedItem`] -- the on-disk envelope and its decoded form
//! - [`KeyPath`] -- a dot-notation key split into root and nested path
//! - [`Expires`] -- caller-facing expiration input
//!
//! # Design Rules
//!
//! 1. Only the root segment of a key is ever persisted as a driver key.
//! 2. Nested paths address into the structured JSON held under the root.
//! 3. Timestamps are persisted as UTC strings with second precision.

pub mod item;
pub mod key;
pub mod path;
pub mod time;
pub mod value;

pub use item::{DataType, ItemOptions, StoredItem, TypedItem};
pub use key::{split, KeyPath};
pub use time::{parse_timestamp, to_utc_string, Expires};
pub use value::Value;
