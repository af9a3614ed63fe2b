//! The adapter contract.

use std::collections::BTreeMap;

use kstore_types::Value;

use crate::config::{AdapterConfig, WriteOptions};
use crate::error::StorageResult;
use crate::events::ChangeStream;

/// Typed, prefixed, expiring key-value access over one backing store.
///
/// Keys may be dotted paths (`"user.profile.name"`): the first segment names
/// the stored item and the remainder addresses a location inside it. Keys
/// are user keys; the configured prefix is added on the way to the store
/// and stripped on the way back. Expired items behave exactly like absent
/// ones.
pub trait Adapter: Send + Sync {
    /// Short human-readable adapter name.
    fn name(&self) -> &'static str;

    fn config(&self) -> &AdapterConfig;

    fn key_prefix(&self) -> &str {
        &self.config().key_prefix
    }

    /// Whether a backing-store key belongs to this adapter.
    fn is_owned_key(&self, driver_key: &str) -> bool {
        driver_key.starts_with(self.key_prefix())
    }

    /// Whether [`Adapter::listen`] can deliver changes.
    fn supports_events(&self) -> bool;

    /// Every live item under the prefix, in the store's enumeration order.
    fn all(&self) -> StorageResult<Vec<(String, Value)>>;

    /// Whether `key` (possibly nested) resolves to a live value.
    fn has(&self, key: &str) -> StorageResult<bool>;

    /// The value at `key`, or `default` when absent or expired.
    fn get(&self, key: &str, default: Value) -> StorageResult<Value>;

    /// [`Adapter::get`] for each key, with one shared default. Results are
    /// keyed by user key, so a prefixed key comes back without its prefix.
    fn get_multiple(&self, keys: &[&str], default: Value) -> StorageResult<BTreeMap<String, Value>>;

    /// Store `value` at `key`. Always `Ok(true)` on success.
    fn set(&self, key: &str, value: Value, options: &WriteOptions) -> StorageResult<bool>;

    /// [`Adapter::set`] for each pair, in order, sharing `options`.
    fn set_multiple(&self, values: Vec<(String, Value)>, options: &WriteOptions) -> StorageResult<bool>;

    /// Remove `key`. Absent keys succeed.
    fn delete(&self, key: &str, options: &WriteOptions) -> StorageResult<bool>;

    /// [`Adapter::delete`] for each key, in order.
    fn delete_multiple(&self, keys: &[&str], options: &WriteOptions) -> StorageResult<bool>;

    /// Remove items from the backing store. See each adapter for which.
    fn clear(&self) -> StorageResult<bool>;

    /// Number of live items under the prefix.
    fn length(&self) -> StorageResult<usize> {
        Ok(self.all()?.len())
    }

    /// The `index`-th live item, or `default` past the end.
    fn index(&self, index: usize, default: Value) -> StorageResult<Value>;

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.length()? == 0)
    }

    /// Remove every expired item under the prefix; returns how many went.
    fn delete_expired(&self) -> StorageResult<usize>;

    /// Subscribe to changes made by other contexts. An empty `keys` list
    /// means every key under the prefix.
    fn listen(&self, keys: &[String]) -> StorageResult<ChangeStream>;
}
