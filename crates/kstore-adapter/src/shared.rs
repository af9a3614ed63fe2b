//! Behavior shared by every adapter: prefixing, typing, nested paths, and
//! expiry. Concrete adapters differ only in how they enumerate and wipe
//! their backing store.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use kstore_codec::{Serializer, TypedSerializer};
use kstore_driver::{Driver, DriverOptions};
use kstore_types::path::{set_path, unset_path};
use kstore_types::{split, to_utc_string, ItemOptions, TypedItem, Value};
use tracing::{debug, info};

use crate::config::{AdapterConfig, WriteOptions};
use crate::error::{StorageError, StorageResult};
use crate::expiry::resolve_expiry;

/// A backing-store key and whatever text it currently holds.
pub(crate) type Record = (String, Option<String>);

pub(crate) struct AdapterCore<D> {
    driver: D,
    config: AdapterConfig,
    serializer: Arc<dyn Serializer>,
}

impl<D: Driver> AdapterCore<D> {
    pub(crate) fn new(driver: D, config: AdapterConfig, name: &str) -> StorageResult<Self> {
        if !driver.is_available() {
            return Err(StorageError::NotSupported(format!(
                "{name} on a platform without its backing store"
            )));
        }
        debug!(adapter = name, prefix = %config.key_prefix, "adapter created");
        Ok(Self {
            driver,
            config,
            serializer: Arc::new(TypedSerializer::new()),
        })
    }

    pub(crate) fn driver(&self) -> &D {
        &self.driver
    }

    pub(crate) fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub(crate) fn key_prefix(&self) -> &str {
        &self.config.key_prefix
    }

    pub(crate) fn set_key_prefix(&mut self, prefix: String) {
        self.config.key_prefix = prefix;
    }

    pub(crate) fn serializer(&self) -> Arc<dyn Serializer> {
        Arc::clone(&self.serializer)
    }

    pub(crate) fn set_serializer(&mut self, serializer: Arc<dyn Serializer>) {
        self.serializer = serializer;
    }

    pub(crate) fn is_owned_key(&self, driver_key: &str) -> bool {
        driver_key.starts_with(self.key_prefix())
    }

    /// Strip the prefix if the caller passed an already-prefixed key.
    pub(crate) fn user_key<'k>(&self, key: &'k str) -> &'k str {
        key.strip_prefix(self.key_prefix()).unwrap_or(key)
    }

    pub(crate) fn driver_key(&self, user_key: &str) -> String {
        format!("{}{}", self.key_prefix(), user_key)
    }

    /// Decode `raw`; an expired item is removed from the store and reads
    /// as absent.
    fn decode_live(&self, driver_key: &str, raw: Option<String>) -> StorageResult<Option<TypedItem>> {
        let Some(item) = self.serializer.deserialize(raw.as_deref())? else {
            return Ok(None);
        };
        if item.is_expired() {
            self.driver.remove_item(driver_key, &DriverOptions::default())?;
            debug!(key = driver_key, "expired item removed on read");
            return Ok(None);
        }
        Ok(Some(item))
    }

    fn read_live(&self, driver_key: &str) -> StorageResult<Option<TypedItem>> {
        let raw = self.driver.get_item(driver_key)?;
        self.decode_live(driver_key, raw)
    }

    pub(crate) fn get(&self, key: &str, default: Value) -> StorageResult<Value> {
        let path = split(self.user_key(key));
        let Some(item) = self.read_live(&self.driver_key(path.root))? else {
            return Ok(default);
        };
        Ok(match path.nested {
            None => item.value,
            Some(nested) => item.value.get_path(nested).unwrap_or(default),
        })
    }

    pub(crate) fn get_multiple(
        &self,
        keys: &[&str],
        default: Value,
    ) -> StorageResult<BTreeMap<String, Value>> {
        let mut values = BTreeMap::new();
        for key in keys {
            let value = self.get(key, default.clone())?;
            values.insert(self.user_key(key).to_string(), value);
        }
        Ok(values)
    }

    /// Write `value` at `key`, merging into the stored root for nested keys.
    /// The options' expiry applies to the whole root item.
    pub(crate) fn set(&self, key: &str, value: Value, options: &WriteOptions) -> StorageResult<bool> {
        let path = split(self.user_key(key));
        let root_value = match path.nested {
            None => value,
            Some(nested) => {
                let current = self.read_live(&self.driver_key(path.root))?;
                let mut container = current.map_or(Value::Null, |item| item.value).into_container();
                match value.to_json() {
                    Some(json) => set_path(&mut container, nested, json),
                    None => {
                        unset_path(&mut container, nested);
                    }
                }
                Value::from_json(container)
            }
        };

        let expires_at = resolve_expiry(options.expires.as_ref(), Utc::now());
        let item_options = ItemOptions {
            expires: expires_at.as_ref().map(to_utc_string),
        };
        let text = self.serializer.serialize(&root_value, Some(&item_options))?;
        self.driver
            .set_item(&self.driver_key(path.root), &text, &options.driver_options(expires_at))?;
        Ok(true)
    }

    pub(crate) fn set_multiple(
        &self,
        values: Vec<(String, Value)>,
        options: &WriteOptions,
    ) -> StorageResult<bool> {
        for (key, value) in values {
            self.set(&key, value, options)?;
        }
        Ok(true)
    }

    /// Remove `key`. A nested key is removed from the stored root, which
    /// keeps its expiry. Absent keys succeed.
    pub(crate) fn delete(&self, key: &str, options: &WriteOptions) -> StorageResult<bool> {
        let path = split(self.user_key(key));
        let driver_key = self.driver_key(path.root);
        let Some(nested) = path.nested else {
            self.driver.remove_item(&driver_key, &options.driver_options(None))?;
            return Ok(true);
        };

        let Some(item) = self.read_live(&driver_key)? else {
            return Ok(true);
        };
        if !item.value.is_structured() {
            return Ok(true);
        }
        let mut container = item.value.into_container();
        if unset_path(&mut container, nested) {
            let item_options = item.options.unwrap_or_default();
            let expires_at = item_options.expires_at();
            let text = self
                .serializer
                .serialize(&Value::from_json(container), Some(&item_options))?;
            self.driver
                .set_item(&driver_key, &text, &options.driver_options(expires_at))?;
        }
        Ok(true)
    }

    pub(crate) fn delete_multiple(&self, keys: &[&str], options: &WriteOptions) -> StorageResult<bool> {
        for key in keys {
            self.delete(key, options)?;
        }
        Ok(true)
    }

    /// Whether `key` resolves to a live value, reading the root's text
    /// through `lookup`.
    pub(crate) fn has_with<F>(&self, key: &str, lookup: F) -> StorageResult<bool>
    where
        F: FnOnce(&str) -> StorageResult<Option<String>>,
    {
        let path = split(self.user_key(key));
        let driver_key = self.driver_key(path.root);
        let raw = lookup(&driver_key)?;
        let Some(item) = self.decode_live(&driver_key, raw)? else {
            return Ok(false);
        };
        Ok(match path.nested {
            None => true,
            Some(nested) => item.value.get_path(nested).is_some(),
        })
    }

    pub(crate) fn has(&self, key: &str) -> StorageResult<bool> {
        self.has_with(key, |driver_key| Ok(self.driver.get_item(driver_key)?))
    }

    /// Decode every owned record, dropping expired ones, keyed by user key.
    pub(crate) fn collect_live(&self, records: Vec<Record>) -> StorageResult<Vec<(String, Value)>> {
        let mut items = Vec::with_capacity(records.len());
        for (driver_key, raw) in records {
            if !self.is_owned_key(&driver_key) {
                continue;
            }
            if let Some(item) = self.decode_live(&driver_key, raw)? {
                items.push((self.user_key(&driver_key).to_string(), item.value));
            }
        }
        Ok(items)
    }

    /// Remove every owned record whose expiry has passed.
    pub(crate) fn purge(&self, records: Vec<Record>) -> StorageResult<usize> {
        let now = Utc::now();
        let mut removed = 0;
        for (driver_key, raw) in records {
            if !self.is_owned_key(&driver_key) {
                continue;
            }
            let Some(item) = self.serializer.deserialize(raw.as_deref())? else {
                continue;
            };
            if item.is_expired_at(now) {
                self.driver.remove_item(&driver_key, &DriverOptions::default())?;
                removed += 1;
            }
        }
        if removed > 0 {
            info!(prefix = %self.key_prefix(), removed, "expired items purged");
        }
        Ok(removed)
    }
}
