//! Adapter over stores that can be walked by position.

use std::collections::BTreeMap;
use std::sync::Arc;

use kstore_codec::Serializer;
use kstore_driver::IndexedDriver;
use kstore_types::Value;
use tracing::info;

use crate::adapter::Adapter;
use crate::config::{AdapterConfig, WriteOptions};
use crate::shared::{AdapterCore, Record};
use crate::error::{StorageError, StorageResult};
use crate::events::ChangeStream;

const NAME: &str = "storage adapter";

/// Adapter for local/session style areas.
///
/// Enumeration follows the driver's positional order. `clear` wipes the
/// entire area, including keys written under other prefixes.
pub struct StorageAdapter<D> {
    core: AdapterCore<D>,
    events: bool,
}

impl<D: IndexedDriver> StorageAdapter<D> {
    /// Adapter with the default configuration.
    pub fn new(driver: D) -> StorageResult<Self> {
        Self::with_config(driver, AdapterConfig::default())
    }

    /// Fails with `NotSupported` when the platform lacks the store.
    pub fn with_config(driver: D, config: AdapterConfig) -> StorageResult<Self> {
        let events = driver.supports_events();
        Ok(Self {
            core: AdapterCore::new(driver, config, NAME)?,
            events,
        })
    }

    /// Replace the record serializer.
    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.core.set_serializer(serializer);
        self
    }

    pub fn set_key_prefix(&mut self, prefix: impl Into<String>) {
        self.core.set_key_prefix(prefix.into());
    }

    pub fn driver(&self) -> &D {
        self.core.driver()
    }

    fn owned_records(&self) -> StorageResult<Vec<Record>> {
        let driver = self.core.driver();
        let len = driver.len()?;
        let mut keys = Vec::with_capacity(len);
        for i in 0..len {
            if let Some(key) = driver.key(i)? {
                if self.core.is_owned_key(&key) {
                    keys.push(key);
                }
            }
        }

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let raw = driver.get_item(&key)?;
            records.push((key, raw));
        }
        Ok(records)
    }
}

impl<D: IndexedDriver> Adapter for StorageAdapter<D> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn config(&self) -> &AdapterConfig {
        self.core.config()
    }

    fn supports_events(&self) -> bool {
        self.events
    }

    fn all(&self) -> StorageResult<Vec<(String, Value)>> {
        self.core.collect_live(self.owned_records()?)
    }

    fn has(&self, key: &str) -> StorageResult<bool> {
        self.core.has(key)
    }

    fn get(&self, key: &str, default: Value) -> StorageResult<Value> {
        self.core.get(key, default)
    }

    fn get_multiple(&self, keys: &[&str], default: Value) -> StorageResult<BTreeMap<String, Value>> {
        self.core.get_multiple(keys, default)
    }

    fn set(&self, key: &str, value: Value, options: &WriteOptions) -> StorageResult<bool> {
        self.core.set(key, value, options)
    }

    fn set_multiple(&self, values: Vec<(String, Value)>, options: &WriteOptions) -> StorageResult<bool> {
        self.core.set_multiple(values, options)
    }

    fn delete(&self, key: &str, options: &WriteOptions) -> StorageResult<bool> {
        self.core.delete(key, options)
    }

    fn delete_multiple(&self, keys: &[&str], options: &WriteOptions) -> StorageResult<bool> {
        self.core.delete_multiple(keys, options)
    }

    fn clear(&self) -> StorageResult<bool> {
        self.core.driver().clear()?;
        info!(adapter = NAME, "backing store cleared");
        Ok(true)
    }

    fn index(&self, index: usize, default: Value) -> StorageResult<Value> {
        Ok(self
            .all()?
            .into_iter()
            .nth(index)
            .map(|(_, value)| value)
            .unwrap_or(default))
    }

    fn delete_expired(&self) -> StorageResult<usize> {
        self.core.purge(self.owned_records()?)
    }

    fn listen(&self, keys: &[String]) -> StorageResult<ChangeStream> {
        let unsupported = || StorageError::NotSupported(format!("change events on this {NAME}"));
        if !self.events {
            return Err(unsupported());
        }
        let feed = self.core.driver().subscribe().ok_or_else(unsupported)?;
        info!(adapter = NAME, watched = keys.len(), "change listener registered");
        Ok(ChangeStream::new(
            feed,
            self.core.key_prefix().to_string(),
            keys.to_vec(),
            self.core.serializer(),
        ))
    }
}

impl<D: IndexedDriver> std::fmt::Debug for StorageAdapter<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageAdapter")
            .field("config", self.core.config())
            .field("events", &self.events)
            .finish()
    }
}
