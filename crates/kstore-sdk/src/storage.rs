use std::collections::BTreeMap;

use kstore_adapter::{Adapter, AdapterConfig, ChangeStream, StorageEvent, WriteOptions};
use kstore_types::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::StorageConfig;
use crate::error::{SdkError, SdkResult};
use crate::kind::{AdapterKind, AdapterSelector};
use crate::platform::Platform;
use crate::registry::create_adapter;

/// A running change callback. Cancelled when dropped.
#[derive(Debug)]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    /// Stop delivering changes.
    pub fn cancel(self) {
        self.task.abort();
    }

    /// Returns `true` until the subscription is cancelled or its store goes
    /// away.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// High-level storage API: one active adapter, every call forwarded to it.
pub struct Storage {
    adapter: Box<dyn Adapter>,
    encrypted: bool,
    subscriptions: Vec<Subscription>,
}

impl Storage {
    /// Wrap an already-built adapter.
    pub fn new(adapter: Box<dyn Adapter>) -> Self {
        Self {
            adapter,
            encrypted: false,
            subscriptions: Vec::new(),
        }
    }

    /// Resolve `selector` against `platform` with the default adapter
    /// configuration. Unknown adapter names fail with `InvalidAdapter`.
    pub fn select(selector: impl Into<AdapterSelector>, platform: &Platform) -> SdkResult<Self> {
        let adapter = match selector.into() {
            AdapterSelector::Kind(kind) => create_adapter(kind, platform, AdapterConfig::default())?,
            AdapterSelector::Named(name) => {
                create_adapter(name.parse()?, platform, AdapterConfig::default())?
            }
            AdapterSelector::Custom(adapter) => adapter,
        };
        Ok(Self::new(adapter))
    }

    /// Build a facade from a configuration and the stores it describes.
    pub fn open(config: &StorageConfig, platform: &Platform) -> SdkResult<Self> {
        let adapter = create_adapter(config.adapter, platform, config.adapter_config())?;
        Ok(Self::new(adapter).encrypted(config.encrypted))
    }

    /// Local storage with the default prefix.
    pub fn local(platform: &Platform) -> SdkResult<Self> {
        Self::select(AdapterKind::LocalStore, platform)
    }

    /// Session storage with the default prefix.
    pub fn session(platform: &Platform) -> SdkResult<Self> {
        Self::select(AdapterKind::SessionStore, platform)
    }

    /// Cookie storage with the default prefix.
    pub fn cookie(platform: &Platform) -> SdkResult<Self> {
        Self::select(AdapterKind::Cookie, platform)
    }

    /// Record the encryption flag. Values are stored in clear text either
    /// way.
    pub fn encrypted(mut self, encrypted: bool) -> Self {
        if encrypted {
            warn!(adapter = self.adapter.name(), "encryption requested; values are stored unencrypted");
        }
        self.encrypted = encrypted;
        self
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Register `callback` for the facade's lifetime, as with
    /// [`Storage::on_change`].
    pub fn with_listener<F>(mut self, callback: F, keys: &[String]) -> SdkResult<Self>
    where
        F: FnMut(StorageEvent) + Send + 'static,
    {
        let subscription = self.on_change(callback, keys)?;
        self.subscriptions.push(subscription);
        Ok(self)
    }

    pub fn adapter(&self) -> &dyn Adapter {
        self.adapter.as_ref()
    }

    /// Swap the active adapter. Callbacks registered with
    /// [`Storage::with_listener`] keep watching the previous store.
    pub fn set_adapter(&mut self, adapter: Box<dyn Adapter>) {
        debug!(from = self.adapter.name(), to = adapter.name(), "adapter replaced");
        self.adapter = adapter;
    }

    // ---- Reads ----

    pub fn all(&self) -> SdkResult<Vec<(String, Value)>> {
        Ok(self.adapter.all()?)
    }

    /// Whether `key` currently resolves to a value.
    ///
    /// Another context may remove the item right after this returns, so use
    /// it for warm-up checks rather than to guard a following `get`.
    pub fn has(&self, key: &str) -> SdkResult<bool> {
        Ok(self.adapter.has(key)?)
    }

    /// The value at `key`, or `Value::Null` when absent.
    pub fn get(&self, key: &str) -> SdkResult<Value> {
        self.get_or(key, Value::Null)
    }

    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> SdkResult<Value> {
        Ok(self.adapter.get(key, default.into())?)
    }

    pub fn get_multiple(
        &self,
        keys: &[&str],
        default: impl Into<Value>,
    ) -> SdkResult<BTreeMap<String, Value>> {
        Ok(self.adapter.get_multiple(keys, default.into())?)
    }

    pub fn length(&self) -> SdkResult<usize> {
        Ok(self.adapter.length()?)
    }

    pub fn index(&self, index: usize, default: impl Into<Value>) -> SdkResult<Value> {
        Ok(self.adapter.index(index, default.into())?)
    }

    pub fn is_empty(&self) -> SdkResult<bool> {
        Ok(self.adapter.is_empty()?)
    }

    // ---- Writes ----

    pub fn set(&self, key: &str, value: impl Into<Value>) -> SdkResult<bool> {
        self.set_with(key, value, &WriteOptions::new())
    }

    pub fn set_with(&self, key: &str, value: impl Into<Value>, options: &WriteOptions) -> SdkResult<bool> {
        Ok(self.adapter.set(key, value.into(), options)?)
    }

    pub fn set_multiple(&self, values: Vec<(String, Value)>, options: &WriteOptions) -> SdkResult<bool> {
        Ok(self.adapter.set_multiple(values, options)?)
    }

    pub fn delete(&self, key: &str) -> SdkResult<bool> {
        self.delete_with(key, &WriteOptions::new())
    }

    pub fn delete_with(&self, key: &str, options: &WriteOptions) -> SdkResult<bool> {
        Ok(self.adapter.delete(key, options)?)
    }

    pub fn delete_multiple(&self, keys: &[&str], options: &WriteOptions) -> SdkResult<bool> {
        Ok(self.adapter.delete_multiple(keys, options)?)
    }

    pub fn clear(&self) -> SdkResult<bool> {
        Ok(self.adapter.clear()?)
    }

    /// Remove every expired item now; returns how many were removed.
    pub fn delete_expired(&self) -> SdkResult<usize> {
        Ok(self.adapter.delete_expired()?)
    }

    // ---- Change notification ----

    /// A stream of changes made by other contexts. See [`Adapter::listen`].
    pub fn listen(&self, keys: &[String]) -> SdkResult<ChangeStream> {
        Ok(self.adapter.listen(keys)?)
    }

    /// Run `callback` on a tokio task for every change made by another
    /// context. Must be called from within a tokio runtime.
    pub fn on_change<F>(&self, mut callback: F, keys: &[String]) -> SdkResult<Subscription>
    where
        F: FnMut(StorageEvent) + Send + 'static,
    {
        let runtime = Handle::try_current()
            .map_err(|_| SdkError::not_supported("change callbacks outside a tokio runtime"))?;
        let mut stream = self.adapter.listen(keys)?;
        let task = runtime.spawn(async move {
            while let Some(event) = stream.recv().await {
                callback(event);
            }
            debug!("change stream closed");
        });
        Ok(Subscription { task })
    }

    /// Cancel every callback registered with [`Storage::with_listener`].
    pub fn cancel_listeners(&mut self) {
        let count = self.subscriptions.len();
        self.subscriptions.clear();
        if count > 0 {
            debug!(count, "listeners cancelled");
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("adapter", &self.adapter.name())
            .field("key_prefix", &self.adapter.key_prefix())
            .field("encrypted", &self.encrypted)
            .field("listeners", &self.subscriptions.len())
            .finish()
    }
}
