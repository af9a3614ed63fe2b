//! Typed change notifications for one adapter's namespace.

use std::sync::Arc;

use kstore_codec::Serializer;
use kstore_driver::{ChangeEvent, ChangeFeed};
use kstore_types::Value;
use tracing::warn;

/// A change made by another context, translated to user keys and values.
#[derive(Clone, Debug, PartialEq)]
pub struct StorageEvent {
    /// The user key that changed, or `None` when the area was cleared.
    pub key: Option<String>,
    /// Value before the change, if there was one.
    pub old_value: Option<Value>,
    /// Value after the change, or `None` on removal.
    pub new_value: Option<Value>,
}

/// Receives [`StorageEvent`]s for keys under one adapter's prefix.
///
/// Changes to keys outside the prefix are never delivered. With a non-empty
/// key list, only those keys are delivered, and whole-area clears are
/// filtered out. Dropping the stream unsubscribes.
pub struct ChangeStream {
    feed: ChangeFeed,
    prefix: String,
    keys: Vec<String>,
    serializer: Arc<dyn Serializer>,
}

impl ChangeStream {
    pub(crate) fn new(
        feed: ChangeFeed,
        prefix: String,
        keys: Vec<String>,
        serializer: Arc<dyn Serializer>,
    ) -> Self {
        Self {
            feed,
            prefix,
            keys,
            serializer,
        }
    }

    /// Wait for the next matching change. `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        loop {
            let raw = self.feed.recv().await?;
            if let Some(event) = self.translate(raw) {
                return Some(event);
            }
        }
    }

    /// The next matching change already queued, without waiting.
    pub fn try_recv(&mut self) -> Option<StorageEvent> {
        while let Some(raw) = self.feed.try_recv() {
            if let Some(event) = self.translate(raw) {
                return Some(event);
            }
        }
        None
    }

    /// User keys this stream is restricted to; empty means all.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    fn translate(&self, raw: ChangeEvent) -> Option<StorageEvent> {
        let key = match raw.key {
            None if self.keys.is_empty() => None,
            None => return None,
            Some(driver_key) => {
                let user_key = driver_key.strip_prefix(self.prefix.as_str())?;
                if !self.watches(user_key, &driver_key) {
                    return None;
                }
                Some(user_key.to_string())
            }
        };

        Some(StorageEvent {
            key,
            old_value: self.decode(raw.old_value.as_deref()),
            new_value: self.decode(raw.new_value.as_deref()),
        })
    }

    fn watches(&self, user_key: &str, driver_key: &str) -> bool {
        self.keys.is_empty() || self.keys.iter().any(|k| k == user_key || k == driver_key)
    }

    fn decode(&self, text: Option<&str>) -> Option<Value> {
        match self.serializer.deserialize(text) {
            Ok(item) => item.map(|item| item.value),
            Err(err) => {
                warn!(error = %err, "undecodable value in change event");
                None
            }
        }
    }
}

impl std::fmt::Debug for ChangeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeStream")
            .field("prefix", &self.prefix)
            .field("keys", &self.keys)
            .finish()
    }
}
