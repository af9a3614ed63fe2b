//! In-memory key-value areas.
//!
//! [`MemoryStorage`] models a local or session storage area: an
//! insertion-ordered list of string entries that several handles can share.
//! Each handle is its own context for change notification.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::{DriverError, DriverResult};
use crate::events::{ChangeEvent, ChangeFeed, ContextId};
use crate::traits::{Driver, DriverOptions, IndexedDriver};

/// Capacity of the per-area change channel.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Which kind of area a [`MemoryStorage`] models.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AreaKind {
    /// Survives for as long as the area is held.
    Local,
    /// Scoped to one session.
    Session,
}

impl fmt::Display for AreaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local storage"),
            Self::Session => f.write_str("session storage"),
        }
    }
}

struct Area {
    kind: AreaKind,
    entries: RwLock<Vec<(String, String)>>,
    quota: Option<usize>,
    events: broadcast::Sender<ChangeEvent>,
}

/// A handle onto a shared in-memory area.
pub struct MemoryStorage {
    area: Arc<Area>,
    context: ContextId,
    enabled: bool,
}

impl MemoryStorage {
    /// Create a fresh area of the given kind.
    pub fn new(kind: AreaKind) -> Self {
        Self::build(kind, None, true)
    }

    /// Create a fresh local area.
    pub fn local() -> Self {
        Self::new(AreaKind::Local)
    }

    /// Create a fresh session area.
    pub fn session() -> Self {
        Self::new(AreaKind::Session)
    }

    /// Create a fresh area that rejects writes beyond `quota` bytes
    /// (keys plus values).
    pub fn with_quota(kind: AreaKind, quota: usize) -> Self {
        Self::build(kind, Some(quota), true)
    }

    /// A handle whose platform does not provide the area at all, as with
    /// storage disabled by browser policy.
    pub fn disabled(kind: AreaKind) -> Self {
        Self::build(kind, None, false)
    }

    fn build(kind: AreaKind, quota: Option<usize>, enabled: bool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            area: Arc::new(Area {
                kind,
                entries: RwLock::new(Vec::new()),
                quota,
                events,
            }),
            context: ContextId::next(),
            enabled,
        }
    }

    /// Open another context onto the same area.
    ///
    /// Writes through the new handle are announced to this one and vice
    /// versa.
    pub fn open_context(&self) -> Self {
        Self {
            area: Arc::clone(&self.area),
            context: ContextId::next(),
            enabled: self.enabled,
        }
    }

    /// The kind of area this handle points at.
    pub fn kind(&self) -> AreaKind {
        self.area.kind
    }

    /// This handle's context id.
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> DriverResult<usize> {
        Ok(usage(&self.read()?))
    }

    fn ensure_enabled(&self) -> DriverResult<()> {
        if self.enabled {
            Ok(())
        } else {
            Err(DriverError::Unavailable(self.area.kind.to_string()))
        }
    }

    fn read(&self) -> DriverResult<RwLockReadGuard<'_, Vec<(String, String)>>> {
        self.ensure_enabled()?;
        self.area.entries.read().map_err(|_| DriverError::LockPoisoned)
    }

    fn write(&self) -> DriverResult<RwLockWriteGuard<'_, Vec<(String, String)>>> {
        self.ensure_enabled()?;
        self.area.entries.write().map_err(|_| DriverError::LockPoisoned)
    }

    fn announce(&self, key: Option<&str>, old_value: Option<String>, new_value: Option<String>) {
        // No receivers is fine: nobody is listening yet.
        let _ = self.area.events.send(ChangeEvent {
            origin: self.context,
            key: key.map(str::to_string),
            old_value,
            new_value,
        });
    }
}

fn usage(entries: &[(String, String)]) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

impl Driver for MemoryStorage {
    fn is_available(&self) -> bool {
        self.enabled
    }

    fn all(&self) -> DriverResult<Vec<(String, String)>> {
        Ok(self.read()?.clone())
    }

    fn get_item(&self, key: &str) -> DriverResult<Option<String>> {
        let entries = self.read()?;
        Ok(entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()))
    }

    fn set_item(&self, key: &str, value: &str, _options: &DriverOptions) -> DriverResult<()> {
        let mut entries = self.write()?;
        let position = entries.iter().position(|(k, _)| k == key);

        if let Some(quota) = self.area.quota {
            let replaced = position.map_or(0, |i| entries[i].0.len() + entries[i].1.len());
            let needed = usage(&entries) - replaced + key.len() + value.len();
            if needed > quota {
                warn!(kind = %self.area.kind, key, needed, quota, "write rejected by quota");
                return Err(DriverError::QuotaExceeded { needed, quota });
            }
        }

        let old_value = match position {
            Some(i) => Some(std::mem::replace(&mut entries[i].1, value.to_string())),
            None => {
                entries.push((key.to_string(), value.to_string()));
                None
            }
        };
        drop(entries);

        if old_value.as_deref() != Some(value) {
            self.announce(Some(key), old_value, Some(value.to_string()));
        }
        Ok(())
    }

    fn remove_item(&self, key: &str, _options: &DriverOptions) -> DriverResult<()> {
        let mut entries = self.write()?;
        let removed = entries
            .iter()
            .position(|(k, _)| k == key)
            .map(|i| entries.remove(i).1);
        drop(entries);

        if removed.is_some() {
            self.announce(Some(key), removed, None);
        }
        Ok(())
    }

    fn supports_events(&self) -> bool {
        true
    }

    fn subscribe(&self) -> Option<ChangeFeed> {
        Some(ChangeFeed::new(self.area.events.subscribe(), self.context))
    }
}

impl IndexedDriver for MemoryStorage {
    fn len(&self) -> DriverResult<usize> {
        Ok(self.read()?.len())
    }

    fn key(&self, index: usize) -> DriverResult<Option<String>> {
        Ok(self.read()?.get(index).map(|(k, _)| k.clone()))
    }

    fn clear(&self) -> DriverResult<()> {
        let mut entries = self.write()?;
        let count = entries.len();
        entries.clear();
        drop(entries);

        if count > 0 {
            debug!(kind = %self.area.kind, count, "area cleared");
            self.announce(None, None, None);
        }
        Ok(())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.area.entries.read().map(|e| e.len()).unwrap_or(0);
        f.debug_struct("MemoryStorage")
            .field("kind", &self.area.kind)
            .field("context", &self.context)
            .field("entry_count", &count)
            .field("enabled", &self.enabled)
            .finish()
    }
}
