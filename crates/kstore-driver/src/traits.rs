use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::DriverResult;
use crate::events::ChangeFeed;

/// Write/remove attributes forwarded to the backing store.
///
/// Key-value areas ignore them; cookie jars use them as cookie attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DriverOptions {
    /// Store-level expiry, when the store has its own notion of one.
    pub expires: Option<DateTime<Utc>>,
    /// Cookie path. Defaults to `/` in cookie jars.
    pub path: Option<String>,
    /// Cookie domain.
    pub domain: Option<String>,
    /// Restrict the cookie to secure transports.
    pub secure: bool,
}

/// A flat, string-keyed backing store.
///
/// Drivers know nothing about prefixes, typing, nesting, or expiration;
/// those live in the adapter layer.
pub trait Driver: Send + Sync {
    /// Whether the platform actually provides this store.
    fn is_available(&self) -> bool {
        true
    }

    /// Snapshot of every entry, in the store's enumeration order.
    fn all(&self) -> DriverResult<Vec<(String, String)>>;

    /// Read one entry. `Ok(None)` if absent.
    fn get_item(&self, key: &str) -> DriverResult<Option<String>>;

    /// Create or overwrite one entry.
    fn set_item(&self, key: &str, value: &str, options: &DriverOptions) -> DriverResult<()>;

    /// Remove one entry. Removing an absent key is not an error.
    fn remove_item(&self, key: &str, options: &DriverOptions) -> DriverResult<()>;

    /// Whether [`Driver::subscribe`] can deliver cross-context changes.
    fn supports_events(&self) -> bool {
        false
    }

    /// Subscribe to changes made by other contexts sharing this store.
    fn subscribe(&self) -> Option<ChangeFeed> {
        None
    }
}

/// A driver that can also be walked by numeric position and wiped.
pub trait IndexedDriver: Driver {
    /// Number of entries.
    fn len(&self) -> DriverResult<usize>;

    /// Returns `true` if the store holds no entries.
    fn is_empty(&self) -> DriverResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Key at position `index`, or `None` past the end.
    fn key(&self, index: usize) -> DriverResult<Option<String>>;

    /// Remove every entry, including ones written by other libraries.
    fn clear(&self) -> DriverResult<()>;
}

impl<T: Driver + ?Sized> Driver for Arc<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn all(&self) -> DriverResult<Vec<(String, String)>> {
        (**self).all()
    }

    fn get_item(&self, key: &str) -> DriverResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str, options: &DriverOptions) -> DriverResult<()> {
        (**self).set_item(key, value, options)
    }

    fn remove_item(&self, key: &str, options: &DriverOptions) -> DriverResult<()> {
        (**self).remove_item(key, options)
    }

    fn supports_events(&self) -> bool {
        (**self).supports_events()
    }

    fn subscribe(&self) -> Option<ChangeFeed> {
        (**self).subscribe()
    }
}

impl<T: IndexedDriver + ?Sized> IndexedDriver for Arc<T> {
    fn len(&self) -> DriverResult<usize> {
        (**self).len()
    }

    fn key(&self, index: usize) -> DriverResult<Option<String>> {
        (**self).key(index)
    }

    fn clear(&self) -> DriverResult<()> {
        (**self).clear()
    }
}
