//! In-memory cookie jar.
//!
//! A cookie jar has no numeric positions: the only way to enumerate it is a
//! full name -> value snapshot. Cookies carry their own attributes, and a
//! cookie whose own expiry has passed silently drops out of the jar.

use std::sync::{RwLock, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{DriverError, DriverResult};
use crate::traits::{Driver, DriverOptions};

const DEFAULT_PATH: &str = "/";

/// One cookie and its attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    fn from_options(name: &str, value: &str, options: &DriverOptions) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            path: options.path.clone().unwrap_or_else(|| DEFAULT_PATH.to_string()),
            domain: options.domain.clone(),
            secure: options.secure,
            expires: options.expires,
        }
    }

    /// Returns `true` once the cookie's own expiry has been reached.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    fn same_slot(&self, other: &Cookie) -> bool {
        self.name == other.name && self.path == other.path && self.domain == other.domain
    }
}

/// A snapshot-only cookie store.
#[derive(Debug)]
pub struct MemoryCookieJar {
    cookies: RwLock<Vec<Cookie>>,
    enabled: bool,
}

impl MemoryCookieJar {
    /// Create an empty jar.
    pub fn new() -> Self {
        Self {
            cookies: RwLock::new(Vec::new()),
            enabled: true,
        }
    }

    /// A jar on a platform where cookies are disabled.
    pub fn disabled() -> Self {
        Self {
            cookies: RwLock::new(Vec::new()),
            enabled: false,
        }
    }

    /// Every live cookie with its attributes.
    pub fn cookies(&self) -> DriverResult<Vec<Cookie>> {
        Ok(self.live()?.clone())
    }

    /// Lock the jar after dropping cookies whose own expiry has passed.
    fn live(&self) -> DriverResult<RwLockWriteGuard<'_, Vec<Cookie>>> {
        if !self.enabled {
            return Err(DriverError::Unavailable("cookie jar".to_string()));
        }
        let mut cookies = self.cookies.write().map_err(|_| DriverError::LockPoisoned)?;
        let now = Utc::now();
        let before = cookies.len();
        cookies.retain(|c| !c.is_expired_at(now));
        if cookies.len() != before {
            debug!(dropped = before - cookies.len(), "expired cookies dropped");
        }
        Ok(cookies)
    }
}

impl Default for MemoryCookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for MemoryCookieJar {
    fn is_available(&self) -> bool {
        self.enabled
    }

    /// Name -> value snapshot. When several cookies share a name (different
    /// paths or domains) the first one set wins.
    fn all(&self) -> DriverResult<Vec<(String, String)>> {
        let cookies = self.live()?;
        let mut snapshot: Vec<(String, String)> = Vec::with_capacity(cookies.len());
        for cookie in cookies.iter() {
            if !snapshot.iter().any(|(name, _)| *name == cookie.name) {
                snapshot.push((cookie.name.clone(), cookie.value.clone()));
            }
        }
        Ok(snapshot)
    }

    fn get_item(&self, key: &str) -> DriverResult<Option<String>> {
        let cookies = self.live()?;
        Ok(cookies.iter().find(|c| c.name == key).map(|c| c.value.clone()))
    }

    /// Setting a cookie whose expiry is already past removes it.
    fn set_item(&self, key: &str, value: &str, options: &DriverOptions) -> DriverResult<()> {
        let cookie = Cookie::from_options(key, value, options);
        let mut cookies = self.live()?;
        let position = cookies.iter().position(|c| c.same_slot(&cookie));

        if cookie.is_expired_at(Utc::now()) {
            if let Some(i) = position {
                cookies.remove(i);
            }
            return Ok(());
        }

        match position {
            Some(i) => cookies[i] = cookie,
            None => cookies.push(cookie),
        }
        Ok(())
    }

    /// Removes the cookie matching `key` under the given path and domain.
    fn remove_item(&self, key: &str, options: &DriverOptions) -> DriverResult<()> {
        let path = options.path.as_deref().unwrap_or(DEFAULT_PATH);
        let mut cookies = self.live()?;
        cookies.retain(|c| !(c.name == key && c.path == path && c.domain == options.domain));
        Ok(())
    }
}
