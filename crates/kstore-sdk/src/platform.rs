//! The backing stores a host provides.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use kstore_driver::{AreaKind, Driver, FileStorage, IndexedDriver, MemoryCookieJar, MemoryStorage};
use tracing::debug;

use crate::error::SdkResult;

/// File holding the durable local area inside a data directory.
pub const LOCAL_STORE_FILE: &str = "local-store.json";

/// The set of backing stores available to facades.
///
/// A missing store makes the matching adapter fail with `NotSupported`.
/// Cloning shares the stores.
#[derive(Clone, Default)]
pub struct Platform {
    local: Option<Arc<dyn IndexedDriver>>,
    session: Option<Arc<dyn IndexedDriver>>,
    cookies: Option<Arc<dyn Driver>>,
}

impl Platform {
    /// A platform with no stores at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fresh in-memory local and session areas plus an empty cookie jar.
    pub fn in_memory() -> Self {
        Self::empty()
            .with_local(Arc::new(MemoryStorage::local()))
            .with_session(Arc::new(MemoryStorage::session()))
            .with_cookies(Arc::new(MemoryCookieJar::new()))
    }

    /// Like [`Platform::in_memory`], but local and session areas reject
    /// writes beyond `quota` bytes.
    pub fn in_memory_with_quota(quota: usize) -> Self {
        Self::empty()
            .with_local(Arc::new(MemoryStorage::with_quota(AreaKind::Local, quota)))
            .with_session(Arc::new(MemoryStorage::with_quota(AreaKind::Session, quota)))
            .with_cookies(Arc::new(MemoryCookieJar::new()))
    }

    /// A durable local area stored under `dir`, with in-memory session and
    /// cookie stores.
    pub fn with_data_dir(dir: impl AsRef<Path>) -> SdkResult<Self> {
        let path = dir.as_ref().join(LOCAL_STORE_FILE);
        let local = FileStorage::open(&path)?;
        debug!(path = %path.display(), "durable local store attached");
        Ok(Self::empty()
            .with_local(Arc::new(local))
            .with_session(Arc::new(MemoryStorage::session()))
            .with_cookies(Arc::new(MemoryCookieJar::new())))
    }

    pub fn with_local(mut self, driver: Arc<dyn IndexedDriver>) -> Self {
        self.local = Some(driver);
        self
    }

    pub fn with_session(mut self, driver: Arc<dyn IndexedDriver>) -> Self {
        self.session = Some(driver);
        self
    }

    pub fn with_cookies(mut self, driver: Arc<dyn Driver>) -> Self {
        self.cookies = Some(driver);
        self
    }

    pub fn local(&self) -> Option<Arc<dyn IndexedDriver>> {
        self.local.clone()
    }

    pub fn session(&self) -> Option<Arc<dyn IndexedDriver>> {
        self.session.clone()
    }

    pub fn cookies(&self) -> Option<Arc<dyn Driver>> {
        self.cookies.clone()
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("local", &self.local.is_some())
            .field("session", &self.session.is_some())
            .field("cookies", &self.cookies.is_some())
            .finish()
    }
}
