//! Adapter over cookie jars.

use std::collections::BTreeMap;
use std::sync::Arc;

use kstore_codec::Serializer;
use kstore_driver::{Driver, DriverOptions};
use kstore_types::Value;
use tracing::info;

use crate::adapter::Adapter;
use crate::config::{AdapterConfig, WriteOptions};
use crate::shared::{AdapterCore, Record};
use crate::error::{StorageError, StorageResult};
use crate::events::ChangeStream;

const NAME: &str = "cookie adapter";

/// Adapter for stores that can only be enumerated as a full snapshot.
///
/// Positions run over the snapshot in reverse, so `index(0)` is the most
/// recently created cookie. `clear` removes only this adapter's cookies
/// (at the default path), one by one. Cookies never deliver change events.
pub struct CookieAdapter<D> {
    core: AdapterCore<D>,
}

impl<D: Driver> CookieAdapter<D> {
    pub fn new(driver: D) -> StorageResult<Self> {
        Self::with_config(driver, AdapterConfig::default())
    }

    /// Fails with `NotSupported` when the platform has cookies disabled.
    pub fn with_config(driver: D, config: AdapterConfig) -> StorageResult<Self> {
        Ok(Self {
            core: AdapterCore::new(driver, config, NAME)?,
        })
    }

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

    fn snapshot(&self) -> StorageResult<Vec<Record>> {
        Ok(self
            .core
            .driver()
            .all()?
            .into_iter()
            .filter(|(key, _)| self.core.is_owned_key(key))
            .map(|(key, value)| (key, Some(value)))
            .collect())
    }
}

impl<D: Driver> Adapter for CookieAdapter<D> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn config(&self) -> &AdapterConfig {
        self.core.config()
    }

    fn supports_events(&self) -> bool {
        false
    }

    fn all(&self) -> StorageResult<Vec<(String, Value)>> {
        self.core.collect_live(self.snapshot()?)
    }

    /// Looks the root up in the snapshot rather than by name.
    fn has(&self, key: &str) -> StorageResult<bool> {
        self.core.has_with(key, |driver_key| {
            Ok(self
                .core
                .driver()
                .all()?
                .into_iter()
                .find(|(name, _)| name == driver_key)
                .map(|(_, value)| value))
        })
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
        let records = self.snapshot()?;
        let count = records.len();
        for (driver_key, _) in records {
            self.core.driver().remove_item(&driver_key, &DriverOptions::default())?;
        }
        info!(adapter = NAME, count, "cookies cleared");
        Ok(true)
    }

    fn index(&self, index: usize, default: Value) -> StorageResult<Value> {
        Ok(self
            .all()?
            .into_iter()
            .rev()
            .nth(index)
            .map(|(_, value)| value)
            .unwrap_or(default))
    }

    fn delete_expired(&self) -> StorageResult<usize> {
        self.core.purge(self.snapshot()?)
    }

    fn listen(&self, _keys: &[String]) -> StorageResult<ChangeStream> {
        Err(StorageError::NotSupported(format!("change events on a {NAME}")))
    }
}

impl<D: Driver> std::fmt::Debug for CookieAdapter<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieAdapter")
            .field("config", self.core.config())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        assert_prefixed_lookups, assert_seeded_reads, assert_seeded_writes, birthday, key6, live_items, seed,
    };
    use kstore_driver::MemoryCookieJar;

    fn seeded() -> CookieAdapter<MemoryCookieJar> {
        let adapter = CookieAdapter::new(MemoryCookieJar::new()).unwrap();
        seed(&adapter);
        adapter
    }

    // ---- Reference scenario ----

    #[test]
    fn all_lists_live_cookies() {
        assert_eq!(seeded().all().unwrap(), live_items());
    }

    #[test]
    fn seeded_reads() {
        assert_seeded_reads(&seeded());
    }

    #[test]
    fn seeded_writes() {
        assert_seeded_writes(&seeded());
    }

    #[test]
    fn get_multiple_keys_results_by_user_key() {
        assert_prefixed_lookups(&seeded());
    }

    #[test]
    fn index_runs_newest_first() {
        let adapter = seeded();
        assert_eq!(adapter.index(0, Value::Null).unwrap(), key6());
        assert_eq!(adapter.index(1, Value::Null).unwrap(), Value::Date(birthday()));
        assert_eq!(adapter.index(2, Value::Null).unwrap(), Value::from("Value 3"));
        assert_eq!(adapter.index(3, Value::Null).unwrap(), Value::from(2));
        assert_eq!(adapter.index(4, Value::Null).unwrap(), Value::Null);
        assert_eq!(
            adapter.index(5, Value::from("Default Value")).unwrap(),
            Value::from("Default Value")
        );
    }

    // ---- Cookie specifics ----

    #[test]
    fn expired_writes_never_reach_the_jar() {
        let adapter = seeded();
        let names: Vec<String> = adapter
            .driver()
            .cookies()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert!(!names.contains(&"kerneljs|key5".to_string()));
        assert!(!names.contains(&"kerneljs|key7".to_string()));
        assert_eq!(adapter.delete_expired().unwrap(), 0);
    }

    #[test]
    fn clear_keeps_foreign_cookies() {
        let jar = Arc::new(MemoryCookieJar::new());
        jar.set_item("session_id", "abc", &DriverOptions::default()).unwrap();
        let adapter = CookieAdapter::new(Arc::clone(&jar)).unwrap();
        adapter.set("k", Value::from(1), &WriteOptions::new()).unwrap();

        assert!(adapter.clear().unwrap());
        assert!(adapter.is_empty().unwrap());
        assert_eq!(jar.get_item("session_id").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn write_options_become_cookie_attributes() {
        let adapter = CookieAdapter::new(MemoryCookieJar::new()).unwrap();
        let options = WriteOptions::expiring(60).with_path("/app").with_domain("example.org").secure();
        adapter.set("k", Value::from(1), &options).unwrap();

        let cookie = adapter.driver().cookies().unwrap().remove(0);
        assert_eq!(cookie.name, "kerneljs|k");
        assert_eq!(cookie.path, "/app");
        assert_eq!(cookie.domain.as_deref(), Some("example.org"));
        assert!(cookie.secure);
        assert!(cookie.expires.is_some());

        // Removal has to name the same path and domain.
        adapter.delete("k", &WriteOptions::new()).unwrap();
        assert!(adapter.has("k").unwrap());
        adapter
            .delete("k", &WriteOptions::new().with_path("/app").with_domain("example.org"))
            .unwrap();
        assert!(!adapter.has("k").unwrap());
    }

    #[test]
    fn cookies_have_no_events() {
        let adapter = CookieAdapter::new(MemoryCookieJar::new()).unwrap();
        assert!(!adapter.supports_events());
        assert!(matches!(adapter.listen(&[]), Err(StorageError::NotSupported(_))));
    }

    #[test]
    fn disabled_jar_is_not_supported() {
        let err = CookieAdapter::new(MemoryCookieJar::disabled()).unwrap_err();
        assert!(matches!(err, StorageError::NotSupported(_)));
    }
}
