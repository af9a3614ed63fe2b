use std::fs;
use std::path::{Path, PathBuf};

use kstore_adapter::{AdapterConfig, DEFAULT_KEY_PREFIX};
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};
use crate::kind::AdapterKind;
use crate::platform::Platform;

/// Facade configuration, typically read from a TOML file:
///
/// ```toml
/// adapter = "session-store"
/// key_prefix = "myapp|"
/// watch_keys = ["user", "settings"]
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub adapter: AdapterKind,
    pub key_prefix: String,
    /// Declared but inert: values are always stored in clear text.
    pub encrypted: bool,
    /// Keys a change callback is restricted to. Empty means all.
    pub watch_keys: Vec<String>,
    /// Directory holding the durable local store. Without one, every store
    /// lives in memory.
    pub data_dir: Option<PathBuf>,
    /// Byte quota for in-memory local and session areas.
    pub quota: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            adapter: AdapterKind::default(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            encrypted: false,
            watch_keys: Vec::new(),
            data_dir: None,
            quota: None,
        }
    }
}

impl StorageConfig {
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string(self).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Adapter-level settings derived from this configuration.
    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig::with_prefix(self.key_prefix.clone())
    }

    /// Stores described by this configuration.
    pub fn platform(&self) -> SdkResult<Platform> {
        match (&self.data_dir, self.quota) {
            (Some(dir), _) => Platform::with_data_dir(dir),
            (None, Some(quota)) => Ok(Platform::in_memory_with_quota(quota)),
            (None, None) => Ok(Platform::in_memory()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StorageConfig::default();
        assert_eq!(c.adapter, AdapterKind::LocalStore);
        assert_eq!(c.key_prefix, "kerneljs|");
        assert!(!c.encrypted);
        assert!(c.watch_keys.is_empty());
        assert!(c.data_dir.is_none());
    }

    #[test]
    fn parses_partial_toml() {
        let c = StorageConfig::from_toml_str(
            r#"
            adapter = "cookie"
            watch_keys = ["user"]
            "#,
        )
        .unwrap();
        assert_eq!(c.adapter, AdapterKind::Cookie);
        assert_eq!(c.watch_keys, vec!["user".to_string()]);
        assert_eq!(c.key_prefix, DEFAULT_KEY_PREFIX);
    }

    #[test]
    fn unknown_adapter_is_config_error() {
        let err = StorageConfig::from_toml_str(r#"adapter = "indexed-db""#).unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn toml_round_trip() {
        let c = StorageConfig {
            adapter: AdapterKind::SessionStore,
            key_prefix: "app|".into(),
            quota: Some(4096),
            ..StorageConfig::default()
        };
        let text = c.to_toml_string().unwrap();
        assert_eq!(StorageConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kstore.toml");
        fs::write(&path, "key_prefix = \"x|\"\nencrypted = true\n").unwrap();

        let c = StorageConfig::load(&path).unwrap();
        assert_eq!(c.key_prefix, "x|");
        assert!(c.encrypted);
        assert_eq!(c.adapter_config().key_prefix, "x|");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StorageConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, SdkError::Io(_)));
    }
}
