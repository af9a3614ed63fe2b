//! Durable, file-backed key-value area.
//!
//! The whole area is kept in memory and rewritten to disk after every
//! mutation. Writes go to a temporary file in the same directory which is
//! then renamed over the target, so a crash never leaves a half-written
//! file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{DriverError, DriverResult};
use crate::traits::{Driver, DriverOptions, IndexedDriver};

#[derive(Serialize, Deserialize)]
struct Record {
    key: String,
    value: String,
}

/// A key-value area persisted as a JSON file.
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<Vec<(String, String)>>,
}

impl FileStorage {
    /// Open the area stored at `path`, creating parent directories as
    /// needed. A missing file is an empty area.
    pub fn open(path: impl AsRef<Path>) -> DriverResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let entries = if path.exists() {
            let text = fs::read_to_string(&path)?;
            let records: Vec<Record> = serde_json::from_str(&text)
                .map_err(|e| DriverError::Serialization(e.to_string()))?;
            records.into_iter().map(|r| (r.key, r.value)).collect()
        } else {
            Vec::new()
        };

        debug!(path = %path.display(), entries = entries.len(), "storage file opened");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &[(String, String)]) -> DriverResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let records: Vec<Record> = entries
            .iter()
            .map(|(key, value)| Record {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        let text = serde_json::to_string_pretty(&records)
            .map_err(|e| DriverError::Serialization(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| DriverError::Io(e.error))?;

        debug!(path = %self.path.display(), entries = entries.len(), "storage file persisted");
        Ok(())
    }

    /// Apply `change` to a copy of the entries, persist it, then commit it
    /// in memory. A failed write leaves both copies untouched.
    fn mutate<F>(&self, change: F) -> DriverResult<()>
    where
        F: FnOnce(&mut Vec<(String, String)>) -> bool,
    {
        let mut entries = self.entries.write().map_err(|_| DriverError::LockPoisoned)?;
        let mut next = entries.clone();
        if change(&mut next) {
            self.persist(&next)?;
            *entries = next;
        }
        Ok(())
    }
}

impl Driver for FileStorage {
    fn all(&self) -> DriverResult<Vec<(String, String)>> {
        let entries = self.entries.read().map_err(|_| DriverError::LockPoisoned)?;
        Ok(entries.clone())
    }

    fn get_item(&self, key: &str) -> DriverResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| DriverError::LockPoisoned)?;
        Ok(entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()))
    }

    fn set_item(&self, key: &str, value: &str, _options: &DriverOptions) -> DriverResult<()> {
        self.mutate(|entries| {
            match entries.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = value.to_string(),
                None => entries.push((key.to_string(), value.to_string())),
            }
            true
        })
    }

    fn remove_item(&self, key: &str, _options: &DriverOptions) -> DriverResult<()> {
        self.mutate(|entries| {
            let before = entries.len();
            entries.retain(|(k, _)| k != key);
            entries.len() != before
        })
    }
}

impl IndexedDriver for FileStorage {
    fn len(&self) -> DriverResult<usize> {
        let entries = self.entries.read().map_err(|_| DriverError::LockPoisoned)?;
        Ok(entries.len())
    }

    fn key(&self, index: usize) -> DriverResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| DriverError::LockPoisoned)?;
        Ok(entries.get(index).map(|(k, _)| k.clone()))
    }

    fn clear(&self) -> DriverResult<()> {
        self.mutate(|entries| {
            let had_entries = !entries.is_empty();
            entries.clear();
            had_entries
        })
    }
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .finish()
    }
}
