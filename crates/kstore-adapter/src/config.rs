//! Adapter configuration and per-write options.

use chrono::{DateTime, Utc};
use kstore_driver::DriverOptions;
use kstore_types::Expires;
use serde::{Deserialize, Serialize};

/// Prefix applied to every key when none is configured.
pub const DEFAULT_KEY_PREFIX: &str = "kerneljs|";

/// Settings shared by every adapter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Namespace prepended to every key in the backing store. May be empty.
    pub key_prefix: String,
    /// Accepted for forward compatibility; values are stored in clear text.
    pub encryption_key: Option<String>,
    /// Accepted for forward compatibility; see `encryption_key`.
    pub encryption_method: Option<String>,
}

impl AdapterConfig {
    /// Configuration with a custom prefix and no encryption settings.
    pub fn with_prefix(key_prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            ..Self::default()
        }
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            encryption_key: None,
            encryption_method: None,
        }
    }
}

/// Options accepted by `set` and `delete`.
///
/// `expires` drives item expiry; `path`, `domain`, and `secure` are only
/// meaningful to cookie stores and are ignored elsewhere.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteOptions {
    pub expires: Option<Expires>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
}

impl WriteOptions {
    /// No expiry, no cookie attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options expiring at the given point: a date, a number of minutes
    /// from the write, or a parseable date string.
    pub fn expiring(expires: impl Into<Expires>) -> Self {
        Self {
            expires: Some(expires.into()),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    /// Attributes forwarded to the driver alongside a resolved expiry.
    pub(crate) fn driver_options(&self, expires: Option<DateTime<Utc>>) -> DriverOptions {
        DriverOptions {
            expires,
            path: self.path.clone(),
            domain: self.domain.clone(),
            secure: self.secure,
        }
    }
}
