//! Adapter selection.

use std::fmt;
use std::str::FromStr;

use kstore_adapter::Adapter;
use serde::{Deserialize, Serialize};

use crate::error::SdkError;

/// The built-in adapters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdapterKind {
    /// Durable local storage.
    #[default]
    LocalStore,
    /// Session-scoped storage.
    SessionStore,
    /// The cookie jar.
    Cookie,
}

impl AdapterKind {
    pub const ALL: [AdapterKind; 3] = [Self::LocalStore, Self::SessionStore, Self::Cookie];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalStore => "local-store",
            Self::SessionStore => "session-store",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdapterKind {
    type Err = SdkError;

    /// Accepts the kebab-case names plus the class-style names
    /// (`LocalStorageAdapter`, `SessionStorageAdapter`, `CookieAdapter`).
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "local-store" | "local" | "LocalStorageAdapter" => Ok(Self::LocalStore),
            "session-store" | "session" | "SessionStorageAdapter" => Ok(Self::SessionStore),
            "cookie" | "cookies" | "CookieAdapter" => Ok(Self::Cookie),
            other => Err(SdkError::InvalidAdapter(format!(
                "unknown adapter `{other}`, expected one of local-store, session-store, cookie"
            ))),
        }
    }
}

/// What a [`Storage`](crate::Storage) should run on.
pub enum AdapterSelector {
    /// A built-in adapter over the platform's store.
    Kind(AdapterKind),
    /// A built-in adapter looked up by name.
    Named(String),
    /// A caller-constructed adapter.
    Custom(Box<dyn Adapter>),
}

impl From<AdapterKind> for AdapterSelector {
    fn from(kind: AdapterKind) -> Self {
        Self::Kind(kind)
    }
}

impl From<&str> for AdapterSelector {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for AdapterSelector {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Box<dyn Adapter>> for AdapterSelector {
    fn from(adapter: Box<dyn Adapter>) -> Self {
        Self::Custom(adapter)
    }
}

impl fmt::Debug for AdapterSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => f.debug_tuple("Kind").field(kind).finish(),
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Custom(adapter) => f.debug_tuple("Custom").field(&adapter.name()).finish(),
        }
    }
}
