//! High-level kstore API.
//!
//! [`Storage`] is the entry point for applications: it selects one adapter
//! over one of the platform's backing stores and forwards every call to it.
//!
//! ```
//! use kstore_sdk::{Platform, Storage, Value};
//!
//! let storage = Storage::local(&Platform::in_memory()).unwrap();
//! storage.set("user.name", "ada").unwrap();
//! assert_eq!(storage.get("user.name").unwrap(), Value::from("ada"));
//! ```

pub mod config;
pub mod error;
pub mod kind;
pub mod platform;
pub mod registry;
pub mod storage;

pub use config::StorageConfig;
pub use error::{SdkError, SdkResult};
pub use kind::{AdapterKind, AdapterSelector};
pub use platform::Platform;
pub use registry::create_adapter;
pub use storage::{Storage, Subscription};

// Re-export key types
pub use kstore_adapter::{
    Adapter, AdapterConfig, ChangeStream, StorageError, StorageEvent, WriteOptions,
};
pub use kstore_types::{Expires, Value};
