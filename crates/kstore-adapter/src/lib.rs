//! Storage adapters for kstore.
//!
//! An adapter sits between callers and a flat [driver](kstore_driver): it
//! namespaces keys with a prefix, stores typed values in a tagged envelope,
//! resolves dotted keys into nested locations, and hides expired items.
//!
//! # Design Rules
//!
//! 1. Every driver key an adapter touches starts with its prefix. Keys
//!    outside the prefix are never read, enumerated, or reported.
//! 2. An expired item is indistinguishable from an absent one, and is
//!    removed from the store the first time a read notices it.
//! 3. Nested writes are read-modify-write of the whole root item; the
//!    write's expiry applies to the root.
//! 4. Driver and codec failures surface as [`StorageError::Data`].
//!
//! # Adapters
//!
//! - [`StorageAdapter`] -- positional areas (local/session/file)
//! - [`CookieAdapter`] -- snapshot-only cookie jars

pub mod adapter;
pub mod config;
mod shared;
pub mod cookie;
pub mod error;
pub mod events;
pub mod expiry;
pub mod storage;

#[cfg(test)]
mod testing;

pub use adapter::Adapter;
pub use config::{AdapterConfig, WriteOptions, DEFAULT_KEY_PREFIX};
pub use cookie::CookieAdapter;
pub use error::{DataError, StorageError, StorageResult};
pub use events::{ChangeStream, StorageEvent};
pub use expiry::compute_expires;
pub use storage::StorageAdapter;
