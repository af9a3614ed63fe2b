//! Backing-store drivers for kstore.
//!
//! A driver is the thinnest possible wrapper around a concrete store: flat
//! string keys, string values, no typing, no prefixes, no expiration.
//!
//! # Driver Shapes
//!
//! - [`Driver`] -- get/set/remove plus a full snapshot. Cookie jars only
//!   offer this shape.
//! - [`IndexedDriver`] -- additionally walkable by position (`len`/`key(i)`)
//!   and wipeable with `clear`.
//!
//! # Implementations
//!
//! - [`MemoryStorage`] -- shared in-memory local/session areas with
//!   cross-context change events
//! - [`FileStorage`] -- durable JSON-file area
//! - [`MemoryCookieJar`] -- snapshot-only cookie store with attributes

pub mod cookie;
pub mod error;
pub mod events;
pub mod file;
pub mod memory;
pub mod traits;

pub use cookie::{Cookie, MemoryCookieJar};
pub use error::{DriverError, DriverResult};
pub use events::{ChangeEvent, ChangeFeed, ContextId};
pub use file::FileStorage;
pub use memory::{AreaKind, MemoryStorage};
pub use traits::{Driver, DriverOptions, IndexedDriver};
