//! Typed serialization for kstore.
//!
//! Backing stores only carry text, so every value is wrapped in a JSON
//! envelope that records its kind next to a text-safe payload. Decoding
//! reads the tag and restores the kind.
//!
//! Two kinds are deliberately lossy: regex flags are dropped, and function
//! source stays inert text after a round-trip.

pub mod error;
pub mod serializer;

pub use error::{CodecError, CodecResult};
pub use serializer::{Serializer, TypedSerializer};
