use std::io;

/// Errors raised by a backing-store driver.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The backing store is not available on this platform.
    #[error("{0} is not available")]
    Unavailable(String),

    /// A write would push the store past its size limit.
    #[error("quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// I/O error from a file-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The persisted store file could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
