use kstore_codec::CodecError;
use kstore_driver::DriverError;

/// Any failure inside a read, write, or enumeration.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The backing store failed.
    #[error("driver failure: {0}")]
    Driver(#[from] DriverError),

    /// A stored record could not be encoded or decoded.
    #[error("codec failure: {0}")]
    Codec(#[from] CodecError),
}

/// Errors surfaced by storage adapters.
///
/// Missing keys and expired items are not errors: they resolve to the
/// caller's default value.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A data operation failed; the cause is wrapped.
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// The platform or adapter lacks a required capability.
    #[error("{0} not supported")]
    NotSupported(String),
}

impl From<DriverError> for StorageError {
    fn from(err: DriverError) -> Self {
        Self::Data(DataError::Driver(err))
    }
}

impl From<CodecError> for StorageError {
    fn from(err: CodecError) -> Self {
        Self::Data(DataError::Codec(err))
    }
}

/// Result alias for adapter operations.
pub type StorageResult<T> = Result<T, StorageError>;
