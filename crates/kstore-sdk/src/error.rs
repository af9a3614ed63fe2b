use kstore_adapter::StorageError;
use kstore_driver::DriverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid adapter: {0}")]
    InvalidAdapter(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DriverError> for SdkError {
    fn from(err: DriverError) -> Self {
        Self::Storage(StorageError::from(err))
    }
}

impl SdkError {
    /// Shorthand for a missing platform capability.
    pub(crate) fn not_supported(what: impl Into<String>) -> Self {
        Self::Storage(StorageError::NotSupported(what.into()))
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
