/// Errors from encoding or decoding stored items.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The stored text is not a valid item record.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// A `date` record whose payload is not a readable timestamp.
    #[error("invalid date payload: {0}")]
    InvalidDate(String),

    /// The value could not be encoded as text.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
