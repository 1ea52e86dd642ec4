use nrepo_resp::RespError;
use thiserror::Error;

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Fatal: the adapter could not be constructed. Raised once and the
    /// adapter is never returned in a partially usable state.
    #[error("storage initialization failed for {endpoint}: {reason}")]
    InitializationFailure { endpoint: String, reason: String },

    /// Caller error, e.g. inserting an object with an empty name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing store is unreachable or reported an error mid-call.
    /// Transient; retry policy belongs to the caller.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Stored bytes failed to decode into a valid content object.
    #[error("corrupt data under key {key}: {reason}")]
    CorruptData { key: String, reason: String },

    /// The call exceeded its configured time bound.
    #[error("storage operation timed out: {0}")]
    Timeout(String),
}

impl From<RespError> for StorageError {
    fn from(e: RespError) -> Self {
        match e {
            RespError::Timeout => Self::Timeout("store round trip exceeded its bound".into()),
            other => Self::StorageUnavailable(other.to_string()),
        }
    }
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
