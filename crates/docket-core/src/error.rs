use uuid::Uuid;

/// Low-level store adapter errors (backend round-trips, serialization,
/// constraint violations). This is the error type for the `StoreAdapter`
/// trait — adapter operations can only fail with infrastructure errors,
/// never domain errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unique constraint violation: {0}")]
    Constraint(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Queue-level errors for the message lifecycle protocol.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The token does not name a live lease: it expired, was never issued,
    /// or the message was already acknowledged. The caller must re-claim.
    #[error("unknown lease: {0}")]
    UnknownLease(Uuid),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
pub type Result<T> = std::result::Result<T, QueueError>;
