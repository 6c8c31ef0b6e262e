use gatepass_types::TicketGroupId;

/// Errors from redemption store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record's own ticket group differs from the group it was appended to.
    #[error("record for group {actual} appended under group {expected}")]
    GroupMismatch {
        expected: TicketGroupId,
        actual: TicketGroupId,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store has been closed and accepts no further operations.
    #[error("store is closed")]
    Closed,

    /// The backend cannot serve the request right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
