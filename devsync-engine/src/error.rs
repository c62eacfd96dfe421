//! Error types for the sync engine.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
///
/// Missing capabilities, unparseable phone numbers and unknown callers are
/// not errors; they surface as empty reads or skipped records.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network error talking to the contact backend.
    #[error("network error: {0}")]
    Network(String),

    /// The contact backend answered but rejected the call.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// An OS history or contacts provider failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// An OS permission query or request failed.
    #[error("permission error: {0}")]
    Permission(String),

    /// Local durable storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid engine configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A callback-based provider dropped both callbacks without answering.
    #[error("channel closed")]
    ChannelClosed,
}

impl From<rusqlite::Error> for SyncError {
    fn from(e: rusqlite::Error) -> Self {
        SyncError::Storage(e.to_string())
    }
}
