//! Error types for the sync layer.

use thiserror::Error;

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Required request keys are absent.
    #[error("missing required keys: {}", missing.join(", "))]
    Validation { missing: Vec<String> },

    /// Request keys are present but carry unusable values.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Input could not be turned into a recognizable structure.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The remote service failed after the retry budget was spent.
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote service kept answering 429.
    #[error("rate limited after {consecutive} consecutive 429 responses")]
    RateLimited { consecutive: u32 },

    /// Transport-level failure of a single request.
    #[error("network error: {0}")]
    Network(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    /// Returns true if the caller can fix the request and try again.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SyncError::Validation { .. }
                | SyncError::InvalidRequest(_)
                | SyncError::MalformedInput(_)
        )
    }
}

impl From<fieldsync_types::Error> for SyncError {
    fn from(err: fieldsync_types::Error) -> Self {
        use fieldsync_types::Error;
        match err {
            Error::Serialization(e) => SyncError::Serialization(e),
            Error::MissingKeys(missing) => SyncError::Validation { missing },
            Error::InvalidRequest(msg) => SyncError::InvalidRequest(msg),
            Error::MalformedInput(msg) => SyncError::MalformedInput(msg),
        }
    }
}
