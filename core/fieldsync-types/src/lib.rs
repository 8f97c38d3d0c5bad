//! Core type definitions for fieldsync.
//!
//! This crate defines the value types shared by the sync pipeline and the
//! gateway:
//! - Custom field records and the portable `Snapshot` built from them
//! - Per-field update outcomes and their `SyncResult` aggregate
//! - Inbound request payloads and their required-key validation
//! - The `normalize` routine that unwraps multiply-encoded JSON payloads
//!
//! Nothing here performs I/O.

mod field;
mod normalize;
mod outcome;
mod request;

pub use field::{Field, FieldOption, Snapshot};
pub use normalize::{MAX_UNWRAP_DEPTH, normalize};
pub use outcome::{SyncResult, UpdateOutcome};
pub use request::{Credentials, DiscoverRequest, RestoreRequest};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding or validating payloads.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),
}
