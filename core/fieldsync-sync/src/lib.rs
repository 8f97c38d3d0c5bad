//! Custom field discovery and restore for fieldsync.
//!
//! # Architecture
//!
//! ## Components
//!
//! - **Matcher**: Decides which remote field names belong to a prefix group
//! - **Remote**: Abstracts the remote custom-field service (`FieldRemote`),
//!   with a REST implementation
//! - **Executor**: Retries remote calls with rate-limit and quota-aware pauses
//! - **Orchestrator**: Implements discover and restore on top of the above
//!
//! ## Flow
//!
//! 1. **Discover**: List the location's fields, keep the ones in the prefix
//!    group whose base name is a target, and capture them as a `Snapshot`
//! 2. **Restore**: Decode a stored snapshot and push every field's options
//!    back, producing one `UpdateOutcome` per field
//!
//! # Example
//!
//! ```no_run
//! use fieldsync_sync::{FieldSync, HttpFieldRemote, RemoteConfig, SyncConfig};
//! use fieldsync_types::Credentials;
//! use std::sync::Arc;
//!
//! # async fn run() -> fieldsync_sync::Result<()> {
//! let remote = HttpFieldRemote::new(RemoteConfig::default())?;
//! let sync = FieldSync::new(Arc::new(remote), SyncConfig::default());
//!
//! let credentials = Credentials::new("token", "2021-07-28");
//! let snapshot = sync
//!     .discover("Survey", &["satisfaction"], "location-id", &credentials)
//!     .await?;
//! let result = sync.restore(&snapshot, "location-id", &credentials).await;
//! assert_eq!(result.total_processed, snapshot.len());
//! # Ok(())
//! # }
//! ```

mod error;
pub mod executor;
pub mod matcher;
mod orchestrator;
pub mod remote;

pub use error::{Result, SyncError};
pub use executor::{CallFailure, CallSuccess, FailureKind, RateLimitedExecutor, RetryPolicy};
pub use matcher::NameMatcher;
pub use orchestrator::{FieldSync, SyncConfig};
pub use remote::{
    FieldRemote, HttpFieldRemote, RATE_LIMIT_REMAINING_HEADER, RawResponse, RemoteConfig,
};
