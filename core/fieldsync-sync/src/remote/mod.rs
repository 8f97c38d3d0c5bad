//! Remote custom-field service.
//!
//! `FieldRemote` is the contract the orchestrator depends on;
//! `HttpFieldRemote` implements it over the account-scoped REST API.

pub mod client;
pub mod http;

pub use client::{FieldRemote, RATE_LIMIT_REMAINING_HEADER, RawResponse};
pub use http::{HttpFieldRemote, RemoteConfig};
