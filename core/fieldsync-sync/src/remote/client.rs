//! Remote field service abstraction.
//!
//! Defines the two calls the sync pipeline makes against the remote API and
//! the raw response shape the executor inspects.

use crate::error::Result;
use async_trait::async_trait;
use fieldsync_types::{Credentials, Field, FieldOption};
use serde_json::Value;
use std::collections::HashMap;

/// Header carrying the number of calls left before the remote throttles.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// An unprocessed HTTP response. Header names are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// Adds a header, lowercasing its name.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns true for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for HTTP 429.
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    /// Looks up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Remaining-quota value, if the header is present and numeric.
    pub fn rate_limit_remaining(&self) -> Option<u32> {
        let raw = self.header(RATE_LIMIT_REMAINING_HEADER)?.trim();
        raw.parse::<u32>().ok().or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v as u32)
        })
    }

    /// The body parsed as JSON, or the raw text when it is not JSON.
    pub fn detail(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::String(self.body.clone()))
    }
}

/// Abstract remote custom-field service.
#[async_trait]
pub trait FieldRemote: Send + Sync {
    /// Returns the name of the remote provider.
    fn provider_name(&self) -> &'static str;

    /// Lists every custom field of a location.
    ///
    /// Fails with `SyncError::RemoteUnavailable` when the listing cannot be
    /// obtained.
    async fn list_fields(
        &self,
        location_id: &str,
        credentials: &Credentials,
    ) -> Result<Vec<Field>>;

    /// Replaces the name and options of one field.
    ///
    /// Implementations make exactly one request; retrying is the caller's
    /// job.
    ///
    /// Returns the response whatever its status; only transport failures are
    /// errors.
    async fn update_field(
        &self,
        location_id: &str,
        field_id: &str,
        name: &str,
        options: &[FieldOption],
        credentials: &Credentials,
    ) -> Result<RawResponse>;
}
