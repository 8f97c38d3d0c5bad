//! Inbound request payloads.
//!
//! Both payloads are validated in two steps: every required key must be
//! present (reported together as [`Error::MissingKeys`]), then the values are
//! deserialized into typed fields.

use crate::field::{Snapshot, kind_of};
use crate::normalize::normalize;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque credentials forwarded to every remote call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Bearer token.
    pub access_token: String,
    /// Value of the remote API `Version` header.
    pub version: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            version: version.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("version", &self.version)
            .finish()
    }
}

/// Request to snapshot the remote fields matching a name list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverRequest {
    pub prefix: String,
    pub field_names: Vec<String>,
    #[serde(rename = "locationId")]
    pub location_id: String,
    #[serde(flatten)]
    pub credentials: Credentials,
}

impl DiscoverRequest {
    pub const REQUIRED_KEYS: [&'static str; 5] =
        ["prefix", "field_names", "locationId", "access_token", "version"];

    /// Validates and decodes a discover payload.
    ///
    /// `field_names` may arrive as an encoded JSON array or as a
    /// comma-separated string.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut map = require_keys(value, &Self::REQUIRED_KEYS)?;

        if let Some(Value::String(raw)) = map.get("field_names") {
            let names = match normalize(raw)? {
                Value::String(list) => Value::Array(
                    list.split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(|name| Value::String(name.to_string()))
                        .collect(),
                ),
                decoded => decoded,
            };
            map.insert("field_names".to_string(), names);
        }

        serde_json::from_value(Value::Object(map))
            .map_err(|e| Error::InvalidRequest(e.to_string()))
    }
}

/// Request to push a previously captured snapshot back to the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreRequest {
    #[serde(rename = "locationId")]
    pub location_id: String,
    #[serde(flatten)]
    pub credentials: Credentials,
    /// Snapshot, usually as a (possibly multi-escaped) JSON string.
    pub restore_fields: Value,
}

impl RestoreRequest {
    pub const REQUIRED_KEYS: [&'static str; 4] =
        ["version", "locationId", "access_token", "restore_fields"];

    /// Validates and decodes a restore payload. The snapshot itself is
    /// decoded lazily by [`RestoreRequest::snapshot`].
    pub fn from_value(value: Value) -> Result<Self> {
        let map = require_keys(value, &Self::REQUIRED_KEYS)?;
        serde_json::from_value(Value::Object(map))
            .map_err(|e| Error::InvalidRequest(e.to_string()))
    }

    /// Decodes the carried snapshot.
    pub fn snapshot(&self) -> Result<Snapshot> {
        match &self.restore_fields {
            Value::String(raw) => Snapshot::from_encoded(raw),
            other => Snapshot::from_value(other.clone()),
        }
    }
}

fn require_keys(value: Value, keys: &[&str]) -> Result<Map<String, Value>> {
    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(Error::InvalidRequest(format!(
                "request body must be a JSON object, got {}",
                kind_of(&other)
            )));
        }
    };

    let missing: Vec<String> = keys
        .iter()
        .filter(|key| !map.contains_key(**key))
        .map(|key| (*key).to_string())
        .collect();

    if missing.is_empty() {
        Ok(map)
    } else {
        Err(Error::MissingKeys(missing))
    }
}
