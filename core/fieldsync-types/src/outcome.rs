//! Per-field update outcomes and their aggregate.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Terminal result of pushing one field's options to the remote service.
///
/// Created once by the executor (or by the orchestrator for skipped fields)
/// and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    #[serde(rename = "id")]
    pub field_id: String,
    #[serde(rename = "name")]
    pub field_name: String,
    pub success: bool,
    /// Status of the last response received, if any.
    #[serde(rename = "statusCode", default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Short description of the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Last response body, parsed as JSON when possible.
    #[serde(rename = "errorDetail", default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<Value>,
    /// Remaining-quota value observed on the last response.
    #[serde(rename = "rateLimitRemaining", default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_remaining: Option<u32>,
    /// Number of remote calls made for this field.
    #[serde(default)]
    pub attempts: u32,
}

impl UpdateOutcome {
    /// A successful update.
    pub fn succeeded(
        field_id: impl Into<String>,
        field_name: impl Into<String>,
        http_status: u16,
        rate_limit_remaining: Option<u32>,
        attempts: u32,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            field_name: field_name.into(),
            success: true,
            http_status: Some(http_status),
            error: None,
            error_detail: None,
            rate_limit_remaining,
            attempts,
        }
    }

    /// A failed update after at least one remote call.
    pub fn failed(
        field_id: impl Into<String>,
        field_name: impl Into<String>,
        error: impl Into<String>,
        http_status: Option<u16>,
        error_detail: Option<Value>,
        rate_limit_remaining: Option<u32>,
        attempts: u32,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            field_name: field_name.into(),
            success: false,
            http_status,
            error: Some(error.into()),
            error_detail,
            rate_limit_remaining,
            attempts,
        }
    }

    /// A field that was never sent because it is incomplete.
    pub fn skipped(
        field_id: impl Into<String>,
        field_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            field_name: field_name.into(),
            success: false,
            http_status: None,
            error: Some(reason.into()),
            error_detail: None,
            rate_limit_remaining: None,
            attempts: 0,
        }
    }
}

/// Aggregate of one restore run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    #[serde(rename = "results")]
    pub outcomes: Vec<UpdateOutcome>,
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
}

impl SyncResult {
    /// Builds the aggregate, deriving the counters from `outcomes`.
    pub fn from_outcomes(outcomes: Vec<UpdateOutcome>) -> Self {
        let successful = outcomes.iter().filter(|o| o.success).count();
        Self {
            total_processed: outcomes.len(),
            successful,
            failed: outcomes.len() - successful,
            outcomes,
        }
    }

    /// Returns true when every processed field succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

impl FromIterator<UpdateOutcome> for SyncResult {
    fn from_iter<I: IntoIterator<Item = UpdateOutcome>>(iter: I) -> Self {
        Self::from_outcomes(iter.into_iter().collect())
    }
}
