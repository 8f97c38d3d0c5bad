//! Retrying, quota-aware execution of remote calls.
//!
//! Every call chain carries its own counters; nothing is shared between
//! chains, so parallel restores throttle independently off the headers of
//! their own responses.
//!
//! Per response the executor:
//! 1. pauses for `low_quota_cooldown` when the remaining-quota header is below
//!    `low_quota_threshold` (before looking at the status, 429 included);
//! 2. on 429 waits `rate_limit_wait` and repeats the call, giving up after
//!    `max_consecutive_rate_limits` 429s in a row;
//! 3. on any other failure spends one of `max_attempts`, pausing
//!    `retry_delay` before the next try;
//! 4. on 2xx returns the response.

use crate::error::{Result, SyncError};
use crate::remote::RawResponse;
use fieldsync_types::UpdateOutcome;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry and throttling settings.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts allowed for non-429 failures, the first call included.
    pub max_attempts: u32,
    /// 429 responses in a row tolerated before giving up.
    pub max_consecutive_rate_limits: u32,
    /// Remaining-quota value below which the cool-down applies.
    pub low_quota_threshold: u32,
    /// Pause after a response reporting low remaining quota.
    pub low_quota_cooldown: Duration,
    /// Pause after a 429 before repeating the call.
    pub rate_limit_wait: Duration,
    /// Pause between attempts after other failures.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_consecutive_rate_limits: 3,
            low_quota_threshold: 50,
            low_quota_cooldown: Duration::from_secs(5),
            rate_limit_wait: Duration::from_secs(10),
            retry_delay: Duration::from_secs(2),
        }
    }
}

/// Why a call ended without a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The attempt budget was spent on errors or non-2xx statuses.
    Exhausted,
    /// Too many 429 responses in a row.
    RateLimited { consecutive: u32 },
}

/// Terminal failure of a call chain.
#[derive(Debug, Clone, PartialEq)]
pub struct CallFailure {
    pub kind: FailureKind,
    /// Status of the last response, absent after a transport failure.
    pub status: Option<u16>,
    /// Last response body (JSON when parseable) or the transport error text.
    pub detail: Value,
    /// Remote calls made.
    pub attempts: u32,
    pub rate_limit_remaining: Option<u32>,
}

impl CallFailure {
    /// Human-readable summary.
    pub fn message(&self) -> String {
        match self.kind {
            FailureKind::RateLimited { consecutive } => {
                SyncError::RateLimited { consecutive }.to_string()
            }
            FailureKind::Exhausted => match self.status {
                Some(status) => format!(
                    "request failed with status {status} after {} attempts",
                    self.attempts
                ),
                None => format!("request failed after {} attempts", self.attempts),
            },
        }
    }
}

impl From<CallFailure> for SyncError {
    fn from(failure: CallFailure) -> Self {
        SyncError::RemoteUnavailable(failure.message())
    }
}

/// A successful response and the number of calls it took.
#[derive(Debug, Clone)]
pub struct CallSuccess {
    pub response: RawResponse,
    pub attempts: u32,
}

/// Runs remote calls under a [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct RateLimitedExecutor {
    policy: RetryPolicy,
}

impl RateLimitedExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Invokes `op` until it yields a 2xx response or the policy gives up.
    ///
    /// At most `max_attempts` plus the tolerated 429 repeats calls are made.
    pub async fn call<F, Fut>(&self, mut op: F) -> std::result::Result<CallSuccess, CallFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<RawResponse>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let max_rate_limited = self.policy.max_consecutive_rate_limits.max(1);

        let mut calls = 0u32;
        let mut failures = 0u32;
        let mut consecutive_rate_limited = 0u32;

        loop {
            calls += 1;

            let (status, detail, remaining) = match op().await {
                Ok(response) => {
                    let remaining = response.rate_limit_remaining();
                    if let Some(left) = remaining.filter(|r| *r < self.policy.low_quota_threshold) {
                        debug!(
                            remaining = left,
                            cooldown_ms = self.policy.low_quota_cooldown.as_millis() as u64,
                            "Remaining quota low, cooling down"
                        );
                        sleep(self.policy.low_quota_cooldown).await;
                    }

                    if response.is_rate_limited() {
                        consecutive_rate_limited += 1;
                        if consecutive_rate_limited >= max_rate_limited {
                            warn!(
                                "Giving up after {} consecutive 429 responses",
                                consecutive_rate_limited
                            );
                            return Err(CallFailure {
                                kind: FailureKind::RateLimited {
                                    consecutive: consecutive_rate_limited,
                                },
                                status: Some(response.status),
                                detail: response.detail(),
                                attempts: calls,
                                rate_limit_remaining: remaining,
                            });
                        }
                        debug!(
                            attempt = calls,
                            wait_ms = self.policy.rate_limit_wait.as_millis() as u64,
                            "Rate limited, waiting before repeating call"
                        );
                        sleep(self.policy.rate_limit_wait).await;
                        continue;
                    }
                    consecutive_rate_limited = 0;

                    if response.is_success() {
                        return Ok(CallSuccess {
                            response,
                            attempts: calls,
                        });
                    }

                    (Some(response.status), response.detail(), remaining)
                }
                Err(e) => {
                    consecutive_rate_limited = 0;
                    (None, Value::String(e.to_string()), None)
                }
            };

            failures += 1;
            if failures >= max_attempts {
                warn!(
                    "Request failed after {} attempts (status: {:?})",
                    failures, status
                );
                return Err(CallFailure {
                    kind: FailureKind::Exhausted,
                    status,
                    detail,
                    attempts: calls,
                    rate_limit_remaining: remaining,
                });
            }

            warn!(
                attempt = failures,
                max_attempts,
                status = ?status,
                "Request failed, retrying"
            );
            sleep(self.policy.retry_delay).await;
        }
    }

    /// Runs one field update and folds the result into an [`UpdateOutcome`].
    pub async fn execute<F, Fut>(&self, field_id: &str, field_name: &str, op: F) -> UpdateOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<RawResponse>>,
    {
        match self.call(op).await {
            Ok(success) => UpdateOutcome::succeeded(
                field_id,
                field_name,
                success.response.status,
                success.response.rate_limit_remaining(),
                success.attempts,
            ),
            Err(failure) => UpdateOutcome::failed(
                field_id,
                field_name,
                failure.message(),
                failure.status,
                Some(failure.detail),
                failure.rate_limit_remaining,
                failure.attempts,
            ),
        }
    }
}
