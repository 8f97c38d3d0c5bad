//! Discover and restore, composed from the matcher, the remote client and
//! the executor.
//!
//! A restore never stops early: every field of the snapshot yields exactly
//! one outcome, in snapshot order, whatever happens to the others.

use crate::error::Result;
use crate::executor::{RateLimitedExecutor, RetryPolicy};
use crate::matcher::NameMatcher;
use crate::remote::FieldRemote;
use fieldsync_types::{
    Credentials, DiscoverRequest, Field, RestoreRequest, Snapshot, SyncResult, UpdateOutcome,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Retry policy applied to every field update.
    pub retry: RetryPolicy,
    /// Fields updated at the same time during a restore.
    pub max_concurrency: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            max_concurrency: 1,
        }
    }
}

/// Runs discover and restore against one remote service.
pub struct FieldSync {
    remote: Arc<dyn FieldRemote>,
    executor: RateLimitedExecutor,
    config: SyncConfig,
}

impl FieldSync {
    pub fn new(remote: Arc<dyn FieldRemote>, config: SyncConfig) -> Self {
        Self {
            remote,
            executor: RateLimitedExecutor::new(config.retry.clone()),
            config,
        }
    }

    /// Snapshots the remote fields of the `prefix` group whose base names are
    /// listed in `target_names`. Matching fields without options are skipped.
    pub async fn discover<S: AsRef<str>>(
        &self,
        prefix: &str,
        target_names: &[S],
        location_id: &str,
        credentials: &Credentials,
    ) -> Result<Snapshot> {
        let matcher = NameMatcher::new(prefix, target_names);
        let fields = self.remote.list_fields(location_id, credentials).await?;
        let listed = fields.len();

        let mut selected = Vec::new();
        for field in fields {
            let Some(base) = matcher.match_name(&field.name) else {
                continue;
            };
            if field.options.is_empty() {
                info!("Skipping field {} ({}): no options", field.name, field.id);
                continue;
            }
            if field.id.is_empty() {
                warn!("Skipping field {}: remote returned no id", field.name);
                continue;
            }
            debug!("Matched field {} as '{}'", field.name, base);
            selected.push(field);
        }

        info!(
            "Discovered {} of {} fields for prefix '{}' ({} targets)",
            selected.len(),
            listed,
            prefix,
            matcher.target_count()
        );
        Ok(Snapshot::new(selected))
    }

    /// [`FieldSync::discover`] driven by a decoded request.
    pub async fn discover_request(&self, request: &DiscoverRequest) -> Result<Snapshot> {
        self.discover(
            &request.prefix,
            request.field_names.as_slice(),
            &request.location_id,
            &request.credentials,
        )
        .await
    }

    /// Pushes every field of `snapshot` back to the remote service.
    pub async fn restore(
        &self,
        snapshot: &Snapshot,
        location_id: &str,
        credentials: &Credentials,
    ) -> SyncResult {
        info!(
            "Restoring {} fields to location {}",
            snapshot.len(),
            location_id
        );

        // Boxed before streaming: a `map` closure over `&Field` inside the
        // stream makes this future non-`Send`.
        let updates: Vec<BoxFuture<'_, UpdateOutcome>> = snapshot
            .fields
            .iter()
            .map(|field| self.restore_field(field, location_id, credentials).boxed())
            .collect();
        let outcomes: Vec<UpdateOutcome> = stream::iter(updates)
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let result = SyncResult::from_outcomes(outcomes);
        info!(
            "Restore finished: {} processed, {} successful, {} failed",
            result.total_processed, result.successful, result.failed
        );
        result
    }

    /// Decodes a possibly multi-escaped snapshot and restores it.
    pub async fn restore_encoded(
        &self,
        raw: &str,
        location_id: &str,
        credentials: &Credentials,
    ) -> Result<SyncResult> {
        let snapshot = Snapshot::from_encoded(raw)?;
        Ok(self.restore(&snapshot, location_id, credentials).await)
    }

    /// [`FieldSync::restore`] driven by a decoded request.
    pub async fn restore_request(&self, request: &RestoreRequest) -> Result<SyncResult> {
        let snapshot = request.snapshot()?;
        Ok(self
            .restore(&snapshot, &request.location_id, &request.credentials)
            .await)
    }

    async fn restore_field(
        &self,
        field: &Field,
        location_id: &str,
        credentials: &Credentials,
    ) -> UpdateOutcome {
        if let Some(reason) = &field.rejection {
            warn!("Skipping undecodable field record '{}': {}", field.id, reason);
            return UpdateOutcome::skipped(
                &field.id,
                &field.name,
                format!("skipped: invalid field record: {reason}"),
            );
        }
        if !field.is_complete() {
            let missing = field.missing_parts().join(", ");
            warn!("Skipping field '{}' ({}): missing {}", field.name, field.id, missing);
            return UpdateOutcome::skipped(
                &field.id,
                &field.name,
                format!("skipped: missing {missing}"),
            );
        }

        info!("Updating field {} with ID {}", field.name, field.id);
        let remote = &self.remote;
        let outcome = self
            .executor
            .execute(&field.id, &field.name, move || {
                remote.update_field(
                    location_id,
                    &field.id,
                    &field.name,
                    &field.options,
                    credentials,
                )
            })
            .await;

        if outcome.success {
            info!(
                "Updated field {} in {} attempt(s)",
                field.name, outcome.attempts
            );
        } else {
            warn!(
                "Failed to update field {}: {}",
                field.name,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
        outcome
    }
}
