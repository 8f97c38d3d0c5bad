//! HTTP API for fieldsync.
//!
//! Request bodies may arrive as plain JSON objects or as JSON strings that
//! were escaped one or more times by an upstream automation step. Every body
//! is normalized before its keys are validated.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use fieldsync_sync::{FieldSync, SyncError};
use fieldsync_types::{DiscoverRequest, RestoreRequest, Snapshot, SyncResult, normalize};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Instrument, Span, error, info, info_span, warn};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// JSON body of every non-2xx response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
}

/// A [`SyncError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub SyncError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            err if err.is_client_error() => StatusCode::BAD_REQUEST,
            SyncError::RemoteUnavailable(_)
            | SyncError::RateLimited { .. }
            | SyncError::Network(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        Self(err)
    }
}

impl From<fieldsync_types::Error> for ApiError {
    fn from(err: fieldsync_types::Error) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "Request failed: {}", self.0);
        } else {
            warn!(status = status.as_u16(), "Request rejected: {}", self.0);
        }

        let missing = match &self.0 {
            SyncError::Validation { missing } => Some(missing.clone()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
            missing,
        };
        (status, Json(body)).into_response()
    }
}

fn request_span(route: &'static str) -> Span {
    info_span!("request", id = %Uuid::now_v7(), route)
}

async fn discover(sync: &FieldSync, body: &str) -> Result<Snapshot, ApiError> {
    let request = DiscoverRequest::from_value(normalize(body)?)?;
    info!(
        "Discover request for prefix '{}' at location {}",
        request.prefix, request.location_id
    );
    Ok(sync.discover_request(&request).await?)
}

async fn restore(sync: &FieldSync, body: &str) -> Result<SyncResult, ApiError> {
    let request = RestoreRequest::from_value(normalize(body)?)?;
    info!("Restore request for location {}", request.location_id);
    Ok(sync.restore_request(&request).await?)
}

async fn discover_handler(
    State(sync): State<Arc<FieldSync>>,
    body: String,
) -> Result<Json<Snapshot>, ApiError> {
    discover(&sync, &body)
        .instrument(request_span("discover"))
        .await
        .map(Json)
}

async fn restore_handler(
    State(sync): State<Arc<FieldSync>>,
    body: String,
) -> Result<Json<SyncResult>, ApiError> {
    restore(&sync, &body)
        .instrument(request_span("restore"))
        .await
        .map(Json)
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the HTTP API router around a configured [`FieldSync`].
pub fn build_router(sync: Arc<FieldSync>) -> Router {
    Router::new()
        .route("/", post(restore_handler))
        .route("/api/v1/discover", post(discover_handler))
        .route("/api/v1/restore", post(restore_handler))
        .route("/api/v1/health", get(health_handler))
        .with_state(sync)
}
