//! Custom field access over the account-scoped REST API.
//!
//! Fields live under `/locations/{locationId}/customFields`. Every request
//! carries the caller's bearer token and API `Version` header verbatim.

use super::client::{FieldRemote, RawResponse};
use crate::error::{Result, SyncError};
use crate::executor::{RateLimitedExecutor, RetryPolicy};
use async_trait::async_trait;
use fieldsync_types::{Credentials, Field, FieldOption};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Remote API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the API (e.g. `https://services.leadconnectorhq.com`).
    pub api_base_url: String,
    /// Per-request timeout (in seconds).
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://services.leadconnectorhq.com".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Field listing response.
#[derive(Debug, Deserialize)]
struct CustomFieldList {
    #[serde(rename = "customFields", default)]
    custom_fields: Vec<CustomField>,
}

#[derive(Debug, Deserialize)]
struct CustomField {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "picklistOptions")]
    picklist_options: Option<Vec<Value>>,
    options: Option<Vec<Value>>,
}

impl From<CustomField> for Field {
    fn from(field: CustomField) -> Self {
        let options = field
            .picklist_options
            .filter(|options| !options.is_empty())
            .or(field.options)
            .unwrap_or_default();
        Field::new(
            field.id.unwrap_or_default(),
            field.name.unwrap_or_default(),
            options,
        )
    }
}

/// REST implementation of [`FieldRemote`].
pub struct HttpFieldRemote {
    config: RemoteConfig,
    client: Client,
    /// Used for listing only; updates are retried by the orchestrator.
    executor: RateLimitedExecutor,
}

impl HttpFieldRemote {
    /// Creates a client for the configured API.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SyncError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            executor: RateLimitedExecutor::default(),
        })
    }

    /// Replaces the retry policy applied to field listing.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.executor = RateLimitedExecutor::new(policy);
        self
    }

    fn fields_url(&self, location_id: &str) -> String {
        format!(
            "{}/locations/{}/customFields",
            self.config.api_base_url.trim_end_matches('/'),
            urlencoding::encode(location_id)
        )
    }

    fn request(&self, method: Method, url: &str, credentials: &Credentials) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&credentials.access_token)
            .header("Version", &credentials.version)
            .header("Accept", "application/json")
    }

    async fn send(request: RequestBuilder) -> Result<RawResponse> {
        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("request failed: {e}")))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Network(format!("read response body failed: {e}")))?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl FieldRemote for HttpFieldRemote {
    fn provider_name(&self) -> &'static str {
        "LeadConnector"
    }

    async fn list_fields(
        &self,
        location_id: &str,
        credentials: &Credentials,
    ) -> Result<Vec<Field>> {
        let url = self.fields_url(location_id);
        debug!("Listing custom fields for location {}", location_id);

        let success = self
            .executor
            .call(|| Self::send(self.request(Method::GET, &url, credentials)))
            .await?;

        let list: CustomFieldList = serde_json::from_str(&success.response.body).map_err(|e| {
            SyncError::RemoteUnavailable(format!("failed to parse field list: {e}"))
        })?;

        info!(
            "Listed {} custom fields for location {}",
            list.custom_fields.len(),
            location_id
        );
        Ok(list.custom_fields.into_iter().map(Field::from).collect())
    }

    async fn update_field(
        &self,
        location_id: &str,
        field_id: &str,
        name: &str,
        options: &[FieldOption],
        credentials: &Credentials,
    ) -> Result<RawResponse> {
        let url = format!(
            "{}/{}",
            self.fields_url(location_id),
            urlencoding::encode(field_id)
        );
        let payload = serde_json::json!({
            "name": name,
            "options": options,
        });

        debug!("Updating field {} ({})", name, field_id);
        Self::send(self.request(Method::PUT, &url, credentials).json(&payload)).await
    }
}
