use fieldsync_sync::{
    FieldRemote, FieldSync, HttpFieldRemote, RemoteConfig, RetryPolicy, SyncConfig, SyncError,
};
use fieldsync_types::{Credentials, Field, Snapshot};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Config defaults ─────────────────────────────────────────────

#[test]
fn remote_config_default() {
    let cfg = RemoteConfig::default();
    assert_eq!(cfg.api_base_url, "https://services.leadconnectorhq.com");
    assert_eq!(cfg.timeout_secs, 60);
}

#[test]
fn remote_config_serde_roundtrip() {
    let cfg = RemoteConfig {
        api_base_url: "http://localhost:9000".to_string(),
        ..Default::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    let back: RemoteConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.api_base_url, "http://localhost:9000");
    assert_eq!(back.timeout_secs, 60);
}

#[test]
fn http_remote_provider_name() {
    let remote = HttpFieldRemote::new(RemoteConfig::default()).unwrap();
    assert_eq!(remote.provider_name(), "LeadConnector");
}

// ── Wiremock-based integration tests ────────────────────────────

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        low_quota_cooldown: Duration::from_millis(5),
        rate_limit_wait: Duration::from_millis(5),
        retry_delay: Duration::from_millis(5),
        ..Default::default()
    }
}

fn mock_remote(server: &MockServer) -> HttpFieldRemote {
    let config = RemoteConfig {
        api_base_url: server.uri(),
        timeout_secs: 5,
    };
    HttpFieldRemote::new(config)
        .unwrap()
        .with_retry_policy(fast_policy())
}

fn creds() -> Credentials {
    Credentials::new("tok_abc", "2021-07-28")
}

#[tokio::test]
async fn list_fields_sends_credentials_and_maps_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/loc_1/customFields"))
        .and(header("Authorization", "Bearer tok_abc"))
        .and(header("Version", "2021-07-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customFields": [
                {"id": "f1", "name": "Survey - Color", "dataType": "SINGLE_OPTIONS", "picklistOptions": ["Red", "Blue"]},
                {"id": "f2", "name": "Survey - Size", "options": [{"label": "S"}]},
                {"id": "f3", "name": "Survey - Notes", "dataType": "TEXT"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fields = mock_remote(&server).list_fields("loc_1", &creds()).await.unwrap();

    assert_eq!(
        fields,
        vec![
            Field::new("f1", "Survey - Color", vec![json!("Red"), json!("Blue")]),
            Field::new("f2", "Survey - Size", vec![json!({"label": "S"})]),
            Field::new("f3", "Survey - Notes", vec![]),
        ]
    );
}

#[tokio::test]
async fn list_fields_without_custom_fields_key_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/loc_1/customFields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let fields = mock_remote(&server).list_fields("loc_1", &creds()).await.unwrap();
    assert!(fields.is_empty());
}

#[tokio::test]
async fn list_fields_retries_after_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/loc_1/customFields"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/locations/loc_1/customFields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customFields": [{"id": "f1", "name": "Survey - Color", "picklistOptions": ["Red"]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fields = mock_remote(&server).list_fields("loc_1", &creds()).await.unwrap();
    assert_eq!(fields.len(), 1);
}

#[tokio::test]
async fn list_fields_server_error_is_remote_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/loc_1/customFields"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .expect(3)
        .mount(&server)
        .await;

    let err = mock_remote(&server).list_fields("loc_1", &creds()).await.unwrap_err();
    assert!(matches!(err, SyncError::RemoteUnavailable(_)));
}

#[tokio::test]
async fn list_fields_unparseable_body_is_remote_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/loc_1/customFields"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = mock_remote(&server).list_fields("loc_1", &creds()).await.unwrap_err();
    assert!(matches!(err, SyncError::RemoteUnavailable(_)));
}

#[tokio::test]
async fn update_field_puts_name_and_options() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/locations/loc_1/customFields/f1"))
        .and(header("Authorization", "Bearer tok_abc"))
        .and(header("Version", "2021-07-28"))
        .and(body_json(json!({"name": "Survey - Color", "options": ["Red", "Blue"]})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-remaining", "42")
                .set_body_json(json!({"customField": {"id": "f1"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = mock_remote(&server)
        .update_field("loc_1", "f1", "Survey - Color", &[json!("Red"), json!("Blue")], &creds())
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert!(response.is_success());
    assert_eq!(response.rate_limit_remaining(), Some(42));
    assert_eq!(response.detail(), json!({"customField": {"id": "f1"}}));
}

#[tokio::test]
async fn update_field_returns_error_status_without_retrying() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/locations/loc_1/customFields/f1"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "invalid options"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = mock_remote(&server)
        .update_field("loc_1", "f1", "Survey - Color", &[json!("Red")], &creds())
        .await
        .unwrap();

    assert_eq!(response.status, 422);
    assert_eq!(response.detail(), json!({"message": "invalid options"}));
}

#[tokio::test]
async fn update_field_unreachable_host_is_network_error() {
    let config = RemoteConfig {
        api_base_url: "http://127.0.0.1:1".to_string(),
        timeout_secs: 2,
    };
    let remote = HttpFieldRemote::new(config).unwrap();

    let err = remote
        .update_field("loc_1", "f1", "X", &[json!("a")], &creds())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
}

// ── End to end through the orchestrator ─────────────────────────

#[tokio::test]
async fn discover_then_restore_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/loc_1/customFields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customFields": [
                {"id": "f1", "name": "Survey - Satisfaction", "picklistOptions": ["Happy", "Sad"]},
                {"id": "f2", "name": "Survey-A1 - Color", "picklistOptions": ["Red"]},
                {"id": "f3", "name": "Other - X", "picklistOptions": ["x"]}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/locations/loc_1/customFields/f1"))
        .and(body_json(json!({"name": "Survey - Satisfaction", "options": ["Happy", "Sad"]})))
        .respond_with(ResponseTemplate::new(200).insert_header("x-ratelimit-remaining", "80"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/locations/loc_1/customFields/f2"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .expect(3)
        .mount(&server)
        .await;

    let sync = FieldSync::new(
        Arc::new(mock_remote(&server)),
        SyncConfig {
            retry: fast_policy(),
            ..Default::default()
        },
    );

    let snapshot = sync
        .discover("Survey", &["satisfaction", "color"], "loc_1", &creds())
        .await
        .unwrap();
    assert_eq!(snapshot.len(), 2);

    let stored = snapshot.to_encoded().unwrap();
    let restored = Snapshot::from_encoded(&serde_json::to_string(&stored).unwrap()).unwrap();
    let result = sync.restore(&restored, "loc_1", &creds()).await;

    assert_eq!(result.total_processed, 2);
    assert_eq!(result.successful, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(result.outcomes[0].rate_limit_remaining, Some(80));
    assert_eq!(result.outcomes[1].http_status, Some(500));
    assert_eq!(result.outcomes[1].attempts, 3);
}
