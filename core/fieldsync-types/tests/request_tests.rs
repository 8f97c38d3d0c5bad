use fieldsync_types::{Credentials, DiscoverRequest, Error, Field, RestoreRequest};
use pretty_assertions::assert_eq;
use serde_json::json;

// ── Credentials ─────────────────────────────────────────────────

#[test]
fn credentials_debug_redacts_token() {
    let creds = Credentials::new("secret-token", "2021-07-28");
    let debug = format!("{creds:?}");
    assert!(!debug.contains("secret-token"));
    assert!(debug.contains("2021-07-28"));
}

// ── DiscoverRequest ─────────────────────────────────────────────

#[test]
fn discover_request_decodes() {
    let request = DiscoverRequest::from_value(json!({
        "prefix": "Survey",
        "field_names": ["satisfaction", "color"],
        "locationId": "loc_1",
        "access_token": "tok",
        "version": "2021-07-28"
    }))
    .unwrap();
    assert_eq!(request.prefix, "Survey");
    assert_eq!(request.field_names, vec!["satisfaction", "color"]);
    assert_eq!(request.location_id, "loc_1");
    assert_eq!(request.credentials, Credentials::new("tok", "2021-07-28"));
}

#[test]
fn discover_request_lists_all_missing_keys() {
    let err = DiscoverRequest::from_value(json!({"prefix": "Survey", "version": "v"})).unwrap_err();
    match err {
        Error::MissingKeys(keys) => {
            assert_eq!(keys, vec!["field_names", "locationId", "access_token"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn discover_request_accepts_encoded_name_list() {
    let request = DiscoverRequest::from_value(json!({
        "prefix": "Survey",
        "field_names": "[\"satisfaction\",\"color\"]",
        "locationId": "loc_1",
        "access_token": "tok",
        "version": "v"
    }))
    .unwrap();
    assert_eq!(request.field_names, vec!["satisfaction", "color"]);
}

#[test]
fn discover_request_splits_comma_separated_names() {
    let request = DiscoverRequest::from_value(json!({
        "prefix": "Survey",
        "field_names": "satisfaction, color ,",
        "locationId": "loc_1",
        "access_token": "tok",
        "version": "v"
    }))
    .unwrap();
    assert_eq!(request.field_names, vec!["satisfaction", "color"]);
}

#[test]
fn discover_request_rejects_wrong_types() {
    let err = DiscoverRequest::from_value(json!({
        "prefix": 7,
        "field_names": [],
        "locationId": "loc_1",
        "access_token": "tok",
        "version": "v"
    }))
    .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
}

#[test]
fn discover_request_rejects_non_object() {
    let err = DiscoverRequest::from_value(json!(["prefix"])).unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
}

// ── RestoreRequest ──────────────────────────────────────────────

fn restore_body(restore_fields: serde_json::Value) -> serde_json::Value {
    json!({
        "locationId": "loc_1",
        "access_token": "tok",
        "version": "v",
        "restore_fields": restore_fields
    })
}

#[test]
fn restore_request_missing_keys() {
    let err = RestoreRequest::from_value(json!({"locationId": "loc_1"})).unwrap_err();
    match err {
        Error::MissingKeys(keys) => {
            assert_eq!(keys, vec!["version", "access_token", "restore_fields"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_keys_message_enumerates_keys() {
    let err = Error::MissingKeys(vec!["version".into(), "locationId".into()]);
    assert_eq!(err.to_string(), "missing required keys: version, locationId");
}

#[test]
fn restore_request_decodes_double_escaped_snapshot() {
    let snapshot = json!({"Restore": [{"id": "f1", "name": "Survey - Color", "picklistOptions": ["red"]}]});
    let once = serde_json::to_string(&snapshot).unwrap();
    let twice = serde_json::to_string(&once).unwrap();

    let request = RestoreRequest::from_value(restore_body(json!(twice))).unwrap();
    let decoded = request.snapshot().unwrap();
    assert_eq!(decoded.fields, vec![Field::new("f1", "Survey - Color", vec![json!("red")])]);
}

#[test]
fn restore_request_accepts_inline_snapshot_object() {
    let request = RestoreRequest::from_value(restore_body(json!({
        "fields": [{"fieldId": "f1", "fieldName": "X", "options": ["a"]}]
    })))
    .unwrap();
    assert_eq!(request.snapshot().unwrap().len(), 1);
}

#[test]
fn restore_request_with_garbage_snapshot_is_malformed() {
    let request = RestoreRequest::from_value(restore_body(json!("definitely not json"))).unwrap();
    assert!(matches!(request.snapshot().unwrap_err(), Error::MalformedInput(_)));
}

#[test]
fn restore_request_with_non_array_field_list_is_malformed() {
    let request = RestoreRequest::from_value(restore_body(json!(r#"{"Restore":"oops"}"#))).unwrap();
    assert!(matches!(request.snapshot().unwrap_err(), Error::MalformedInput(_)));
}
