use base64::Engine;
use creds_core::{
    crc32c, AccessTokenSource, CredentialStore, CredsError, PopulateOutcome, SecretAccessor,
    SecretManagerClient, SecretVersionName,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAYLOAD: &[u8] = br#"{"client_id":"abc","secret":"xyz"}"#;
const ACCESS_PATH: &str = "/v1/projects/my-project/secrets/astra/versions/latest:access";

fn access_response(data: &[u8], checksum: Option<u32>) -> serde_json::Value {
    let mut payload = serde_json::json!({
        "data": base64::engine::general_purpose::STANDARD.encode(data),
    });
    if let Some(checksum) = checksum {
        payload["dataCrc32c"] = serde_json::Value::String(checksum.to_string());
    }

    serde_json::json!({
        "name": "projects/123456/secrets/astra/versions/3",
        "payload": payload,
    })
}

fn client_for(server: &MockServer, token_source: AccessTokenSource) -> SecretManagerClient {
    SecretManagerClient::new(&server.uri(), token_source, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_access_latest_version() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ACCESS_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(access_response(PAYLOAD, Some(crc32c(PAYLOAD)))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, AccessTokenSource::fixed("test-token"));
    let payload = client
        .access(&SecretVersionName::latest("my-project", "astra"))
        .await
        .unwrap();

    assert_eq!(payload.data(), PAYLOAD);
    assert_eq!(payload.data_crc32c(), Some(crc32c(PAYLOAD)));
}

#[tokio::test]
async fn test_populate_through_rest_backend() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ACCESS_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(access_response(PAYLOAD, Some(crc32c(PAYLOAD)))),
        )
        .mount(&mock_server)
        .await;

    let store = CredentialStore::new(Arc::new(client_for(&mock_server, AccessTokenSource::None)));
    let outcome = store.populate(Some("my-project"), Some("astra")).await.unwrap();

    assert_eq!(outcome, PopulateOutcome::Populated);
    assert_eq!(store.username().await.as_deref(), Some("abc"));
    assert_eq!(store.token().await.unwrap().expose(), "xyz");
}

#[tokio::test]
async fn test_corrupted_payload_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ACCESS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(access_response(PAYLOAD, Some(crc32c(b"something else")))),
        )
        .mount(&mock_server)
        .await;

    let store = CredentialStore::new(Arc::new(client_for(&mock_server, AccessTokenSource::None)));
    let err = store
        .populate(Some("my-project"), Some("astra"))
        .await
        .unwrap_err();

    assert!(matches!(err, CredsError::ChecksumMismatch { .. }));
    assert!(store.username().await.is_none());
}

#[tokio::test]
async fn test_missing_checksum_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ACCESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(access_response(PAYLOAD, None)))
        .mount(&mock_server)
        .await;

    let store = CredentialStore::new(Arc::new(client_for(&mock_server, AccessTokenSource::None)));
    let err = store
        .populate(Some("my-project"), Some("astra"))
        .await
        .unwrap_err();

    assert!(matches!(err, CredsError::ChecksumMismatch { .. }));
}

#[tokio::test]
async fn test_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ACCESS_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {
                "code": 404,
                "message": "Secret [projects/123456/secrets/astra] not found or has no versions.",
                "status": "NOT_FOUND"
            }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, AccessTokenSource::None);
    let err = client
        .access(&SecretVersionName::latest("my-project", "astra"))
        .await
        .unwrap_err();

    assert!(matches!(err, CredsError::SecretNotFound(_)));
}

#[tokio::test]
async fn test_permission_denied() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ACCESS_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {
                "code": 403,
                "message": "Permission 'secretmanager.versions.access' denied",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, AccessTokenSource::fixed("bad-token"));
    let err = client
        .access(&SecretVersionName::latest("my-project", "astra"))
        .await
        .unwrap_err();

    match err {
        CredsError::PermissionDenied { message, .. } => {
            assert!(message.contains("secretmanager.versions.access"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ACCESS_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, AccessTokenSource::None);
    let err = client
        .access(&SecretVersionName::latest("my-project", "astra"))
        .await
        .unwrap_err();

    match err {
        CredsError::Provider { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "backend unavailable");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_base64_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ACCESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "projects/123456/secrets/astra/versions/3",
            "payload": { "data": "!!not base64!!", "dataCrc32c": "1" }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, AccessTokenSource::None);
    let err = client
        .access(&SecretVersionName::latest("my-project", "astra"))
        .await
        .unwrap_err();

    assert!(matches!(err, CredsError::InvalidPayload(_)));
}

#[tokio::test]
async fn test_metadata_server_token_is_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(
            "/computeMetadata/v1/instance/service-accounts/default/token",
        ))
        .and(header("metadata-flavor", "Google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.metadata",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(ACCESS_PATH))
        .and(header("authorization", "Bearer ya29.metadata"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(access_response(PAYLOAD, Some(crc32c(PAYLOAD)))),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(
        &mock_server,
        AccessTokenSource::metadata_server(&mock_server.uri()),
    );
    let name = SecretVersionName::latest("my-project", "astra");

    client.access(&name).await.unwrap();
    client.access(&name).await.unwrap();
}

#[tokio::test]
async fn test_metadata_server_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(
            "/computeMetadata/v1/instance/service-accounts/default/token",
        ))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(
        &mock_server,
        AccessTokenSource::metadata_server(&mock_server.uri()),
    );
    let err = client
        .access(&SecretVersionName::latest("my-project", "astra"))
        .await
        .unwrap_err();

    assert!(matches!(err, CredsError::Auth(_)));
}

#[tokio::test]
async fn test_metadata_token_with_unrepresentable_lifetime() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(
            "/computeMetadata/v1/instance/service-accounts/default/token",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.metadata",
            "expires_in": i64::MAX,
            "token_type": "Bearer"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(
        &mock_server,
        AccessTokenSource::metadata_server(&mock_server.uri()),
    );
    let err = client
        .access(&SecretVersionName::latest("my-project", "astra"))
        .await
        .unwrap_err();

    assert!(matches!(err, CredsError::Auth(ref msg) if msg.contains("out of range")));
}

#[tokio::test]
async fn test_metadata_token_with_negative_lifetime() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(
            "/computeMetadata/v1/instance/service-accounts/default/token",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.metadata",
            "expires_in": i64::MIN,
            "token_type": "Bearer"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(ACCESS_PATH))
        .and(header("authorization", "Bearer ya29.metadata"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(access_response(PAYLOAD, Some(crc32c(PAYLOAD)))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(
        &mock_server,
        AccessTokenSource::metadata_server(&mock_server.uri()),
    );
    let payload = client
        .access(&SecretVersionName::latest("my-project", "astra"))
        .await
        .unwrap();

    assert_eq!(payload.data(), PAYLOAD);
}

#[tokio::test]
async fn test_checksum_wider_than_u32_rejected() {
    let mock_server = MockServer::start().await;

    // crc32c(PAYLOAD) with bit 32 set: masking to 32 bits would make it match
    let widened = u64::from(crc32c(PAYLOAD)) | (1 << 32);

    Mock::given(method("GET"))
        .and(path(ACCESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "projects/123456/secrets/astra/versions/3",
            "payload": {
                "data": base64::engine::general_purpose::STANDARD.encode(PAYLOAD),
                "dataCrc32c": widened.to_string()
            }
        })))
        .mount(&mock_server)
        .await;

    let store = CredentialStore::new(Arc::new(client_for(&mock_server, AccessTokenSource::None)));
    let err = store
        .populate(Some("my-project"), Some("astra"))
        .await
        .unwrap_err();

    assert!(matches!(err, CredsError::InvalidPayload(ref msg) if msg.contains("out of range")));
    assert!(!store.is_populated().await);
}
