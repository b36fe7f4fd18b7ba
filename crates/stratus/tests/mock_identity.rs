//! Mock identity-server tests for session verification, login, refresh and
//! revocation.
//!
//! These use wiremock to simulate both the resource API root and the
//! identity endpoints, so the session lifecycle is exercised without network
//! access or real credentials.

use serde_json::json;
use stratus::{ApiUrl, AuthSession, Credentials, Error};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Base URL of a mock server; serves as both API root and identity host.
fn mock_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

fn logged_in_session(server: &MockServer) -> AuthSession {
    AuthSession::with_credentials(
        "client-id",
        mock_url(server),
        mock_url(server),
        Credentials::new("alice", "A1", "R1"),
    )
}

// ============================================================================
// Verification
// ============================================================================

#[tokio::test]
async fn verification_runs_exactly_once_under_concurrency() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let session = logged_in_session(&server);

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let session = session.clone();
        tasks.push(tokio::spawn(
            async move { session.ensure_verified().await },
        ));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert!(session.is_verified());
    // wiremock verifies expect(1) on drop
}

#[tokio::test]
async fn verification_refreshes_expired_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth/token/"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=R1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A2",
            "refresh_token": "R2"
        })))
        .mount(&server)
        .await;

    let session = logged_in_session(&server);
    session.ensure_verified().await.unwrap();

    let credentials = session.credentials().await;
    assert_eq!(credentials.access_token(), "A2");
    assert_eq!(credentials.refresh_token(), "R2");
    assert_eq!(credentials.username(), "alice");
}

#[tokio::test]
async fn verification_failure_is_cached_for_the_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let session = logged_in_session(&server);

    let first = session.ensure_verified().await;
    assert!(matches!(first, Err(Error::UnexpectedStatus { status: 503 })));

    // The cached outcome is replayed; expect(1) proves no second request.
    let second = session.ensure_verified().await;
    assert!(matches!(second, Err(Error::UnexpectedStatus { status: 503 })));
    assert!(!session.is_verified());
}

#[tokio::test]
async fn verification_failed_refresh_propagates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth/token/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = logged_in_session(&server);
    let result = session.ensure_verified().await;
    assert!(matches!(result, Err(Error::AuthenticationFailed { .. })));
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn login_stores_token_pair() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token/"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("client_id=client-id"))
        .and(body_string_contains("username=u"))
        .and(body_string_contains("password=p"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A1",
            "refresh_token": "R1"
        })))
        .mount(&server)
        .await;

    let session = AuthSession::new("client-id", mock_url(&server), mock_url(&server));
    let credentials = session.login("u", "p").await.unwrap();

    assert_eq!(credentials.username(), "u");
    assert_eq!(credentials.access_token(), "A1");
    assert_eq!(credentials.refresh_token(), "R1");
    assert!(!session.credentials().await.is_empty());
}

#[tokio::test]
async fn login_unauthorized_is_authentication_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = AuthSession::new("client-id", mock_url(&server), mock_url(&server));
    let result = session.login("u", "wrong").await;

    assert!(matches!(result, Err(Error::AuthenticationFailed { .. })));
    assert!(session.credentials().await.is_empty());
}

#[tokio::test]
async fn login_error_payload_carries_description() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "bad creds"
        })))
        .mount(&server)
        .await;

    let session = AuthSession::new("client-id", mock_url(&server), mock_url(&server));
    let result = session.login("u", "p").await;

    match result {
        Err(Error::AuthenticationFailed { description }) => assert_eq!(description, "bad creds"),
        other => panic!("expected AuthenticationFailed, got {:?}", other),
    }
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn failed_refresh_leaves_tokens_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "bad creds"
        })))
        .mount(&server)
        .await;

    let session = logged_in_session(&server);
    let result = session.refresh().await;

    match result {
        Err(Error::AuthenticationFailed { description }) => assert_eq!(description, "bad creds"),
        other => panic!("expected AuthenticationFailed, got {:?}", other),
    }

    let credentials = session.credentials().await;
    assert_eq!(credentials.access_token(), "A1");
    assert_eq!(credentials.refresh_token(), "R1");
}

#[tokio::test]
async fn refresh_replaces_both_tokens_in_place() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token/"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A2",
            "refresh_token": "R2"
        })))
        .mount(&server)
        .await;

    let session = logged_in_session(&server);
    session.refresh().await.unwrap();

    let credentials = session.credentials().await;
    assert_eq!(credentials.access_token(), "A2");
    assert_eq!(credentials.refresh_token(), "R2");
}

// ============================================================================
// Revocation
// ============================================================================

#[tokio::test]
async fn revoke_clears_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/revoke_token/"))
        .and(body_string_contains("client_id=client-id"))
        .and(body_string_contains("token=R1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let session = logged_in_session(&server);
    let credentials = session.revoke().await.unwrap();

    assert!(credentials.is_empty());
    assert_eq!(credentials.username(), "");
    assert!(session.credentials().await.is_empty());
}

#[tokio::test]
async fn revoke_failure_keeps_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/revoke_token/"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let session = logged_in_session(&server);
    let result = session.revoke().await;

    assert!(matches!(result, Err(Error::RevocationFailed { status: 400 })));
    assert!(!session.credentials().await.is_empty());
}
