//! Integration tests for the auth module
//!
//! Exercises the full refresh lifecycle against a mock OAuth token endpoint:
//! refresh coalescing, expiry-boundary behavior, malformed-response handling,
//! and the end-to-end stored-record scenario.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use leadlink_common::auth::{
    OAuthClient, OAuthConfig, TokenManager, TokenManagerError, TokenRecord, TokenState,
    TokenStore,
};
use leadlink_common::testing::MemoryTokenStore;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/oauth/v2/token";

fn manager_for(server: &MockServer) -> (TokenManager<OAuthClient, MemoryTokenStore>, Arc<MemoryTokenStore>) {
    let config = OAuthConfig::new(
        "test_client_id".to_string(),
        "test_client_secret".to_string(),
        "http://localhost:3000/callback".to_string(),
        format!("{}{}", server.uri(), TOKEN_PATH),
    );

    let store = Arc::new(MemoryTokenStore::new());
    let manager = TokenManager::new(OAuthClient::new(config), store.clone());
    (manager, store)
}

fn expired_record() -> TokenRecord {
    TokenRecord {
        access_token: Some("old".to_string()),
        refresh_token: Some("r1".to_string()),
        expires_at: Some(Utc::now() - ChronoDuration::seconds(60)),
    }
}

/// End-to-end scenario: a stored expired record plus a provider that answers
/// `{access_token: "new", expires_in: 3600}` yields `"new"` from
/// `get_access_token`, and a subsequent load shows the expiry roughly one
/// hour out.
#[tokio::test(flavor = "multi_thread")]
async fn refresh_cycle_replaces_expired_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (manager, store) = manager_for(&server);
    store.set_record(expired_record());

    let token = manager.get_access_token().await.expect("token returned");
    assert_eq!(token, "new");

    let record = store.load().await.expect("store read").expect("record present");
    assert_eq!(record.access_token.as_deref(), Some("new"));
    assert_eq!(record.refresh_token.as_deref(), Some("r1"));

    let remaining = (record.expires_at.expect("expiry persisted") - Utc::now()).num_seconds();
    assert!((3590..=3600).contains(&remaining), "unexpected expiry: {remaining}s");
}

/// Two concurrent callers observing an expired token must produce exactly
/// one refresh exchange; the endpoint mock panics on a second request.
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_callers_issue_one_refresh_exchange() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "access_token": "new",
                    "expires_in": 3600
                }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (manager, store) = manager_for(&server);
    store.set_record(expired_record());
    let manager = Arc::new(manager);

    let (first, second) = tokio::join!(manager.get_access_token(), manager.get_access_token());

    assert_eq!(first.expect("first caller"), "new");
    assert_eq!(second.expect("second caller"), "new");

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1, "expected a single coalesced refresh exchange");
}

/// A stored record whose expiry has passed is classified `Expired`, and a
/// usable one `Valid`.
#[tokio::test(flavor = "multi_thread")]
async fn token_state_tracks_stored_record() {
    let server = MockServer::start().await;
    let (manager, store) = manager_for(&server);

    assert_eq!(manager.token_state().await.expect("state read"), TokenState::Absent);

    store.set_record(expired_record());
    assert_eq!(manager.token_state().await.expect("state read"), TokenState::Expired);

    store.set_record(TokenRecord {
        access_token: Some("current".to_string()),
        refresh_token: Some("r1".to_string()),
        expires_at: Some(Utc::now() + ChronoDuration::seconds(3600)),
    });
    assert_eq!(
        manager.token_state().await.expect("state read"),
        TokenState::Valid("current".to_string())
    );
}

/// A refresh response missing `access_token` fails with
/// `InvalidTokenResponse` and leaves the prior record untouched.
#[tokio::test(flavor = "multi_thread")]
async fn malformed_response_preserves_prior_record() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    let (manager, store) = manager_for(&server);
    store.set_record(expired_record());

    let result = manager.get_access_token().await;
    assert!(matches!(result, Err(TokenManagerError::InvalidTokenResponse(_))));

    let record = store.load().await.expect("store read").expect("record present");
    assert_eq!(record.access_token.as_deref(), Some("old"));
    assert_eq!(record.refresh_token.as_deref(), Some("r1"));
}

/// An empty store never reaches the token endpoint: the call fails with
/// `NoRefreshToken` before any HTTP traffic.
#[tokio::test(flavor = "multi_thread")]
async fn absent_record_fails_before_contacting_provider() {
    let server = MockServer::start().await;

    Mock::given(method("POST")).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;

    let (manager, _store) = manager_for(&server);

    let result = manager.get_access_token().await;
    assert!(matches!(result, Err(TokenManagerError::NoRefreshToken)));
}

/// A provider rejection surfaces as `RefreshFailed` with the original error
/// payload attached.
#[tokio::test(flavor = "multi_thread")]
async fn provider_rejection_surfaces_with_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "refresh token revoked"
        })))
        .mount(&server)
        .await;

    let (manager, store) = manager_for(&server);
    store.set_record(expired_record());

    match manager.get_access_token().await {
        Err(TokenManagerError::RefreshFailed(msg)) => {
            assert!(msg.contains("invalid_grant"));
            assert!(msg.contains("refresh token revoked"));
        }
        other => panic!("expected refresh failure, got {other:?}"),
    }
}

/// Seeding a refresh token through the manager bootstraps the first access
/// token without any pre-existing record.
#[tokio::test(flavor = "multi_thread")]
async fn seeded_store_bootstraps_first_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("refresh_token=seed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "first",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (manager, _store) = manager_for(&server);

    manager.install_refresh_token("seed").await.expect("seed saved");
    let token = manager.get_access_token().await.expect("token returned");

    assert_eq!(token, "first");
}
