//! Test doubles for the auth ports
//!
//! Deterministic in-memory implementations of [`TokenStore`] and
//! [`OAuthClientTrait`] used by unit and integration tests across the
//! workspace.
//!
//! [`TokenStore`]: crate::auth::TokenStore
//! [`OAuthClientTrait`]: crate::auth::OAuthClientTrait

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::auth::{
    OAuthClientError, OAuthClientTrait, TokenPatch, TokenRecord, TokenResponse, TokenStore,
};

/// In-memory [`TokenStore`](crate::auth::TokenStore) holding zero or one
/// record.
///
/// Applies patches with the same merge semantics as the SQLite store: `None`
/// fields keep their stored value, and a save is atomic under the internal
/// mutex.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    record: Mutex<Option<TokenRecord>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored record wholesale (test setup).
    pub fn set_record(&self, record: TokenRecord) {
        *self.record.lock().unwrap() = Some(record);
    }

    /// Drop the stored record (test setup).
    pub fn clear(&self) {
        *self.record.lock().unwrap() = None;
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<TokenRecord>, String> {
        Ok(self.record.lock().unwrap().clone())
    }

    async fn save(&self, patch: &TokenPatch) -> Result<(), String> {
        let mut guard = self.record.lock().unwrap();
        let mut record = guard.take().unwrap_or_default();

        if let Some(access_token) = &patch.access_token {
            record.access_token = Some(access_token.clone());
        }
        if let Some(refresh_token) = &patch.refresh_token {
            record.refresh_token = Some(refresh_token.clone());
        }
        if let Some(expires_at) = patch.expires_at {
            record.expires_at = Some(expires_at);
        }

        *guard = Some(record);
        Ok(())
    }
}

/// Scripted outcome for [`MockOAuthClient`] refresh calls.
#[derive(Debug, Clone)]
pub enum MockRefreshOutcome {
    /// Return a parsed token response.
    Success { access_token: String, expires_in: i64, refresh_token: Option<String> },

    /// Fail as a malformed success response.
    InvalidResponse(String),

    /// Fail as a provider rejection with the original payload.
    ProviderRejection { status: u16, body: String },
}

impl MockRefreshOutcome {
    /// Successful refresh without rotation.
    #[must_use]
    pub fn success(access_token: &str, expires_in: i64) -> Self {
        Self::Success {
            access_token: access_token.to_string(),
            expires_in,
            refresh_token: None,
        }
    }

    /// Successful refresh that also rotates the refresh token.
    #[must_use]
    pub fn success_with_rotation(access_token: &str, expires_in: i64, rotated: &str) -> Self {
        Self::Success {
            access_token: access_token.to_string(),
            expires_in,
            refresh_token: Some(rotated.to_string()),
        }
    }

    /// Malformed-response failure.
    #[must_use]
    pub fn invalid_response(message: &str) -> Self {
        Self::InvalidResponse(message.to_string())
    }

    /// Provider rejection failure.
    #[must_use]
    pub fn provider_rejection(status: u16, body: &str) -> Self {
        Self::ProviderRejection { status, body: body.to_string() }
    }
}

/// Scripted [`OAuthClientTrait`](crate::auth::OAuthClientTrait) that records
/// refresh attempts.
#[derive(Debug)]
pub struct MockOAuthClient {
    outcome: MockRefreshOutcome,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockOAuthClient {
    /// Create a client that always produces `outcome`.
    #[must_use]
    pub fn new(outcome: MockRefreshOutcome) -> Self {
        Self { outcome, delay: None, calls: AtomicUsize::new(0) }
    }

    /// Delay every exchange, widening the race window for coalescing tests.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of refresh exchanges issued so far.
    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuthClientTrait for MockOAuthClient {
    async fn refresh_access_token(
        &self,
        _refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.outcome.clone() {
            MockRefreshOutcome::Success { access_token, expires_in, refresh_token } => {
                Ok(TokenResponse { access_token, expires_in, refresh_token })
            }
            MockRefreshOutcome::InvalidResponse(msg) => {
                Err(OAuthClientError::InvalidResponse(msg))
            }
            MockRefreshOutcome::ProviderRejection { status, body } => {
                Err(OAuthClientError::Provider { status, body })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, Utc};

    use super::*;

    #[tokio::test]
    async fn memory_store_merges_patches() {
        let store = MemoryTokenStore::new();

        store
            .save(&TokenPatch {
                refresh_token: Some("r1".to_string()),
                ..TokenPatch::default()
            })
            .await
            .expect("seed saved");

        let expires_at = Utc::now() + ChronoDuration::seconds(3600);
        store
            .save(&TokenPatch {
                access_token: Some("a1".to_string()),
                refresh_token: None,
                expires_at: Some(expires_at),
            })
            .await
            .expect("refresh saved");

        let record = store.load().await.expect("load").expect("record present");
        assert_eq!(record.access_token.as_deref(), Some("a1"));
        assert_eq!(record.refresh_token.as_deref(), Some("r1"));
        assert_eq!(record.expires_at, Some(expires_at));
    }

    #[tokio::test]
    async fn mock_client_counts_calls() {
        let client = MockOAuthClient::new(MockRefreshOutcome::success("a", 60));
        assert_eq!(client.refresh_calls(), 0);

        client.refresh_access_token("r").await.expect("scripted success");
        client.refresh_access_token("r").await.expect("scripted success");
        assert_eq!(client.refresh_calls(), 2);
    }
}
