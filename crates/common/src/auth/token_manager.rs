//! Token manager for the persisted refresh lifecycle
//!
//! Owns the refresh decision:
//! - Re-reads the token record from the store on every request
//! - Runs the refresh protocol when the record is absent or expired
//! - Coalesces concurrent refresh attempts into a single in-flight exchange
//! - Persists the new access token and expiry together, never separately

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::client::OAuthClientError;
use super::traits::{OAuthClientTrait, TokenStore};
use super::types::{TokenPatch, TokenState};

/// Error type for token manager operations
#[derive(Debug)]
pub enum TokenManagerError {
    /// The store has no usable refresh token; re-authorization is required
    /// out of band
    NoRefreshToken,

    /// The refresh exchange failed (network error, timeout, or provider
    /// rejection); the caller may retry later
    RefreshFailed(String),

    /// The provider returned a success response missing the expected token
    /// fields
    InvalidTokenResponse(String),

    /// Token store operation failed
    Store(String),
}

impl std::fmt::Display for TokenManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRefreshToken => write!(f, "No refresh token available"),
            Self::RefreshFailed(msg) => write!(f, "Token refresh failed: {msg}"),
            Self::InvalidTokenResponse(msg) => write!(f, "Invalid token response: {msg}"),
            Self::Store(msg) => write!(f, "Token store error: {msg}"),
        }
    }
}

impl std::error::Error for TokenManagerError {}

impl From<OAuthClientError> for TokenManagerError {
    fn from(err: OAuthClientError) -> Self {
        match err {
            OAuthClientError::InvalidResponse(msg) => Self::InvalidTokenResponse(msg),
            other => Self::RefreshFailed(other.to_string()),
        }
    }
}

/// Token manager for one integration's refresh cycle
///
/// The store is the single source of truth: the manager keeps no in-memory
/// token cache, so every caller observes whatever the last completed refresh
/// persisted. A `tokio::sync::Mutex` serializes refreshes; callers that lose
/// the race re-read the store after the winner finishes and return the fresh
/// token without issuing a second exchange.
pub struct TokenManager<C: OAuthClientTrait + 'static, S: TokenStore + 'static> {
    oauth_client: Arc<C>,
    store: Arc<S>,
    refresh_lock: Mutex<()>,
}

impl<C: OAuthClientTrait + 'static, S: TokenStore + 'static> TokenManager<C, S> {
    /// Create a new token manager
    ///
    /// # Arguments
    /// * `oauth_client` - OAuth client for the refresh exchange
    /// * `store` - Durable single-record token store
    #[must_use]
    pub fn new(oauth_client: C, store: Arc<S>) -> Self {
        Self { oauth_client: Arc::new(oauth_client), store, refresh_lock: Mutex::new(()) }
    }

    /// Classify the stored token record right now.
    ///
    /// # Errors
    /// Returns error if the store read fails
    pub async fn token_state(&self) -> Result<TokenState, TokenManagerError> {
        match self.store.load().await.map_err(TokenManagerError::Store)? {
            None => Ok(TokenState::Absent),
            Some(record) => Ok(record.state_at(Utc::now())),
        }
    }

    /// Get a valid access token, refreshing first if needed.
    ///
    /// This is the primary method for retrieving access tokens. The returned
    /// token is valid at the instant of return per the store's expiry
    /// bookkeeping; no guarantee it stays valid while the caller uses it.
    /// At most one refresh runs per call, and concurrent callers share a
    /// single in-flight refresh.
    ///
    /// # Errors
    /// Returns error if:
    /// - The store has no refresh token ([`TokenManagerError::NoRefreshToken`])
    /// - The refresh exchange fails; no internal retry is performed
    pub async fn get_access_token(&self) -> Result<String, TokenManagerError> {
        if let TokenState::Valid(token) = self.token_state().await? {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        // A concurrent caller may have finished the refresh while this one
        // waited on the lock.
        if let TokenState::Valid(token) = self.token_state().await? {
            debug!("token already refreshed by a concurrent caller");
            return Ok(token);
        }

        self.refresh_locked().await?;

        match self.token_state().await? {
            TokenState::Valid(token) => Ok(token),
            _ => Err(TokenManagerError::RefreshFailed(
                "store did not contain a valid token after refresh".to_string(),
            )),
        }
    }

    /// Run the refresh protocol against the provider.
    ///
    /// Loads the stored refresh token, performs the exchange, and persists
    /// the new access token and expiry in one save. A failed refresh writes
    /// nothing.
    ///
    /// # Errors
    /// Returns error if no refresh token is stored or the exchange fails
    pub async fn refresh_access_token(&self) -> Result<(), TokenManagerError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Seed the store with an out-of-band refresh token.
    ///
    /// Re-authorization happens outside this library; this plants the
    /// resulting credential so the refresh cycle can run.
    ///
    /// # Errors
    /// Returns error if the store write fails
    pub async fn install_refresh_token(
        &self,
        refresh_token: impl Into<String> + Send,
    ) -> Result<(), TokenManagerError> {
        let patch =
            TokenPatch { refresh_token: Some(refresh_token.into()), ..TokenPatch::default() };
        self.store.save(&patch).await.map_err(TokenManagerError::Store)?;

        info!("refresh token installed");
        Ok(())
    }

    /// Expose the underlying store (primarily for tests).
    #[must_use]
    pub fn store(&self) -> Arc<S> {
        self.store.clone()
    }

    /// The refresh protocol body. Callers must hold `refresh_lock`.
    async fn refresh_locked(&self) -> Result<(), TokenManagerError> {
        let record = self.store.load().await.map_err(TokenManagerError::Store)?;
        let refresh_token = record
            .and_then(|r| r.refresh_token)
            .filter(|t| !t.is_empty())
            .ok_or(TokenManagerError::NoRefreshToken)?;

        let response = self.oauth_client.refresh_access_token(&refresh_token).await?;

        let expires_in = response.expires_in;
        let patch = TokenPatch {
            access_token: Some(response.access_token),
            // Persist a rotated refresh token when the provider returns one;
            // None leaves the stored credential untouched.
            refresh_token: response.refresh_token,
            expires_at: Some(Utc::now() + Duration::seconds(expires_in)),
        };
        self.store.save(&patch).await.map_err(TokenManagerError::Store)?;

        info!(expires_in, "access token refreshed");
        Ok(())
    }
}
