//! OAuth 2.0 refresh-grant client
//!
//! Performs the form-encoded `refresh_token` exchange against the provider
//! token endpoint and parses the token response.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::traits::OAuthClientTrait;
use super::types::{OAuthConfig, TokenResponse};

const REFRESH_TIMEOUT_SECS: u64 = 30;

/// Error type for OAuth client operations
#[derive(Debug)]
pub enum OAuthClientError {
    /// HTTP request failed (connect error, timeout)
    RequestFailed(reqwest::Error),

    /// Provider returned a non-success status; original payload attached
    Provider { status: u16, body: String },

    /// Provider returned a success response missing or mistyping the
    /// expected token fields
    InvalidResponse(String),
}

impl std::fmt::Display for OAuthClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestFailed(e) => write!(f, "HTTP request failed: {e}"),
            Self::Provider { status, body } => {
                write!(f, "token endpoint rejected refresh (HTTP {status}): {body}")
            }
            Self::InvalidResponse(msg) => write!(f, "malformed token response: {msg}"),
        }
    }
}

impl std::error::Error for OAuthClientError {}

impl From<reqwest::Error> for OAuthClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed(err)
    }
}

/// OAuth 2.0 client for the refresh-token grant.
///
/// Holds the application credentials and issues the refresh exchange. The
/// underlying HTTP client carries the ambient 30 second timeout; a timeout
/// surfaces as [`OAuthClientError::RequestFailed`].
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    client: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with the given configuration
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REFRESH_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// Issues a form-encoded POST to the token endpoint with
    /// `refresh_token`, `client_id`, `client_secret`, `redirect_uri` and
    /// `grant_type=refresh_token`.
    ///
    /// # Errors
    /// Returns error if:
    /// - The request fails at the transport level (network error, timeout)
    /// - The provider responds with a non-success status
    /// - The success response is missing `access_token` or `expires_in`
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        let params = [
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "refresh_token"),
        ];

        debug!(endpoint = %self.config.token_endpoint, "requesting access token refresh");

        let response =
            self.client.post(&self.config.token_endpoint).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthClientError::Provider { status: status.as_u16(), body });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| OAuthClientError::InvalidResponse(e.to_string()))
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }
}

#[async_trait]
impl OAuthClientTrait for OAuthClient {
    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.refresh_access_token(refresh_token).await
    }
}
