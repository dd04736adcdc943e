//! Token record and OAuth types for the refresh lifecycle
//!
//! Defines the single persisted token record, the partial update applied on
//! each refresh, and the explicit validity states callers branch on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single persisted OAuth token record for the integration.
///
/// At most one record exists per configured integration. It is created when
/// the refresh token is first seeded, mutated in place on every refresh, and
/// never deleted during normal operation. `access_token` and `expires_at`
/// are always written together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Short-lived bearer credential for CRM API calls.
    ///
    /// Absent until the first successful refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Long-lived credential used to mint new access tokens.
    ///
    /// Seeded out of band; rewritten only when the provider rotates it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Absolute instant after which `access_token` must not be used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenRecord {
    /// Classify this record at `now`.
    ///
    /// A record is `Valid` only when it carries a non-empty access token and
    /// `now < expires_at`. The boundary is non-strict: a token whose expiry
    /// equals `now` is already expired, so it is never used past its nominal
    /// lifetime.
    #[must_use]
    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        match (&self.access_token, self.expires_at) {
            (Some(token), Some(expires_at)) if !token.is_empty() && now < expires_at => {
                TokenState::Valid(token.clone())
            }
            _ => TokenState::Expired,
        }
    }

    /// Whether the access token is unusable at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        !matches!(self.state_at(now), TokenState::Valid(_))
    }

    /// Get seconds until token expiration
    ///
    /// # Returns
    /// `Some(seconds)` if an expiry is set, `None` otherwise
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - now).num_seconds())
    }
}

/// Validity of the stored token at a point in time.
///
/// Explicit variants replace thrown-error control flow for the "token
/// missing or expired" cases: callers branch on the state instead of
/// catching an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    /// The stored access token is usable; the bearer string is attached.
    Valid(String),

    /// A record exists but its access token is missing or past expiry.
    Expired,

    /// The store holds no record at all.
    Absent,
}

/// Partial update applied to the token record by a store `save`.
///
/// `None` fields keep their stored value. A save is applied atomically so
/// the record never mixes fields from two different refresh cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenPatch {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// OAuth token response from the provider's refresh exchange
///
/// `access_token` and `expires_in` are the fields the lifecycle depends on;
/// a success response missing or mistyping either is rejected as malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Access token lifetime in seconds.
    pub expires_in: i64,

    /// Present when the provider rotates the refresh token.
    pub refresh_token: Option<String>,
}

/// OAuth configuration for the refresh exchange.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Redirect URI registered with the provider
    pub redirect_uri: String,

    /// Absolute URL of the provider token endpoint
    pub token_endpoint: String,
}

impl OAuthConfig {
    /// Create a new OAuth configuration
    #[must_use]
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        token_endpoint: String,
    ) -> Self {
        Self { client_id, client_secret, redirect_uri, token_endpoint }
    }
}
