//! Ports for the refresh exchange and token storage
//!
//! These traits abstract the provider HTTP call and the persistence engine
//! so the token lifecycle can be exercised with in-memory and mock
//! implementations.

use async_trait::async_trait;

use super::client::OAuthClientError;
use super::types::{TokenPatch, TokenRecord, TokenResponse};

/// Trait for the provider-side refresh exchange.
#[async_trait]
pub trait OAuthClientTrait: Send + Sync {
    /// Exchange a refresh token for a new access token.
    ///
    /// # Arguments
    /// * `refresh_token` - Refresh token from a previous authorization
    ///
    /// # Errors
    /// Returns error if the request fails, the provider rejects the grant,
    /// or the success response is malformed.
    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError>;
}

/// Trait for the durable single-record token store.
///
/// Implementations own physical persistence and must serialize concurrent
/// writers: a `save` is applied atomically and never interleaves with
/// another `save` in a way that mixes fields from two refresh cycles.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the current token record.
    ///
    /// # Returns
    /// `None` when no record has ever been saved - the explicit absent
    /// signal. A returned record is never partially populated.
    ///
    /// # Errors
    /// Returns error if the storage read fails
    async fn load(&self) -> Result<Option<TokenRecord>, String>;

    /// Apply a partial update to the record, creating it on first save.
    ///
    /// Fields that are `None` in the patch keep their stored value.
    ///
    /// # Errors
    /// Returns error if the storage write fails
    async fn save(&self, patch: &TokenPatch) -> Result<(), String>;
}
