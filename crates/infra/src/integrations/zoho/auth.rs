//! Zoho OAuth wiring for the CRM client.
//!
//! Connects the shared token lifecycle (`leadlink-common::auth`) to the
//! Zoho-specific pieces: endpoint configuration from `ZohoConfig`, the
//! SQLite-backed store, and the `AccessTokenProvider` port the CRM client
//! consumes.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use leadlink_infra::integrations::zoho::{create_zoho_auth_service, ZohoClient};
//!
//! # async fn example(config: leadlink_domain::Config) -> leadlink_domain::Result<()> {
//! let auth_service = Arc::new(create_zoho_auth_service(&config));
//!
//! // Plant the out-of-band refresh token once per installation.
//! auth_service.install_refresh_token("refresh_token_from_authorization").await
//!     .map_err(|e| leadlink_domain::LeadLinkError::Auth(e.to_string()))?;
//!
//! // The client refreshes access tokens on demand through the service.
//! let client = ZohoClient::new(config.zoho.api_base_url.clone(), auth_service)?;
//! let lead = client.get_lead("1001").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use leadlink_common::auth::{
    OAuthClient, OAuthClientTrait, OAuthConfig, TokenManager, TokenManagerError, TokenStore,
};
use leadlink_domain::{Config, LeadLinkError, Result, ZohoConfig};

use crate::database::SqliteTokenStore;
use crate::integrations::zoho::client::AccessTokenProvider;

/// Concrete token manager wired for the Zoho integration.
pub type ZohoAuthService = TokenManager<OAuthClient, SqliteTokenStore>;

/// Build the OAuth refresh configuration for a Zoho application.
#[must_use]
pub fn create_zoho_oauth_config(config: &ZohoConfig) -> OAuthConfig {
    OAuthConfig::new(
        config.client_id.clone(),
        config.client_secret.clone(),
        config.redirect_uri.clone(),
        config.token_endpoint.clone(),
    )
}

/// Build the fully wired auth service from configuration.
///
/// The token store connects lazily, so this is cheap to call at startup.
#[must_use]
pub fn create_zoho_auth_service(config: &Config) -> ZohoAuthService {
    let oauth_config = create_zoho_oauth_config(&config.zoho);
    let store = Arc::new(SqliteTokenStore::new(config.database.clone()));
    TokenManager::new(OAuthClient::new(oauth_config), store)
}

/// Allow any token manager (and `Arc` of one) to be used where an
/// `AccessTokenProvider` is required.
#[async_trait]
impl<C, S> AccessTokenProvider for TokenManager<C, S>
where
    C: OAuthClientTrait + 'static,
    S: TokenStore + 'static,
{
    async fn access_token(&self) -> Result<String> {
        self.get_access_token().await.map_err(map_token_manager_error)
    }
}

fn map_token_manager_error(err: TokenManagerError) -> LeadLinkError {
    match err {
        TokenManagerError::NoRefreshToken => LeadLinkError::Auth(
            "no refresh token stored; re-authorize the integration".to_string(),
        ),
        TokenManagerError::RefreshFailed(msg) => LeadLinkError::Auth(msg),
        TokenManagerError::InvalidTokenResponse(msg) => LeadLinkError::Auth(msg),
        TokenManagerError::Store(msg) => LeadLinkError::Database(msg),
    }
}
