//! OAuth refresh-token lifecycle
//!
//! This module implements the token lifecycle for a single external
//! integration: one persisted token record, refreshed through the provider's
//! `refresh_token` grant when it expires.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  TokenManager   │  Owns the refresh decision
//! └────────┬────────┘
//!          │
//!          ├──► OAuthClient   (HTTP refresh exchange)
//!          │
//!          └──► TokenStore    (durable single-record storage)
//! ```
//!
//! The manager never caches tokens in memory: the store is the single source
//! of truth, every decision re-reads it, and concurrent refresh attempts are
//! coalesced so at most one exchange is in flight per process.
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use leadlink_common::auth::{OAuthClient, OAuthConfig, TokenManager};
//! use leadlink_common::testing::MemoryTokenStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OAuthConfig::new(
//!         "your_client_id".to_string(),
//!         "your_client_secret".to_string(),
//!         "https://example.com/callback".to_string(),
//!         "https://accounts.zoho.com/oauth/v2/token".to_string(),
//!     );
//!
//!     let store = Arc::new(MemoryTokenStore::new());
//!     let manager = TokenManager::new(OAuthClient::new(config), store);
//!
//!     // Plant the out-of-band refresh token once.
//!     manager.install_refresh_token("refresh_token_from_authorization").await?;
//!
//!     // Get a valid access token (refreshes on demand).
//!     let access_token = manager.get_access_token().await?;
//!     println!("Access token: {access_token}");
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod token_manager;
pub mod traits;
pub mod types;

pub use client::{OAuthClient, OAuthClientError};
pub use token_manager::{TokenManager, TokenManagerError};
pub use traits::{OAuthClientTrait, TokenStore};
pub use types::{OAuthConfig, TokenPatch, TokenRecord, TokenResponse, TokenState};
