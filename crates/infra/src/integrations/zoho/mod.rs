//! Zoho CRM integration.
//!
//! `client` wraps the CRM REST endpoints; `auth` wires the shared token
//! lifecycle into Zoho-specific configuration.

pub mod auth;
pub mod client;

pub use auth::{create_zoho_auth_service, create_zoho_oauth_config, ZohoAuthService};
pub use client::{AccessTokenProvider, ZohoClient};
