//! Configuration structures for the LeadLink connector.

use serde::{Deserialize, Serialize};

/// Default Zoho OAuth token endpoint.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://accounts.zoho.com/oauth/v2/token";

/// Default Zoho CRM REST base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://www.zohoapis.com/crm/v2";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub zoho: ZohoConfig,
}

/// Token store database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path.
    pub path: String,

    /// Connection pool size.
    pub pool_size: u32,
}

/// Zoho OAuth application and API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZohoConfig {
    /// OAuth client ID of the registered Zoho application.
    pub client_id: String,

    /// OAuth client secret of the registered Zoho application.
    pub client_secret: String,

    /// Redirect URI registered with the Zoho application.
    pub redirect_uri: String,

    /// OAuth token endpoint used for the refresh exchange.
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,

    /// Base URL of the CRM REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_token_endpoint() -> String {
    DEFAULT_TOKEN_ENDPOINT.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}
