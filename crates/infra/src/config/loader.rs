//! Configuration loader
//!
//! Loads connector configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `LEADLINK_DB_PATH`: Token database file path
//! - `LEADLINK_DB_POOL_SIZE`: Connection pool size
//! - `LEADLINK_ZOHO_CLIENT_ID`: OAuth client ID
//! - `LEADLINK_ZOHO_CLIENT_SECRET`: OAuth client secret
//! - `LEADLINK_ZOHO_REDIRECT_URI`: OAuth redirect URI
//! - `LEADLINK_ZOHO_TOKEN_ENDPOINT`: OAuth token endpoint (optional)
//! - `LEADLINK_ZOHO_API_BASE_URL`: CRM REST base URL (optional)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./leadlink.json` or `./leadlink.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use leadlink_domain::{
    Config, DatabaseConfig, LeadLinkError, Result, ZohoConfig, DEFAULT_API_BASE_URL,
    DEFAULT_TOKEN_ENDPOINT,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `LeadLinkError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present; the endpoint
/// variables fall back to the Zoho production defaults.
///
/// # Errors
/// Returns `LeadLinkError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("LEADLINK_DB_PATH")?;
    let db_pool_size = env_var("LEADLINK_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| LeadLinkError::Config(format!("Invalid pool size: {}", e)))
    })?;

    let client_id = env_var("LEADLINK_ZOHO_CLIENT_ID")?;
    let client_secret = env_var("LEADLINK_ZOHO_CLIENT_SECRET")?;
    let redirect_uri = env_var("LEADLINK_ZOHO_REDIRECT_URI")?;
    let token_endpoint = std::env::var("LEADLINK_ZOHO_TOKEN_ENDPOINT")
        .unwrap_or_else(|_| DEFAULT_TOKEN_ENDPOINT.to_string());
    let api_base_url = std::env::var("LEADLINK_ZOHO_API_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        zoho: ZohoConfig { client_id, client_secret, redirect_uri, token_endpoint, api_base_url },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `LeadLinkError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LeadLinkError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LeadLinkError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LeadLinkError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LeadLinkError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LeadLinkError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(LeadLinkError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent, and the executable's
/// directory for `config.{json,toml}` and `leadlink.{json,toml}`.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("leadlink.json"),
            cwd.join("leadlink.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("leadlink.json"),
                exe_dir.join("leadlink.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `LeadLinkError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        LeadLinkError::Config(format!("Missing required environment variable: {}", key))
    })
}
