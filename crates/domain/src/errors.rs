//! Error types used throughout the workspace

use thiserror::Error;

/// Main error type for LeadLink
#[derive(Error, Debug)]
pub enum LeadLinkError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for LeadLink operations
pub type Result<T> = std::result::Result<T, LeadLinkError>;
