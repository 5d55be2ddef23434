//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Unknown hosted service '{0}' (expected catalog, qc or qa)")]
    UnknownService(String),

    #[error("No services configured to host")]
    NoServices,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid gateway URL for {0}")]
    InvalidGatewayUrl(&'static str),

    #[error("Gateway timeout must be between 1ms and 300s")]
    InvalidGatewayTimeout,

    #[error("Review window must be between 1 and 365 days")]
    InvalidReviewWindow,

    #[error("Checklist category '{0}' is listed more than once")]
    DuplicateChecklistItem(String),

    #[error("Invalid target tolerance '{0}'")]
    InvalidTolerance(String),
}
