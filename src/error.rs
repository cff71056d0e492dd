//! Error types for the MimiMoe source adapter.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong.

use thiserror::Error;

/// Main error type for source operations.
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request failed or the server returned a non-success status
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Response body was not valid JSON
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A required field is absent from the response
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A field is present but has the wrong JSON type
    #[error("Invalid field '{field}': expected {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },

    /// URL parsing or validation failed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The source doesn't recognise this URL
    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    /// The operation is not implemented by this source
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}
