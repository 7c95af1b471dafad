//! Error types for the modtree crate

use thiserror::Error;

/// Result type for modtree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for modtree operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The login exchange itself was rejected by the backend
    #[error("Authentication error: {0}")]
    Auth(String),

    /// An authenticated call was rejected because the credential is invalid
    /// or expired; recoverable by re-acquiring the token
    #[error("Authentication token expired")]
    TokenExpired,

    /// The backend returned a non-auth failure response
    #[error("Request failed: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Report or settings file I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
