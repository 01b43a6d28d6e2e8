/*
[INPUT]:  Error sources (HTTP, API, serialization, auth, configuration)
[OUTPUT]: Structured error types with context
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the Vantage client
#[derive(Error, Debug)]
pub enum VantageError {
    /// HTTP request failed (network, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("API error (code {code}): {message}")]
    Api { code: i32, message: String },

    /// Response body is not valid JSON or lacks expected fields
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A method parameter is outside its allowed enumeration
    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),

    /// The requested asset is unknown to the remote API
    #[error("Asset not available: {0}")]
    AssetNotAvailable(String),
}

impl VantageError {
    /// Check if error indicates a transport-level failure
    pub fn is_transport(&self) -> bool {
        matches!(self, VantageError::Http(_))
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        VantageError::Api {
            code: status.as_u16() as i32,
            message: message.into(),
        }
    }
}

/// Result type alias for Vantage operations
pub type Result<T> = std::result::Result<T, VantageError>;
