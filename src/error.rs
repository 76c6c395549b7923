use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error body returned by the API on failed requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiError {
    /// API-level error code, 0 when the reply carried none
    #[serde(default)]
    pub error_code: i32,
    /// Human-readable description, or the raw reply body when the reply
    /// was not a well-formed error object
    #[serde(default)]
    pub error_description: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.error_description, self.error_code)
    }
}

/// Main error type for API operations
#[derive(Debug, Error)]
pub enum Error {
    /// Request was rejected as unauthorized and the token refresh budget
    /// could not recover it
    #[error("authentication failed: {0}")]
    Authentication(ApiError),

    /// Requested object does not exist
    #[error("not found: {0}")]
    NotFound(ApiError),

    /// Server-side failure or request rejected for other reasons
    #[error("server error: {0}")]
    Server(ApiError),

    /// Reply status outside the ranges the API is documented to produce
    #[error("unexpected HTTP status {0}")]
    Protocol(u16),

    /// Operation rejected locally, before any request was sent
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Invalid or unreadable client configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A session task panicked or was cancelled
    #[error("session task failed: {0}")]
    Task(String),

    /// HTTP transport error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error is an authentication failure
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication(_))
    }

    /// Check if this error is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Get the code carried by the API error reply, if any
    pub fn error_code(&self) -> Option<i32> {
        match self {
            Error::Authentication(e) | Error::NotFound(e) | Error::Server(e) => Some(e.error_code),
            Error::Protocol(status) => Some(*status as i32),
            _ => None,
        }
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, Error>;
