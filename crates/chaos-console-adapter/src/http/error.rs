/*
[INPUT]:  Error sources (HTTP, API envelope, serialization, filter lookup)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

use crate::types::LookupError;

/// Main error type for the chaos console adapter
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: String, message: String },

    /// Authentication failed
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    /// Request timed out
    #[error("Request timeout after {duration}s")]
    Timeout { duration: u64 },

    /// Filter code has no status table entry
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl ConsoleError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            ConsoleError::Http(err) => !err.is_builder() && !err.is_decode(),
            ConsoleError::RateLimit { .. } | ConsoleError::Timeout { .. } => true,
            ConsoleError::Api { .. } => self.is_server_error(),
            _ => false,
        }
    }

    /// Check if the service answered with a 5xx status
    pub fn is_server_error(&self) -> bool {
        match self {
            ConsoleError::Api { code, .. } => code
                .parse::<u16>()
                .ok()
                .and_then(|code| StatusCode::from_u16(code).ok())
                .is_some_and(|status| status.is_server_error()),
            _ => false,
        }
    }

    /// Get retry delay in seconds (if retryable)
    pub fn retry_delay(&self) -> Option<u64> {
        match self {
            ConsoleError::RateLimit { retry_after } => Some(*retry_after),
            ConsoleError::Timeout { .. } => Some(1),
            _ => None,
        }
    }

    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ConsoleError::Authentication { .. })
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        ConsoleError::Api {
            code: status.as_u16().to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for chaos console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;
