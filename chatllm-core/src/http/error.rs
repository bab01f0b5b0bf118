//! Transport error types and HTTP error-body helpers

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while performing one attempt
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The attempt exceeded its total timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connecting to the endpoint failed
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request could not be sent
    #[error("request failed: {0}")]
    Request(String),

    /// Reading the response body failed
    #[error("failed to read response body: {0}")]
    Body(String),

    /// The response body exceeded the configured limit
    #[error("response size {size} exceeds maximum {max}")]
    ResponseTooLarge { size: usize, max: usize },

    /// A header could not be encoded
    #[error("invalid value for header '{name}'")]
    InvalidHeader { name: &'static str },
}

impl TransportError {
    /// Map a reqwest error raised during an attempt with the given timeout
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(timeout)
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Understands `{"error":{"message":..}}`, `{"message":..}` and
/// `{"error":"..."}`. Used for diagnostics only.
pub fn extract_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;

    if let Some(message) = json
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|v| v.as_str())
    {
        return Some(message.to_string());
    }

    if let Some(message) = json.get("message").and_then(|v| v.as_str()) {
        return Some(message.to_string());
    }

    json.get("error")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
