//! HTTP transport for chat-completion calls
//!
//! The transport is one POST per attempt: it sends a prebuilt JSON body and
//! hands back the status code with the raw body bytes. Deciding whether the
//! attempt succeeded is left to the retry orchestrator.

pub mod client;
pub mod error;

pub use client::ReqwestTransport;
pub use error::TransportError;

use crate::config::SecretString;
use async_trait::async_trait;
use std::borrow::Cow;
use std::time::Duration;
use uuid::Uuid;

/// Status code that marks a successful attempt
pub const STATUS_OK: u16 = 200;

/// Options for one attempt
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Unique request ID for correlation
    pub request_id: Uuid,

    /// Total timeout for the attempt
    pub timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RequestOptions {
    /// Create options with a fresh request ID and the given timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timeout,
        }
    }
}

/// Raw outcome of one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body, accumulated chunk by chunk
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Create a response from a status and body
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is exactly 200
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Body as text; invalid UTF-8 is replaced rather than rejected
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Trait for HTTP transports
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST `body` as JSON to `url` with a bearer `credential`
    async fn post_json(
        &self,
        url: &str,
        credential: &SecretString,
        body: &str,
        options: &RequestOptions,
    ) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    async fn post_json(
        &self,
        url: &str,
        credential: &SecretString,
        body: &str,
        options: &RequestOptions,
    ) -> Result<TransportResponse, TransportError> {
        (**self).post_json(url, credential, body, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_200_is_ok() {
        assert!(TransportResponse::new(200, "{}").is_ok());
        assert!(!TransportResponse::new(201, "{}").is_ok());
        assert!(!TransportResponse::new(500, "").is_ok());
    }

    #[test]
    fn test_body_text_is_lossy() {
        let response = TransportResponse::new(200, vec![b'o', b'k', 0xff]);
        assert_eq!(response.body_text(), "ok\u{fffd}");
    }

    #[test]
    fn test_request_options() {
        let options = RequestOptions::new(Duration::from_secs(5));
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_ne!(options.request_id, RequestOptions::default().request_id);
    }
}
