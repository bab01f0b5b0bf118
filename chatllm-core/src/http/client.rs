//! HTTP transport implementation using reqwest

use crate::config::{ClientConfig, SecretString};
use crate::http::error::TransportError;
use crate::http::{HttpTransport, RequestOptions, TransportResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, warn};

/// Default user agent
const USER_AGENT: &str = concat!("chatllm/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed transport.
///
/// Idle connections are not kept: every attempt opens its own connection.
#[derive(Clone)]
pub struct ReqwestTransport {
    /// The underlying reqwest client
    client: Client,

    /// Maximum response size to prevent OOM
    max_response_size: usize,
}

impl ReqwestTransport {
    /// Create a transport configured from `config`
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = build_client(config.connect_timeout(), config.timeout())?;
        Ok(Self::from_client(client, config.max_response_bytes))
    }

    /// Wrap an existing client, e.g. one owned by the process-wide runtime
    pub fn from_client(client: Client, max_response_size: usize) -> Self {
        Self {
            client,
            max_response_size,
        }
    }

    /// Maximum accepted response size in bytes
    pub fn max_response_size(&self) -> usize {
        self.max_response_size
    }

    fn check_size(&self, size: usize) -> Result<(), TransportError> {
        if size > self.max_response_size {
            return Err(TransportError::ResponseTooLarge {
                size,
                max: self.max_response_size,
            });
        }
        Ok(())
    }
}

/// Build a reqwest client with pooling disabled
pub fn build_client(
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<Client, TransportError> {
    ClientBuilder::new()
        .pool_max_idle_per_host(0)
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| TransportError::Request(format!("failed to create HTTP client: {}", e)))
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        credential: &SecretString,
        body: &str,
        options: &RequestOptions,
    ) -> Result<TransportResponse, TransportError> {
        let request_id = options.request_id;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", credential.expose_secret()))
            .map_err(|_| TransportError::InvalidHeader {
                name: "Authorization",
            })?;
        auth.set_sensitive(true);

        debug!(%request_id, url, body_len = body.len(), "sending chat request");

        let mut response = self
            .client
            .post(url)
            .timeout(options.timeout)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, auth)
            .header("X-Request-ID", request_id.to_string())
            .body(body.to_owned())
            .send()
            .await
            .map_err(|e| {
                let err = TransportError::from_reqwest(e, options.timeout);
                warn!(%request_id, error = %err, "request failed");
                err
            })?;

        let status = response.status().as_u16();
        debug!(%request_id, status, "response status");

        if let Some(content_length) = response.content_length() {
            self.check_size(usize::try_from(content_length).unwrap_or(usize::MAX))?;
        }

        // Fresh buffer per attempt; chunks are appended as they arrive.
        let mut buffer = Vec::with_capacity(
            response
                .content_length()
                .map_or(0, |len| len as usize)
                .min(self.max_response_size),
        );

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| TransportError::from_reqwest(e, options.timeout))?
        {
            self.check_size(buffer.len() + chunk.len())?;
            buffer.extend_from_slice(&chunk);
        }

        debug!(%request_id, status, bytes = buffer.len(), "response body received");

        Ok(TransportResponse {
            status,
            body: buffer,
        })
    }
}
