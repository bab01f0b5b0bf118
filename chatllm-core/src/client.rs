//! Retry orchestrator for chat-completion calls
//!
//! [`ChatClient::chat`] is the whole public contract: prompt, model, attempt
//! limit and temperature in; the first choice's content out, or `None`.
//! An attempt only counts as a success when the status is exactly 200 and
//! content extraction succeeds; anything else is retried until the attempt
//! limit is reached.

use crate::config::{ClientConfig, SecretString};
use crate::error::{ChatError, ChatResult};
use crate::http::error::extract_error_message;
use crate::http::{HttpTransport, ReqwestTransport, RequestOptions};
use crate::protocol::ChatRequest;
use crate::retry::{AttemptFailure, RetryExecutor, RetryPolicy};
use tracing::{debug, info, warn};

/// Successful call result with attempt bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    /// Extracted content
    pub content: String,

    /// Attempts made, including the successful one
    pub attempts: u32,

    /// Failures of the attempts before the successful one
    pub failures: Vec<AttemptFailure>,
}

/// Chat-completion client
pub struct ChatClient<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
}

impl ChatClient<ReqwestTransport> {
    /// Create a client with a reqwest transport built from `config`
    pub fn new(config: ClientConfig) -> ChatResult<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self { config, transport })
    }
}

impl<T: HttpTransport> ChatClient<T> {
    /// Create a client over an existing transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `prompt` and return the extracted content, or `None` on any failure
    pub async fn chat(
        &self,
        prompt: &str,
        model: &str,
        tries: u32,
        temperature: f32,
    ) -> Option<String> {
        match self.try_chat(prompt, model, tries, temperature).await {
            Ok(outcome) => Some(outcome.content),
            Err(err) => {
                debug!(error = %err, "chat call produced no content");
                None
            }
        }
    }

    /// Like [`chat`](Self::chat), using model, attempts and temperature from the config
    pub async fn chat_with_defaults(&self, prompt: &str) -> Option<String> {
        self.chat(
            prompt,
            &self.config.model,
            self.config.max_attempts,
            self.config.temperature,
        )
        .await
    }

    /// Send `prompt` and report why the call failed when it does.
    ///
    /// A missing or empty credential fails before any request is made.
    pub async fn try_chat(
        &self,
        prompt: &str,
        model: &str,
        tries: u32,
        temperature: f32,
    ) -> ChatResult<ChatOutcome> {
        let Some(credential) = self.config.credential() else {
            warn!("no API credential configured; skipping request");
            return Err(ChatError::MissingCredential);
        };

        let body = ChatRequest::new(model, prompt, temperature).to_json_body();
        let url = self.config.endpoint_url();
        let policy = RetryPolicy::new(tries).with_pause(self.config.retry_pause());

        info!(
            model,
            max_attempts = policy.attempts(),
            url = %url,
            "Executing chat request"
        );

        let executor = RetryExecutor::new(policy).with_diagnostics(self.config.diagnostics);
        let (url, body) = (url.as_str(), body.as_str());
        let result = executor
            .execute(move |attempt| self.attempt(attempt, url, credential, body))
            .await;

        match result.result {
            Some(content) => {
                info!(attempts = result.attempts, "Chat request completed successfully");
                Ok(ChatOutcome {
                    content,
                    attempts: result.attempts,
                    failures: result.failures,
                })
            }
            None => Err(ChatError::Exhausted {
                attempts: result.attempts,
                failures: result.failures,
            }),
        }
    }

    /// One request/response cycle
    async fn attempt(
        &self,
        attempt: u32,
        url: &str,
        credential: &SecretString,
        body: &str,
    ) -> Result<String, AttemptFailure> {
        let options = RequestOptions::new(self.config.timeout());
        let request_id = options.request_id;
        let response = self
            .transport
            .post_json(url, credential, body, &options)
            .await?;

        if !response.is_ok() {
            let detail = extract_error_message(&response.body_text());
            debug!(
                %request_id,
                attempt,
                status = response.status,
                detail = detail.as_deref().unwrap_or(""),
                "non-success status"
            );
            return Err(AttemptFailure::Status(response.status));
        }

        self.config
            .extraction
            .extract(&response.body_text())
            .ok_or_else(|| {
                debug!(%request_id, attempt, bytes = response.body.len(), "no content in response body");
                AttemptFailure::Extraction
            })
    }
}
