//! Client configuration schema

use super::error::ValidationError;
use super::secrets::SecretString;
use crate::extract::ExtractionMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default chat-completions host
pub const DEFAULT_BASE_URL: &str = "https://free.v36.cm";

/// Default chat-completions path
pub const DEFAULT_API_PATH: &str = "/v1/chat/completions";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default total timeout for one attempt
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Largest response body accepted for one attempt (10MB)
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

/// Configuration for a [`ChatClient`](crate::client::ChatClient)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme and host of the endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path appended to `base_url`
    #[serde(default = "default_api_path")]
    pub api_path: String,

    /// Bearer credential; absent or empty disables every call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    /// Model used by `chat_with_defaults`
    #[serde(default = "default_model")]
    pub model: String,

    /// Attempt limit used by `chat_with_defaults`
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Temperature used by `chat_with_defaults`
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Total timeout for one attempt, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout, in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Pause between attempts, in milliseconds
    #[serde(default)]
    pub retry_pause_ms: u64,

    /// Report each failed attempt at WARN level
    #[serde(default = "default_diagnostics")]
    pub diagnostics: bool,

    /// How content is extracted from response bodies
    #[serde(default)]
    pub extraction: ExtractionMode,

    /// Largest response body accepted for one attempt
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_path() -> String {
    DEFAULT_API_PATH.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_diagnostics() -> bool {
    true
}

fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_path: default_api_path(),
            api_key: None,
            model: default_model(),
            max_attempts: default_max_attempts(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            retry_pause_ms: 0,
            diagnostics: default_diagnostics(),
            extraction: ExtractionMode::default(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl ClientConfig {
    /// Set the bearer credential
    pub fn with_api_key(mut self, key: impl Into<SecretString>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the endpoint base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-attempt timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Set the extraction mode
    pub fn with_extraction(mut self, mode: ExtractionMode) -> Self {
        self.extraction = mode;
        self
    }

    /// Enable or disable per-attempt diagnostics
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// The credential, if one is configured and non-empty
    pub fn credential(&self) -> Option<&SecretString> {
        self.api_key.as_ref().filter(|key| !key.is_empty())
    }

    /// Full URL of the chat-completions endpoint
    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.api_path)
    }

    /// Total timeout for one attempt
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Pause between attempts
    pub fn retry_pause(&self) -> Duration {
        Duration::from_millis(self.retry_pause_ms)
    }

    /// Built-in validation of field values
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::required("base_url"));
        }
        if !self.api_path.starts_with('/') {
            return Err(ValidationError::invalid_format(
                "api_path",
                format!("'{}' must start with '/'", self.api_path),
            ));
        }
        if self.model.is_empty() {
            return Err(ValidationError::required("model"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::out_of_range(
                "timeout_secs",
                "must be at least 1 second",
            ));
        }
        if self.max_response_bytes == 0 {
            return Err(ValidationError::out_of_range(
                "max_response_bytes",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
