//! Core protocol types for chat-completion calls

use crate::escape::json_escape;
use serde::{Deserialize, Serialize};

/// A single-turn chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier, embedded verbatim in the body
    pub model: String,

    /// User prompt, escaped when the body is built
    pub prompt: String,

    /// Sampling temperature (not validated)
    pub temperature: f32,
}

impl ChatRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature,
        }
    }

    /// Render the request body sent to the chat-completions endpoint.
    ///
    /// The shape is fixed: one user message, temperature with two decimals.
    pub fn to_json_body(&self) -> String {
        format!(
            r#"{{"model":"{}","messages":[{{"role":"user","content":"{}"}}],"temperature":{:.2}}}"#,
            self.model,
            json_escape(&self.prompt),
            self.temperature
        )
    }
}

/// Chat-completion response, as far as structured extraction needs it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    pub choices: Vec<ResponseChoice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<CompletionUsage>,
}

/// One completion choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseChoice {
    #[serde(default)]
    pub index: u32,

    pub message: ResponseMessage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Assistant message inside a choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}

/// Token accounting
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CompletionUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
