//! Protocol module for chat-completion request/response structures
//!
//! The request side is a fixed-format JSON body assembled from three fields.
//! The response side is only modelled for the structured extraction mode;
//! the default path never deserializes it.

pub mod types;

pub use types::{
    ChatCompletionResponse, ChatRequest, CompletionUsage, ResponseChoice, ResponseMessage,
};
