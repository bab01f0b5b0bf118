//! Top-level error type for chat calls

use crate::http::error::TransportError;
use crate::retry::AttemptFailure;
use thiserror::Error;

/// Result type for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Errors surfaced by [`ChatClient`](crate::client::ChatClient) and the network runtime
#[derive(Debug, Error)]
pub enum ChatError {
    /// No credential configured; no request was sent
    #[error("no API credential configured (set the KEY environment variable)")]
    MissingCredential,

    /// Every attempt failed
    #[error("all {attempts} attempt(s) failed")]
    Exhausted {
        attempts: u32,
        failures: Vec<AttemptFailure>,
    },

    /// The HTTP transport could not be set up
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),

    /// The async runtime could not be started
    #[error("failed to start network runtime: {0}")]
    Runtime(String),

    /// `NetworkRuntime::init` was called while a runtime is live
    #[error("network runtime is already initialized")]
    AlreadyInitialized,
}

impl ChatError {
    /// Last per-attempt failure, when the call ran out of attempts
    pub fn last_failure(&self) -> Option<&AttemptFailure> {
        match self {
            Self::Exhausted { failures, .. } => failures.last(),
            _ => None,
        }
    }
}
