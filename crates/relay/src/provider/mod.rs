//! Completion provider access.
//!
//! Handlers only talk to `dyn CompletionProvider`; the OpenAI-compatible
//! HTTP client is the production implementation.

mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use quill_common::RelayError;
use quill_common::constants::messages;

/// Role-tagged chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Non-2xx answer; `message` is the provider's own when it sent one
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Transport(#[source] reqwest::Error),

    /// 2xx answer without usable completion text
    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

impl From<ProviderError> for RelayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Api { status, message } => RelayError::Upstream { status, message },
            ProviderError::Timeout => RelayError::Upstream {
                status: 504,
                message: messages::UPSTREAM_TIMEOUT.to_string(),
            },
            ProviderError::Transport(_) => RelayError::Upstream {
                status: 502,
                message: messages::UPSTREAM_UNREACHABLE.to_string(),
            },
            ProviderError::Malformed(_) => {
                RelayError::UpstreamProtocol(messages::UPSTREAM_MALFORMED.to_string())
            }
        }
    }
}

/// A chat-completion backend. One call, no retries.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the completion text of the first choice, untrimmed.
    async fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<String, ProviderError>;
}
