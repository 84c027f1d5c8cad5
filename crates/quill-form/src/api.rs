//! Relay access for the form.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use quill_common::{ErrorBody, ParaphraseRequest, ParaphraseResponse};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Relay answered with an error envelope; `message` is shown verbatim
    #[error("{message}")]
    Relay { status: u16, message: String },

    #[error("Failed to reach the paraphrasing service")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to paraphrase text")]
    Malformed(String),
}

/// The relay's paraphrase operation
#[async_trait]
pub trait RelayApi: Send + Sync {
    async fn paraphrase(&self, request: &ParaphraseRequest) -> Result<String, ClientError>;
}

/// reqwest client for `{base_url}/api/paraphrase`
#[derive(Clone)]
pub struct HttpRelayClient {
    client: Client,
    endpoint: String,
}

impl HttpRelayClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build().context("Failed to build HTTP client")?,
            endpoint: format!("{}/api/paraphrase", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RelayApi for HttpRelayClient {
    async fn paraphrase(&self, request: &ParaphraseRequest) -> Result<String, ClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ClientError::Transport)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

            tracing::debug!(status = status.as_u16(), %message, "Relay rejected paraphrase");
            return Err(ClientError::Relay {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<ParaphraseResponse>(&body)
            .map(|r| r.paraphrased_text)
            .map_err(|e| ClientError::Malformed(e.to_string()))
    }
}
