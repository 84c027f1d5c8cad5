//! Error taxonomy shared by the relay and its clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::messages;

/// Every way a paraphrase request can fail at the relay
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing, empty, or out-of-range request fields
    #[error("{0}")]
    InvalidRequest(String),

    /// Client key exceeded its window ceiling
    #[error("{}", messages::RATE_LIMITED)]
    RateLimitExceeded,

    /// Browser origin is not on the allow-list
    #[error("{}", messages::ORIGIN_REJECTED)]
    OriginRejected,

    /// Relay is missing required configuration (e.g. the provider credential)
    #[error("{0}")]
    Configuration(String),

    /// Provider answered with a failure status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Provider answered with success but the payload was unusable
    #[error("{0}")]
    UpstreamProtocol(String),

    /// Anything else
    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::RateLimitExceeded => 429,
            Self::OriginRejected => 403,
            Self::Configuration(_) => 500,
            Self::Upstream { status, .. } if (400..=599).contains(status) => *status,
            Self::Upstream { .. } => 500,
            Self::UpstreamProtocol(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Stable machine-readable tag carried in [`ErrorBody::code`]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::RateLimitExceeded => "RATE_LIMITED",
            Self::OriginRejected => "ORIGIN_REJECTED",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::UpstreamProtocol(_) => "UPSTREAM_PROTOCOL_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True when the caller is at fault (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

/// JSON envelope for every relay error response: `{ "error": "...", "code": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }
}

impl From<&RelayError> for ErrorBody {
    fn from(err: &RelayError) -> Self {
        Self::new(err.to_string()).with_code(err.code())
    }
}
