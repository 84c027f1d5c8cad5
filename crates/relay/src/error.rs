//! HTTP rendering of relay errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::any::Any;

use crate::config::Environment;
use quill_common::constants::messages;
use quill_common::{ErrorBody, RelayError};

/// A [`RelayError`] bound to the deployment mode that decides how much of it the
/// client may see. Lets handlers return `Result<T, ApiError>`.
#[derive(Debug)]
pub struct ApiError {
    error: RelayError,
    environment: Environment,
}

impl ApiError {
    pub fn new(error: RelayError, environment: Environment) -> Self {
        Self { error, environment }
    }

    pub fn error(&self) -> &RelayError {
        &self.error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.error.is_client_error() {
            tracing::warn!(status = status.as_u16(), code = self.error.code(), error = %self.error, "Request rejected");
        } else {
            tracing::error!(status = status.as_u16(), code = self.error.code(), error = %self.error, "Request failed");
        }

        let mut body = ErrorBody::from(&self.error);
        if matches!(self.error, RelayError::Internal(_)) && self.environment.is_production() {
            body.error = messages::INTERNAL.to_string();
        }

        (status, Json(body)).into_response()
    }
}

/// Builds the response for a panic caught while handling a request.
pub fn panic_response(
    environment: Environment,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone + Send + Sync + 'static {
    move |payload| {
        let detail = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "Unknown panic".to_string()
        };

        ApiError::new(RelayError::Internal(detail), environment).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_internal_message_hidden_in_production() {
        let boom = || RelayError::Internal("db handle dropped at src/x.rs:10".to_string());

        let (status, body) = render(ApiError::new(boom(), Environment::Production)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal Server Error");
        assert_eq!(body["code"], "INTERNAL_ERROR");

        let (_, body) = render(ApiError::new(boom(), Environment::Development)).await;
        assert_eq!(body["error"], "db handle dropped at src/x.rs:10");
    }

    #[tokio::test]
    async fn test_upstream_message_passes_through_in_production() {
        let err = RelayError::Upstream {
            status: 429,
            message: "You exceeded your current quota".to_string(),
        };
        let (status, body) = render(ApiError::new(err, Environment::Production)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "You exceeded your current quota");
        assert!(body.get("paraphrasedText").is_none());
    }

    #[tokio::test]
    async fn test_panic_payloads_are_rendered() {
        let handler = panic_response(Environment::Development);
        let response = handler(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "index out of bounds");
    }
}
