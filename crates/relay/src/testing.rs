//! Shared fixtures for in-process router tests.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use crate::config::{ApiKey, AppConfig};
use crate::limiter::InMemoryRateLimitStore;
use crate::provider::{ChatMessage, CompletionProvider, ProviderError};
use crate::routes::create_router;
use crate::state::AppState;

/// What the stub provider does on every call
pub enum StubReply {
    Text(&'static str),
    Fail(u16, &'static str),
    Malformed,
    Panic,
}

pub struct StubProvider {
    reply: StubReply,
    calls: AtomicUsize,
    last: Mutex<Option<Vec<ChatMessage>>>,
}

impl StubProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_messages(&self) -> Option<Vec<ChatMessage>> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(
        &self,
        _api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(messages.to_vec());

        match self.reply {
            StubReply::Text(text) => Ok(text.to_string()),
            StubReply::Fail(status, message) => Err(ProviderError::Api {
                status,
                message: message.to_string(),
            }),
            StubReply::Malformed => Err(ProviderError::Malformed("no choices".to_string())),
            StubReply::Panic => panic!("stub provider exploded"),
        }
    }
}

/// Development config with a credential set
pub fn test_config() -> AppConfig {
    AppConfig {
        openai_api_key: Some(ApiKey::new("sk-test")),
        ..Default::default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub provider: Arc<StubProvider>,
}

impl TestApp {
    pub fn new(reply: StubReply) -> Self {
        Self::with_config(test_config(), reply)
    }

    pub fn with_config(config: AppConfig, reply: StubReply) -> Self {
        let provider = Arc::new(StubProvider {
            reply,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        });
        let limiter = Arc::new(InMemoryRateLimitStore::new(
            config.rate_limit.max_requests,
            Duration::from_secs(config.rate_limit.window_secs),
        ));
        let state = AppState::with_parts(config, provider.clone(), limiter);

        Self {
            router: create_router(state),
            provider,
        }
    }

    pub async fn raw(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Status, headers, and the body parsed as JSON (`Null` when it is not JSON)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.raw(request).await;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, json)
    }
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn read_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
