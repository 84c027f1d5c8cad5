//! Per-client request ceiling for `/api`.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::error::ApiError;
use crate::limiter::RateLimitDecision;
use crate::state::AppState;
use quill_common::RelayError;
use quill_common::constants::{UNKNOWN_CLIENT_KEY, headers};

/// Identity a request is counted under.
///
/// With `trust_proxy` the right-most `X-Forwarded-For` hop (the address our
/// proxy saw) wins; otherwise the peer address of the connection. Repeated
/// header lines form one chain, so the hop comes from the last line.
pub fn client_key(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = request
            .headers()
            .get_all(headers::X_FORWARDED_FOR)
            .iter()
            .next_back()
            .and_then(|value| value.to_str().ok())
            .and_then(|chain| chain.rsplit(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());

        if let Some(hop) = forwarded {
            return hop.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT_KEY.to_string())
}

fn apply_headers(target: &mut HeaderMap, decision: &RateLimitDecision, window_secs: u64) {
    let policy = format!("{};w={}", decision.limit, window_secs);
    let pairs = [
        (headers::RATELIMIT_LIMIT, HeaderValue::from(decision.limit)),
        (headers::RATELIMIT_REMAINING, HeaderValue::from(decision.remaining)),
        (headers::RATELIMIT_RESET, HeaderValue::from(decision.reset_secs())),
    ];
    for (name, value) in pairs {
        target.insert(HeaderName::from_static(name), value);
    }
    if let Ok(policy) = HeaderValue::from_str(&policy) {
        target.insert(HeaderName::from_static(headers::RATELIMIT_POLICY), policy);
    }
}

/// Counts the request and answers 429 once the key is over its ceiling.
/// A failing counter store lets the request through.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = client_key(&request, state.config.rate_limit.trust_proxy);
    let window_secs = state.config.rate_limit.window_secs;

    let decision = match state.limiter.hit(&key).await {
        Ok(decision) => decision,
        Err(e) => {
            tracing::error!(error = %e, client = %key, "Rate limiter error, failing open");
            return next.run(request).await;
        }
    };

    if !decision.allowed {
        tracing::warn!(client = %key, limit = decision.limit, "Rate limit exceeded");
        let mut response =
            ApiError::new(RelayError::RateLimitExceeded, state.config.environment).into_response();
        apply_headers(response.headers_mut(), &decision, window_secs);
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(decision.reset_secs()));
        return response;
    }

    let mut response = next.run(request).await;
    apply_headers(response.headers_mut(), &decision, window_secs);
    response
}
