//! Origin allow-list and CORS headers.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::AppState;
use quill_common::RelayError;

fn is_allowed(config: &AppConfig, origin: &HeaderValue) -> bool {
    origin
        .to_str()
        .map(|origin| origin.trim_end_matches('/'))
        .is_ok_and(|origin| config.allowed_origins().iter().any(|allowed| allowed == origin))
}

/// Rejects cross-origin requests from origins outside the allow-list with 403.
///
/// Requests without an `Origin` header (same-origin navigation, curl, server to
/// server) pass through.
pub async fn origin_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        if !is_allowed(&state.config, origin) {
            tracing::debug!(origin = ?origin, path = %request.uri().path(), "Disallowed origin");
            return ApiError::new(RelayError::OriginRejected, state.config.environment)
                .into_response();
        }
    }

    next.run(request).await
}

/// CORS headers for allowed origins
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
