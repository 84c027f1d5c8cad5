//! HTTP route handlers for the relay.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::error::panic_response;
use crate::middleware::{cors_layer, origin_gate, rate_limit};
use crate::state::AppState;

mod assets;
mod health;
mod paraphrase;

pub use paraphrase::IncomingRequest;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .nest("/api", api_routes(state.clone()))
        // Everything else is the front-end bundle
        .fallback_service(assets::bundle(&config.assets.dist_dir))
        .with_state(state.clone())
        // Layers run bottom-up: trace, origin gate, CORS, panic trap, routes
        .layer(CatchPanicLayer::custom(panic_response(config.environment)))
        .layer(cors_layer(&config))
        .layer(middleware::from_fn_with_state(state, origin_gate))
        .layer(TraceLayer::new_for_http())
}

/// API routes, all counted by the rate limiter
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/paraphrase", post(paraphrase::paraphrase))
        .fallback(assets::api_not_found)
        .layer(middleware::from_fn_with_state(state, rate_limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::testing::{StubReply, TestApp, get_request, post_json, test_config};
    use axum::{body::Body, http::Request, http::StatusCode};
    use serde_json::json;

    fn paraphrase_body() -> serde_json::Value {
        json!({
            "text": "hello world",
            "targetLanguage": "es",
            "tone": "casual",
            "lengthPreference": "similar"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new(StubReply::Text("unused"));
        let (status, headers, json) = app.send(get_request("/api/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(headers["ratelimit-limit"], "50");
        assert_eq!(headers["ratelimit-remaining"], "49");
        assert_eq!(headers["ratelimit-policy"], "50;w=900");
    }

    #[tokio::test]
    async fn test_fifty_first_request_is_rate_limited_regardless_of_payload() {
        let app = TestApp::new(StubReply::Text("Hola mundo"));

        for n in 0..50 {
            let request = if n % 2 == 0 {
                post_json("/api/paraphrase", &paraphrase_body())
            } else {
                post_json("/api/paraphrase", &json!({ "text": "" }))
            };
            let (status, _, _) = app.send(request).await;
            assert_ne!(status, StatusCode::TOO_MANY_REQUESTS, "request {}", n + 1);
        }
        assert_eq!(app.provider.calls(), 25);

        let (status, headers, json) = app
            .send(post_json("/api/paraphrase", &paraphrase_body()))
            .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            json,
            json!({
                "error": "Too many requests, please try again later.",
                "code": "RATE_LIMITED"
            })
        );
        assert_eq!(headers["ratelimit-remaining"], "0");
        assert_eq!(headers["retry-after"], "900");
        assert_eq!(app.provider.calls(), 25);

        // Invalid payloads are limited too
        let (status, _, _) = app
            .send(post_json("/api/paraphrase", &json!({})))
            .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_rate_limit_is_per_forwarded_client() {
        let mut config = test_config();
        config.rate_limit.max_requests = 1;
        let app = TestApp::with_config(config, StubReply::Text("unused"));

        let from = |ip: &str| {
            Request::builder()
                .uri("/api/health")
                .header("x-forwarded-for", ip)
                .body(Body::empty())
                .unwrap()
        };

        assert_eq!(app.send(from("198.51.100.1")).await.0, StatusCode::OK);
        assert_eq!(app.send(from("198.51.100.2")).await.0, StatusCode::OK);
        assert_eq!(
            app.send(from("198.51.100.1")).await.0,
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[tokio::test]
    async fn test_spoofed_first_forwarded_line_does_not_reset_limit() {
        let mut config = test_config();
        config.rate_limit.max_requests = 1;
        let app = TestApp::with_config(config, StubReply::Text("unused"));

        let mut statuses = Vec::new();
        for spoofed in ["1.1.1.1", "2.2.2.2", "3.3.3.3"] {
            let request = Request::builder()
                .uri("/api/health")
                .header("x-forwarded-for", spoofed)
                .header("x-forwarded-for", "198.51.100.9")
                .body(Body::empty())
                .unwrap();
            statuses.push(app.send(request).await.0);
        }

        assert_eq!(
            statuses,
            [
                StatusCode::OK,
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::TOO_MANY_REQUESTS
            ]
        );
    }

    #[tokio::test]
    async fn test_disallowed_origin_rejected_before_handler() {
        let app = TestApp::new(StubReply::Text("Hola mundo"));
        let request = Request::builder()
            .method("POST")
            .uri("/api/paraphrase")
            .header("content-type", "application/json")
            .header("origin", "https://evil.example")
            .body(Body::from(paraphrase_body().to_string()))
            .unwrap();

        let (status, headers, json) = app.send(request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["code"], "ORIGIN_REJECTED");
        assert!(headers.get("access-control-allow-origin").is_none());
        assert_eq!(app.provider.calls(), 0);

        // Rejected requests are not counted against the client
        let (_, headers, _) = app.send(get_request("/api/health")).await;
        assert_eq!(headers["ratelimit-remaining"], "49");
    }

    #[tokio::test]
    async fn test_allowed_origin_gets_cors_headers() {
        let app = TestApp::new(StubReply::Text("Hola mundo"));
        let request = Request::builder()
            .uri("/api/health")
            .header("origin", "http://localhost:5173")
            .body(Body::empty())
            .unwrap();

        let (status, headers, _) = app.send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["access-control-allow-origin"], "http://localhost:5173");
        assert_eq!(headers["access-control-allow-credentials"], "true");
    }

    #[tokio::test]
    async fn test_preflight_from_allowed_origin() {
        let app = TestApp::new(StubReply::Text("unused"));
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/paraphrase")
            .header("origin", "http://127.0.0.1:5173")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app.raw(request).await;
        assert!(response.status().is_success());
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://127.0.0.1:5173"
        );
    }

    #[tokio::test]
    async fn test_production_uses_production_origins() {
        let mut config = test_config();
        config.environment = Environment::Production;
        let app = TestApp::with_config(config, StubReply::Text("unused"));

        let request = Request::builder()
            .uri("/api/health")
            .header("origin", "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.send(request).await.0, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_panic_is_trapped_and_redacted_in_production() {
        let mut config = test_config();
        config.environment = Environment::Production;
        let app = TestApp::with_config(config, StubReply::Panic);

        let (status, _, json) = app
            .send(post_json("/api/paraphrase", &paraphrase_body()))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal Server Error");

        let app = TestApp::new(StubReply::Panic);
        let (status, _, json) = app
            .send(post_json("/api/paraphrase", &paraphrase_body()))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "stub provider exploded");
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_json_404() {
        let app = TestApp::new(StubReply::Text("unused"));
        let (status, headers, json) = app.send(get_request("/api/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Not found");
        assert!(headers.contains_key("ratelimit-limit"));
    }

    #[tokio::test]
    async fn test_client_routes_fall_back_to_index() {
        let dist = std::env::temp_dir().join(format!("quill-dist-{}", std::process::id()));
        std::fs::create_dir_all(&dist).unwrap();
        std::fs::write(dist.join("index.html"), "<html>quill</html>").unwrap();
        std::fs::write(dist.join("app.js"), "console.log('quill')").unwrap();

        let mut config = test_config();
        config.assets.dist_dir = dist.to_string_lossy().into_owned();
        let app = TestApp::with_config(config, StubReply::Text("unused"));

        let asset = app.raw(get_request("/app.js")).await;
        assert_eq!(asset.status(), StatusCode::OK);

        let page = app.raw(get_request("/settings/profile")).await;
        assert_eq!(page.status(), StatusCode::OK);
        let html = crate::testing::read_text(page).await;
        assert_eq!(html, "<html>quill</html>");

        std::fs::remove_dir_all(&dist).ok();
    }
}
