//! Front-end bundle and the `/api` not-found reply.

use axum::{Json, http::StatusCode};
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

use quill_common::ErrorBody;

/// Serves files from `dist_dir`; unknown paths get `index.html` so client-side
/// routes resolve.
pub fn bundle(dist_dir: &str) -> ServeDir<ServeFile> {
    let index = Path::new(dist_dir).join("index.html");
    ServeDir::new(dist_dir).fallback(ServeFile::new(index))
}

pub async fn api_not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new("Not found").with_code("NOT_FOUND")),
    )
}
