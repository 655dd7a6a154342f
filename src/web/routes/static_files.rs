//! Stylesheet and script assets compiled into the binary.

use axum::{
    extract::Path,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

use crate::web::error::error_page;

#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticAssets;

/// Serve an embedded file from `static/`.
pub async fn serve_static_file(Path(path): Path<String>) -> Response {
    let Some(file) = StaticAssets::get(&path) else {
        tracing::debug!(path = %path, "Static asset not found");
        return error_page(StatusCode::NOT_FOUND, "Not Found", "No such file.");
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let content_type = HeaderValue::from_str(mime.as_ref())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, HeaderValue::from_static("public, max-age=3600")),
        ],
        file.data,
    )
        .into_response()
}
