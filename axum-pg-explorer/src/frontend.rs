//! Frontend asset serving
//!
//! Serves the embedded browser client with correct MIME types, caching,
//! and base path injection so the explorer works at any mount point.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use include_dir::{include_dir, Dir};
use std::sync::Arc;

// Embed the frontend dist directory at compile time
static FRONTEND_DISTRIBUTION: Dir = include_dir!("$CARGO_MANIFEST_DIR/frontend/dist");

/// State for frontend serving (stores base path for routing)
#[derive(Clone)]
pub struct FrontendState {
    pub base_path: Arc<String>,
}

impl FrontendState {
    pub fn new(base_path: String) -> Self {
        Self {
            base_path: Arc::new(base_path),
        }
    }
}

/// Create a router serving the embedded client
///
/// - GET / -> index.html with an injected `<base href>` tag
/// - GET /assets/* -> static assets with long-term caching
pub fn create_frontend_router(base_path: String) -> Router {
    let state = FrontendState::new(base_path);

    Router::new()
        .route("/", get(serve_index_page))
        .route("/assets/{*path}", get(serve_static_asset))
        .with_state(state)
}

/// Serve index.html, injecting a `<base href>` so relative asset paths
/// resolve regardless of where the explorer is mounted
async fn serve_index_page(State(state): State<FrontendState>) -> Response {
    if let Some(file) = FRONTEND_DISTRIBUTION.get_file("index.html") {
        let mut contents = String::from_utf8_lossy(file.contents()).to_string();

        if let Some(head_position) = contents.find("<head>") {
            let insert_position = head_position + "<head>".len();
            let base_tag = format!("\n    <base href=\"{}/\">", state.base_path);
            contents.insert_str(insert_position, &base_tag);
        }

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
            .header(header::CACHE_CONTROL, "public, max-age=3600")
            .body(Body::from(contents))
            .unwrap()
    } else {
        serve_fallback_page()
    }
}

/// Serve static assets with proper MIME types and a 1-year cache
async fn serve_static_asset(Path(path): Path<String>) -> Response {
    let asset_path = format!("assets/{}", path);

    if let Some(file) = FRONTEND_DISTRIBUTION.get_file(&asset_path) {
        let contents = file.contents();
        let mime_type = mime_guess::from_path(&asset_path)
            .first_or_octet_stream()
            .to_string();

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, mime_type)
            .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
            .body(Body::from(contents))
            .unwrap()
    } else {
        Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Body::from(format!("Asset not found: {}", asset_path)))
            .unwrap()
    }
}

/// Fallback page when the embedded client is missing from the build
fn serve_fallback_page() -> Response {
    let html = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>axum-pg-explorer</title>
    <style>
        body {
            font-family: system-ui, -apple-system, sans-serif;
            max-width: 700px;
            margin: 80px auto;
            padding: 0 20px;
            color: #e8e8e8;
            background: #0f0f0f;
        }
        h1 { font-size: 1.6em; }
        code {
            background: #1f1f1f;
            padding: 2px 6px;
            border-radius: 4px;
            font-size: 0.9em;
        }
        .warning {
            background: #1a1a1a;
            border-left: 4px solid #e0a800;
            padding: 12px 16px;
            margin: 20px 0;
            border-radius: 4px;
        }
        ul { line-height: 1.8; }
    </style>
</head>
<body>
    <h1>axum-pg-explorer</h1>

    <div class="warning">
        The embedded browser client was not found in this build. The REST
        API is still available.
    </div>

    <ul>
        <li><code>POST /api/tables</code> - list tables for a connection string</li>
        <li><code>POST /api/table-data</code> - fetch one page of rows</li>
        <li><code>POST /api/update-cell</code> - update a single cell</li>
    </ul>

    <div class="warning">
        Development tool only: the explorer passes your connection string
        through on every request and has no authentication of its own.
        Never expose it on a public network.
    </div>
</body>
</html>
"#;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(html))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontend_state_creation() {
        let state = FrontendState::new("/explorer".to_string());
        assert_eq!(*state.base_path, "/explorer");
    }

    #[test]
    fn test_mime_type_guessing() {
        use mime_guess::from_path;

        let javascript_mime = from_path("application.js").first_or_octet_stream();
        assert_eq!(javascript_mime.as_ref(), "text/javascript");

        let css_mime = from_path("styles.css").first_or_octet_stream();
        assert_eq!(css_mime.as_ref(), "text/css");

        let html_mime = from_path("index.html").first_or_octet_stream();
        assert_eq!(html_mime.as_ref(), "text/html");
    }

    #[test]
    fn test_fallback_page_has_content() {
        let response = serve_fallback_page();
        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response.headers().get(header::CONTENT_TYPE);
        assert_eq!(content_type.unwrap(), "text/html; charset=utf-8");
    }

    #[test]
    fn test_router_creation() {
        let router = create_frontend_router("/explorer".to_string());
        drop(router);
    }
}
