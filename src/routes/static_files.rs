//! Static File Serving
//!
//! Serves the single-page frontend build. Unknown paths get `index.html` so the
//! client-side router can take over.

use axum::{
    Router,
    routing::get,
    response::{Html, IntoResponse},
};
use tower_http::services::{ServeDir, ServeFile};
use std::path::Path;
use tracing::{info, warn};

/// Create router for serving static files
pub fn router(static_dir: &Path) -> Router {
    let index = static_dir.join("index.html");

    if index.is_file() {
        info!(path = %static_dir.display(), "Serving frontend build");
        let serve_dir = ServeDir::new(static_dir)
            .append_index_html_on_directories(true)
            .fallback(ServeFile::new(index));
        Router::new().fallback_service(serve_dir)
    } else {
        warn!(path = %static_dir.display(), "Frontend build not found, serving API landing page");
        Router::new().route("/", get(landing_page))
    }
}

async fn landing_page() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>CardGuru API</title>
</head>
<body>
    <h1>CardGuru API is running</h1>
    <p>The frontend has not been built. Build it into <code>frontend/dist</code> or set <code>STATIC_DIR</code>.</p>
    <ul>
        <li><code>GET /api/cards</code> - List cards</li>
        <li><code>GET /api/cards/{id}</code> - Card details</li>
        <li><code>POST /api/search</code> - Semantic search</li>
        <li><code>POST /api/compare</code> - Compare 2 to 5 cards</li>
        <li><code>POST /api/generate-embeddings</code> - Fill in missing embeddings</li>
        <li><code>GET /api/health</code> - Health check</li>
    </ul>
</body>
</html>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_landing_page_without_build() {
        let app = router(Path::new("definitely/not/a/build"));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
