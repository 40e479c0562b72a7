//! The bundled demo page and its background worker.

use axum::{
    http::header,
    response::{Html, IntoResponse},
};

const INDEX_HTML: &str = include_str!("../../assets/index.html");
const SERVICE_WORKER_JS: &str = include_str!("../../assets/sw.js");

/// GET /
pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /sw.js
pub async fn service_worker() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::HeaderName::from_static("service-worker-allowed"), "/"),
        ],
        SERVICE_WORKER_JS,
    )
}
