use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::{api_key_auth, AppState};
use crate::sse::sse_handler;

use super::assets::{index_page, service_worker};
use super::health::{health, stats};
use super::metrics::prometheus_metrics;
use super::push::{push_notification, register, report_push_failure, unregister, vapid_key};
use super::stream::send_message;

pub fn api_routes(state: AppState) -> Router<AppState> {
    // Message producers; guarded when api.key is set
    let producers = Router::new()
        .route("/send", post(send_message))
        .route("/push", post(push_notification))
        .route_layer(middleware::from_fn_with_state(state, api_key_auth));

    Router::new()
        // Demo page
        .route("/", get(index_page))
        .route("/sw.js", get(service_worker))
        // Push subscription flow
        .route("/vapid.json", get(vapid_key))
        .route("/register", post(register))
        .route("/unregister", post(unregister))
        .route("/push/failures", post(report_push_failure))
        // Event stream
        .route("/sse", get(sse_handler))
        // Health & Stats
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(prometheus_metrics))
        .merge(producers)
}
