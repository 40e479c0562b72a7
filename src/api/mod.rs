//! API layer - HTTP endpoint handlers organized by domain.

mod assets;
mod health;
mod metrics;
mod push;
mod routes;
mod stream;
mod user;

pub use assets::{index_page, service_worker};
pub use health::{health, stats, HealthResponse, StatsResponse};
pub use metrics::prometheus_metrics;
pub use push::{
    push_notification, register, report_push_failure, unregister, vapid_key,
    PushNotificationRequest, RegisterResponse, UnregisterRequest, VapidKeyResponse,
};
pub use routes::api_routes;
pub use stream::{send_message, SendRequest, SendResponse};
pub use user::normalize_user_id;
