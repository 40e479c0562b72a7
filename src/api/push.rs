//! Push endpoints: VAPID key, subscription registration, delivery, and the
//! failure channel used by the background worker.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::metrics::PushMetrics;
use crate::push::{PushFailureReport, PushMessage, PushReport, RegisterRequest, SendOptions, Urgency};
use crate::server::AppState;

use super::normalize_user_id;

#[derive(Debug, Serialize)]
pub struct VapidKeyResponse {
    pub public_key: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: String,
    pub endpoint: String,
    pub created: bool,
    pub subscriptions: usize,
}

#[derive(Debug, Deserialize)]
pub struct UnregisterRequest {
    pub user_id: String,
    pub endpoint: String,
}

#[derive(Debug, Deserialize)]
pub struct PushNotificationRequest {
    pub user_id: String,
    pub title: String,
    pub body: String,
    /// Overrides `push.ttl`
    pub ttl: Option<u32>,
    pub urgency: Option<Urgency>,
}

/// GET /vapid.json
pub async fn vapid_key(State(state): State<AppState>) -> Json<VapidKeyResponse> {
    Json(VapidKeyResponse {
        public_key: state.push.sender().vapid().public_key_base64url().to_string(),
    })
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let user_id = normalize_user_id(&request.user_id)?;
    request.subscription.decode_keys()?;

    let endpoint = request.subscription.endpoint.clone();
    let registration = state.subscriptions.register(&user_id, request.subscription);
    PushMetrics::record_registration();

    let status = if registration.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(RegisterResponse {
            user_id,
            endpoint,
            created: registration.created,
            subscriptions: registration.subscriptions,
        }),
    ))
}

/// POST /unregister
pub async fn unregister(
    State(state): State<AppState>,
    Json(request): Json<UnregisterRequest>,
) -> Result<StatusCode> {
    let user_id = normalize_user_id(&request.user_id)?;
    if state.subscriptions.unregister(&user_id, &request.endpoint) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Subscription not found".to_string()))
    }
}

/// POST /push
pub async fn push_notification(
    State(state): State<AppState>,
    Json(request): Json<PushNotificationRequest>,
) -> Result<Json<PushReport>> {
    let user_id = normalize_user_id(&request.user_id)?;
    let message = PushMessage::new(request.title, request.body);
    // Reject oversized messages before touching any subscription
    message.to_payload()?;

    let options = SendOptions {
        ttl: request.ttl,
        urgency: request.urgency,
    };

    state
        .push
        .push_to_user(&user_id, &message, options)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No push subscription for user {}", user_id)))
}

/// POST /push/failures
pub async fn report_push_failure(
    State(state): State<AppState>,
    Json(report): Json<PushFailureReport>,
) -> StatusCode {
    let parse_error = report
        .payload
        .as_deref()
        .and_then(|payload| PushMessage::from_payload(payload.as_bytes()).err())
        .map(|e| e.to_string());

    tracing::warn!(
        reason = %report.reason,
        payload = ?report.payload,
        parse_error = ?parse_error,
        "Background worker failed to handle a push"
    );

    state.push.record_client_failure();
    StatusCode::NO_CONTENT
}
