//! `POST /send`: hand a text message to a user's open SSE streams.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::server::AppState;

use super::normalize_user_id;

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub user_id: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub success: bool,
    pub delivered_to: usize,
    pub failed: usize,
    pub timestamp: DateTime<Utc>,
}

/// SSE `data` fields cannot carry carriage returns; fold every line ending to `\n`.
pub(crate) fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> Result<Json<SendResponse>> {
    let user_id = normalize_user_id(&request.user_id)?;
    // An empty event carries no `data:` line, so the listener would never see it
    if request.data.is_empty() {
        return Err(AppError::Validation("data must not be empty".to_string()));
    }
    let data = normalize_line_endings(&request.data);

    let result = state
        .connection_manager
        .send_to_user(&user_id, &data)
        .await
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(SendResponse {
        success: result.delivered_to > 0,
        delivered_to: result.delivered_to,
        failed: result.failed,
        timestamp: Utc::now(),
    }))
}
