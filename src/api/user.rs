use crate::error::{AppError, Result};

/// Canonical form of a user id: surrounding whitespace removed, never empty.
///
/// Every endpoint that takes a user id goes through this, so the value typed
/// into the page reaches the same user on `/sse`, `/send`, `/register`,
/// `/unregister` and `/push`.
pub fn normalize_user_id(raw: &str) -> Result<String> {
    let user_id = raw.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("user_id is required".to_string()));
    }
    Ok(user_id.to_string())
}
