//! The JSON document carried inside a push message.
//!
//! The background worker and the server agree on `{ "title", "body" }`.
//! Parsing returns an explicit error instead of failing silently, so the
//! server can reject bad messages before encrypting them and the worker's
//! failures can be reported back through `POST /push/failures`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::ece::MAX_PLAINTEXT_LEN;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("push payload is empty")]
    Empty,

    #[error("push payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("push payload is missing `{0}`")]
    MissingField(&'static str),

    #[error("push payload field `{0}` must be a string")]
    NotAString(&'static str),

    #[error("push payload is {len} bytes, the limit is {max}")]
    TooLarge { len: usize, max: usize },
}

impl PushMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Parse a decrypted push payload.
    pub fn from_payload(bytes: &[u8]) -> Result<Self, PayloadError> {
        if bytes.is_empty() {
            return Err(PayloadError::Empty);
        }

        let value: Value = serde_json::from_slice(bytes)?;
        Ok(Self {
            title: string_field(&value, "title")?,
            body: string_field(&value, "body")?,
        })
    }

    /// Serialize for encryption, enforcing the single-record size limit.
    pub fn to_payload(&self) -> Result<Vec<u8>, PayloadError> {
        let bytes = serde_json::to_vec(self)?;
        if bytes.len() > MAX_PLAINTEXT_LEN {
            return Err(PayloadError::TooLarge {
                len: bytes.len(),
                max: MAX_PLAINTEXT_LEN,
            });
        }
        Ok(bytes)
    }
}

fn string_field(value: &Value, name: &'static str) -> Result<String, PayloadError> {
    match value.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(PayloadError::NotAString(name)),
        None => Err(PayloadError::MissingField(name)),
    }
}

/// Failure report sent by the background worker when it cannot show a push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushFailureReport {
    pub reason: String,
    /// Raw payload text, when the worker could read it
    #[serde(default)]
    pub payload: Option<String>,
}
