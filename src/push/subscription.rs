use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::encoding::{decode_base64url, KeyDecodeError};

/// Length of an uncompressed P-256 point (`0x04 || X || Y`)
pub const P256_POINT_LEN: usize = 65;
/// Length of the subscription authentication secret
pub const AUTH_SECRET_LEN: usize = 16;

/// A browser push subscription, as produced by `PushSubscription.toJSON()`.
///
/// Only `endpoint` and `keys` are interpreted. Everything else
/// (`expirationTime`, vendor additions) is carried in `extra` so the record
/// re-serializes without gaining or losing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    /// Subscriber ECDH public key, base64url
    pub p256dh: String,
    /// Authentication secret, base64url
    pub auth: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /register`: the user id plus every field of the subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub subscription: PushSubscription,
}

/// Decoded key material of a subscription
#[derive(Debug, Clone)]
pub struct DecodedKeys {
    pub p256dh: Vec<u8>,
    pub auth: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("endpoint is not a valid http(s) URL: {0}")]
    Endpoint(String),

    #[error("p256dh: {0}")]
    P256dhEncoding(#[source] KeyDecodeError),

    #[error("p256dh must be a 65-byte uncompressed P-256 point, got {0} bytes")]
    P256dhFormat(usize),

    #[error("auth: {0}")]
    AuthEncoding(#[source] KeyDecodeError),

    #[error("auth secret must be 16 bytes, got {0}")]
    AuthLength(usize),
}

impl PushSubscription {
    pub fn new(endpoint: impl Into<String>, p256dh: impl Into<String>, auth: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            keys: SubscriptionKeys {
                p256dh: p256dh.into(),
                auth: auth.into(),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    /// `expirationTime` in epoch milliseconds, when the browser reported one
    pub fn expiration_time(&self) -> Option<i64> {
        self.extra.get("expirationTime").and_then(Value::as_i64)
    }

    /// Check the endpoint and decode both keys.
    pub fn decode_keys(&self) -> Result<DecodedKeys, SubscriptionError> {
        let url = reqwest::Url::parse(&self.endpoint)
            .map_err(|_| SubscriptionError::Endpoint(self.endpoint.clone()))?;
        if !matches!(url.scheme(), "https" | "http") || url.host_str().is_none() {
            return Err(SubscriptionError::Endpoint(self.endpoint.clone()));
        }

        let p256dh =
            decode_base64url(&self.keys.p256dh).map_err(SubscriptionError::P256dhEncoding)?;
        if p256dh.len() != P256_POINT_LEN || p256dh[0] != 0x04 {
            return Err(SubscriptionError::P256dhFormat(p256dh.len()));
        }

        let auth = decode_base64url(&self.keys.auth).map_err(SubscriptionError::AuthEncoding)?;
        if auth.len() != AUTH_SECRET_LEN {
            return Err(SubscriptionError::AuthLength(auth.len()));
        }

        Ok(DecodedKeys { p256dh, auth })
    }
}
