use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::PushError;

/// `Urgency` header values (RFC 8030 §5.3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    VeryLow,
    Low,
    Normal,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::VeryLow => "very-low",
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::High => "high",
        }
    }
}

/// A fully prepared request to a push service
#[derive(Debug, Clone)]
pub struct PushRequest {
    pub endpoint: String,
    pub authorization: String,
    pub ttl: u32,
    pub urgency: Option<Urgency>,
    /// `aes128gcm` encoded body
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushResponse {
    pub status: u16,
}

/// Delivers encrypted messages to push services.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn deliver(&self, request: PushRequest) -> Result<PushResponse, PushError>;
}

/// HTTP transport backed by a shared reqwest client
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, PushError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PushTransport for ReqwestTransport {
    async fn deliver(&self, request: PushRequest) -> Result<PushResponse, PushError> {
        let mut builder = self
            .client
            .post(&request.endpoint)
            .header(AUTHORIZATION, request.authorization)
            .header("TTL", request.ttl.to_string())
            .header(CONTENT_ENCODING, "aes128gcm")
            .header(CONTENT_TYPE, "application/octet-stream");

        if let Some(urgency) = request.urgency {
            builder = builder.header("Urgency", urgency.as_str());
        }

        let response = builder.body(request.body).send().await?;
        let status = response.status().as_u16();

        if !response.status().is_success() {
            let reason = response.text().await.unwrap_or_default();
            tracing::debug!(status, reason = %reason, "Push service refused message");
        }

        Ok(PushResponse { status })
    }
}
