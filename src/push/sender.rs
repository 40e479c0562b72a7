use std::sync::Arc;

use serde::Serialize;

use super::transport::{PushRequest, PushTransport, Urgency};
use super::{ece, PushError, PushMessage, PushSubscription, VapidSigner};

/// How a push service answered one delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// 2xx: accepted for delivery
    Delivered,
    /// 404/410: the subscription no longer exists
    Gone,
    /// Any other status
    Rejected { status: u16 },
}

impl DeliveryOutcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => DeliveryOutcome::Delivered,
            404 | 410 => DeliveryOutcome::Gone,
            status => DeliveryOutcome::Rejected { status },
        }
    }
}

/// Per-message delivery options
#[derive(Debug, Clone, Copy, Default)]
pub struct SendOptions {
    pub ttl: Option<u32>,
    pub urgency: Option<Urgency>,
}

/// Encrypts, signs and hands a message to the transport.
pub struct WebPushSender {
    vapid: Arc<VapidSigner>,
    transport: Arc<dyn PushTransport>,
    default_ttl: u32,
}

impl WebPushSender {
    pub fn new(vapid: Arc<VapidSigner>, transport: Arc<dyn PushTransport>, default_ttl: u32) -> Self {
        Self {
            vapid,
            transport,
            default_ttl,
        }
    }

    pub fn vapid(&self) -> &VapidSigner {
        &self.vapid
    }

    #[tracing::instrument(name = "push.send", skip_all, fields(endpoint = %subscription.endpoint))]
    pub async fn send(
        &self,
        subscription: &PushSubscription,
        message: &PushMessage,
        options: SendOptions,
    ) -> Result<DeliveryOutcome, PushError> {
        let keys = subscription.decode_keys()?;
        let payload = message.to_payload()?;
        let body = ece::encrypt(&keys.p256dh, &keys.auth, &payload)?;
        let authorization = self.vapid.authorization(&subscription.endpoint)?;

        let response = self
            .transport
            .deliver(PushRequest {
                endpoint: subscription.endpoint.clone(),
                authorization,
                ttl: options.ttl.unwrap_or(self.default_ttl),
                urgency: options.urgency,
                body,
            })
            .await?;

        let outcome = DeliveryOutcome::from_status(response.status);
        tracing::debug!(status = response.status, outcome = ?outcome, "Push service responded");
        Ok(outcome)
    }
}
