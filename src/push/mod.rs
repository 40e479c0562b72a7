//! Web Push: subscriptions, payload contract, encryption and delivery.
//!
//! A message travels `PushDispatcher` → `WebPushSender` (validate keys,
//! serialize `PushMessage`, `aes128gcm` encrypt, sign VAPID) →
//! `PushTransport` (HTTP POST to the subscription endpoint).

mod dispatcher;
pub mod ece;
mod payload;
mod registry;
mod sender;
mod subscription;
mod transport;
mod vapid;

use thiserror::Error;

pub use dispatcher::{EndpointResult, PushDispatcher, PushReport, PushStatsSnapshot};
pub use ece::EceError;
pub use payload::{PayloadError, PushFailureReport, PushMessage};
pub use registry::{Registration, SubscriptionRegistry, SubscriptionStats};
pub use sender::{DeliveryOutcome, SendOptions, WebPushSender};
pub use subscription::{
    DecodedKeys, PushSubscription, RegisterRequest, SubscriptionError, SubscriptionKeys,
};
pub use transport::{PushRequest, PushResponse, PushTransport, ReqwestTransport, Urgency};
pub use vapid::{VapidClaims, VapidError, VapidSigner};

#[derive(Debug, Error)]
pub enum PushError {
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("encryption failed: {0}")]
    Encryption(#[from] EceError),

    #[error("VAPID: {0}")]
    Vapid(#[from] VapidError),

    #[error("push service request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
