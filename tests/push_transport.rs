//! Web Push delivery over real HTTP against a mock push service.

use std::sync::Arc;
use std::time::Duration;

use ring::agreement;
use ring::rand::{SecureRandom, SystemRandom};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use webpush_relay::encoding::encode_base64url;
use webpush_relay::push::{
    DeliveryOutcome, PushMessage, PushSubscription, ReqwestTransport, SendOptions, Urgency,
    VapidSigner, WebPushSender,
};

fn sender() -> WebPushSender {
    let vapid = VapidSigner::generate("mailto:test@example.com").unwrap();
    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    WebPushSender::new(Arc::new(vapid), Arc::new(transport), 3600)
}

fn subscription(endpoint: String) -> PushSubscription {
    let rng = SystemRandom::new();
    let private = agreement::EphemeralPrivateKey::generate(&agreement::ECDH_P256, &rng).unwrap();
    let public = private.compute_public_key().unwrap();
    let mut auth = [0u8; 16];
    rng.fill(&mut auth).unwrap();
    PushSubscription::new(endpoint, encode_base64url(public.as_ref()), encode_base64url(&auth))
}

#[tokio::test]
async fn test_delivery_sends_web_push_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wpush/v2/abc"))
        .and(header("content-encoding", "aes128gcm"))
        .and(header("content-type", "application/octet-stream"))
        .and(header("ttl", "120"))
        .and(header("urgency", "low"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let sub = subscription(format!("{}/wpush/v2/abc", server.uri()));
    let options = SendOptions {
        ttl: Some(120),
        urgency: Some(Urgency::Low),
    };
    let outcome = sender()
        .send(&sub, &PushMessage::new("Hello", "World"), options)
        .await
        .unwrap();
    assert_eq!(outcome, DeliveryOutcome::Delivered);

    let requests = server.received_requests().await.unwrap();
    let authorization = requests[0].headers["authorization"].to_str().unwrap();
    assert!(authorization.starts_with("vapid t="));
    assert!(authorization.contains(", k="));
}

#[tokio::test]
async fn test_gone_subscription_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let sub = subscription(format!("{}/expired", server.uri()));
    let outcome = sender()
        .send(&sub, &PushMessage::new("t", "b"), SendOptions::default())
        .await
        .unwrap();
    assert_eq!(outcome, DeliveryOutcome::Gone);
}

#[tokio::test]
async fn test_rate_limited_delivery_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let sub = subscription(format!("{}/busy", server.uri()));
    let outcome = sender()
        .send(&sub, &PushMessage::new("t", "b"), SendOptions::default())
        .await
        .unwrap();
    assert_eq!(outcome, DeliveryOutcome::Rejected { status: 429 });
}

#[tokio::test]
async fn test_unreachable_push_service_is_an_error() {
    // Port 9 (discard) is not listening in test environments
    let sub = subscription("http://127.0.0.1:9/push".to_string());
    let result = sender()
        .send(&sub, &PushMessage::new("t", "b"), SendOptions::default())
        .await;
    assert!(result.is_err());
}
