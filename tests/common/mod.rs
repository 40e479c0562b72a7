//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use http_body_util::BodyExt;
use ring::agreement;
use ring::rand::{SecureRandom, SystemRandom};
use serde_json::Value;

use webpush_relay::config::Settings;
use webpush_relay::encoding::encode_base64url;
use webpush_relay::push::{PushError, PushRequest, PushResponse, PushTransport, VapidSigner};
use webpush_relay::server::{create_app, AppState};

/// Transport that records every request and answers with a fixed status per endpoint
#[derive(Default)]
pub struct RecordingTransport {
    pub requests: Mutex<Vec<PushRequest>>,
    statuses: Mutex<HashMap<String, u16>>,
}

impl RecordingTransport {
    pub fn respond(&self, endpoint: &str, status: u16) {
        self.statuses
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), status);
    }

    pub fn requests(&self) -> Vec<PushRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushTransport for RecordingTransport {
    async fn deliver(&self, request: PushRequest) -> Result<PushResponse, PushError> {
        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(&request.endpoint)
            .copied()
            .unwrap_or(201);
        self.requests.lock().unwrap().push(request);
        Ok(PushResponse { status })
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub transport: Arc<RecordingTransport>,
}

pub fn test_app() -> TestApp {
    test_app_with(Settings::default())
}

pub fn test_app_with(settings: Settings) -> TestApp {
    let transport = Arc::new(RecordingTransport::default());
    let vapid = VapidSigner::generate("mailto:test@example.com").unwrap();
    let state = AppState::with_transport(settings, vapid, transport.clone());
    TestApp {
        router: create_app(state.clone()),
        state,
        transport,
    }
}

/// Browser-side key material for a subscription
pub struct TestSubscriber {
    pub private: agreement::EphemeralPrivateKey,
    pub p256dh: String,
    pub auth: String,
}

pub fn subscriber() -> TestSubscriber {
    let rng = SystemRandom::new();
    let private = agreement::EphemeralPrivateKey::generate(&agreement::ECDH_P256, &rng).unwrap();
    let public = private.compute_public_key().unwrap();
    let mut auth = [0u8; 16];
    rng.fill(&mut auth).unwrap();
    TestSubscriber {
        p256dh: encode_base64url(public.as_ref()),
        auth: encode_base64url(&auth),
        private,
    }
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
