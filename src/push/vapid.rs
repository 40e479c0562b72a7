//! Voluntary Application Server Identification (RFC 8292).
//!
//! The relay identifies itself to push services with an ES256 JWT whose
//! audience is the origin of the subscription endpoint. The matching public
//! key is what the page passes as `applicationServerKey`.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::VapidConfig;
use crate::encoding::{decode_base64url, encode_base64url, KeyDecodeError};

/// Token lifetime; push services reject anything over 24 hours
const TOKEN_TTL_HOURS: i64 = 12;

#[derive(Debug, Error)]
pub enum VapidError {
    #[error("VAPID private key: {0}")]
    KeyEncoding(#[from] KeyDecodeError),

    #[error("VAPID private key is not a P-256 PKCS#8 document")]
    InvalidKey,

    #[error("failed to generate a VAPID key pair")]
    KeyGeneration,

    #[error("endpoint has no usable origin: {0}")]
    Endpoint(String),

    #[error("failed to sign VAPID token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Claims of a VAPID token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VapidClaims {
    pub aud: String,
    pub exp: i64,
    pub sub: String,
}

pub struct VapidSigner {
    encoding_key: EncodingKey,
    public_key: Vec<u8>,
    public_key_b64: String,
    subject: String,
}

impl std::fmt::Debug for VapidSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidSigner")
            .field("public_key", &self.public_key_b64)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl VapidSigner {
    /// Load the configured key, or generate one for this process.
    pub fn from_config(config: &VapidConfig) -> Result<Self, VapidError> {
        match &config.private_key {
            Some(encoded) => {
                let pkcs8 = decode_base64url(encoded)?;
                Self::from_pkcs8(&pkcs8, config.subject.clone())
            }
            None => {
                let signer = Self::generate(config.subject.clone())?;
                tracing::warn!(
                    public_key = %signer.public_key_base64url(),
                    "No VAPID private key configured, generated a temporary one; \
                     subscriptions will not survive a restart"
                );
                Ok(signer)
            }
        }
    }

    pub fn generate(subject: impl Into<String>) -> Result<Self, VapidError> {
        let rng = SystemRandom::new();
        let document = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng)
            .map_err(|_| VapidError::KeyGeneration)?;
        Self::from_pkcs8(document.as_ref(), subject)
    }

    pub fn from_pkcs8(pkcs8: &[u8], subject: impl Into<String>) -> Result<Self, VapidError> {
        let rng = SystemRandom::new();
        let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8, &rng)
            .map_err(|_| VapidError::InvalidKey)?;
        let public_key = key_pair.public_key().as_ref().to_vec();

        Ok(Self {
            encoding_key: EncodingKey::from_ec_der(pkcs8),
            public_key_b64: encode_base64url(&public_key),
            public_key,
            subject: subject.into(),
        })
    }

    /// Uncompressed P-256 public key
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn public_key_base64url(&self) -> &str {
        &self.public_key_b64
    }

    /// Build the `Authorization` header value for a request to `endpoint`.
    pub fn authorization(&self, endpoint: &str) -> Result<String, VapidError> {
        let claims = VapidClaims {
            aud: endpoint_origin(endpoint)?,
            exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
            sub: self.subject.clone(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::ES256), &claims, &self.encoding_key)?;
        Ok(format!("vapid t={}, k={}", token, self.public_key_b64))
    }
}

fn endpoint_origin(endpoint: &str) -> Result<String, VapidError> {
    let url =
        reqwest::Url::parse(endpoint).map_err(|_| VapidError::Endpoint(endpoint.to_string()))?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(VapidError::Endpoint(endpoint.to_string()));
    }
    Ok(origin.ascii_serialization())
}
