//! `aes128gcm` content encoding for Web Push (RFC 8291 over RFC 8188).
//!
//! Every message uses a fresh ephemeral ECDH key and a random salt, and fits
//! in a single record, so the body is `header || AES-GCM(plaintext || 0x02)`.

use ring::rand::{SecureRandom, SystemRandom};
use ring::{aead, agreement, hkdf};
use thiserror::Error;

/// Record size written into the header
pub const RECORD_SIZE: u32 = 4096;
const SALT_LEN: usize = 16;
const KEY_ID_LEN: usize = 65;
const HEADER_LEN: usize = SALT_LEN + 4 + 1 + KEY_ID_LEN;
const TAG_LEN: usize = 16;
/// Largest plaintext that fits one record together with the header
pub const MAX_PLAINTEXT_LEN: usize = RECORD_SIZE as usize - HEADER_LEN - TAG_LEN - 1;

const LAST_RECORD_DELIMITER: u8 = 0x02;
const KEY_INFO: &[u8] = b"WebPush: info\0";
const CEK_INFO: &[u8] = b"Content-Encoding: aes128gcm\0";
const NONCE_INFO: &[u8] = b"Content-Encoding: nonce\0";

#[derive(Debug, Error)]
pub enum EceError {
    #[error("subscriber public key was rejected")]
    InvalidPublicKey,

    #[error("payload of {0} bytes exceeds the single-record limit")]
    PayloadTooLarge(usize),

    #[error("cryptographic operation failed")]
    Crypto,
}

impl From<ring::error::Unspecified> for EceError {
    fn from(_: ring::error::Unspecified) -> Self {
        EceError::Crypto
    }
}

/// Content-encryption key and nonce for the single record
pub(crate) struct ContentKeys {
    pub cek: [u8; 16],
    pub nonce: [u8; 12],
}

struct OkmLen(usize);

impl hkdf::KeyType for OkmLen {
    fn len(&self) -> usize {
        self.0
    }
}

fn hkdf_sha256(salt: &[u8], ikm: &[u8], info: &[&[u8]], out: &mut [u8]) -> Result<(), EceError> {
    let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, salt).extract(ikm);
    prk.expand(info, OkmLen(out.len()))?.fill(out)?;
    Ok(())
}

pub(crate) fn derive_keys(
    ecdh_secret: &[u8],
    auth_secret: &[u8],
    ua_public: &[u8],
    as_public: &[u8],
    salt: &[u8],
) -> Result<ContentKeys, EceError> {
    let mut ikm = [0u8; 32];
    hkdf_sha256(auth_secret, ecdh_secret, &[KEY_INFO, ua_public, as_public], &mut ikm)?;

    let mut keys = ContentKeys {
        cek: [0u8; 16],
        nonce: [0u8; 12],
    };
    hkdf_sha256(salt, &ikm, &[CEK_INFO], &mut keys.cek)?;
    hkdf_sha256(salt, &ikm, &[NONCE_INFO], &mut keys.nonce)?;
    Ok(keys)
}

/// Encrypt `plaintext` for a subscriber identified by its `p256dh` key and
/// `auth` secret, returning the complete request body.
pub fn encrypt(ua_public: &[u8], auth_secret: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, EceError> {
    if plaintext.len() > MAX_PLAINTEXT_LEN {
        return Err(EceError::PayloadTooLarge(plaintext.len()));
    }

    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)?;

    let as_private = agreement::EphemeralPrivateKey::generate(&agreement::ECDH_P256, &rng)?;
    let as_public = as_private.compute_public_key()?;

    let peer = agreement::UnparsedPublicKey::new(&agreement::ECDH_P256, ua_public);
    let ecdh_secret = agreement::agree_ephemeral(as_private, &peer, |secret| secret.to_vec())
        .map_err(|_| EceError::InvalidPublicKey)?;

    let keys = derive_keys(&ecdh_secret, auth_secret, ua_public, as_public.as_ref(), &salt)?;

    let mut record = Vec::with_capacity(plaintext.len() + 1 + TAG_LEN);
    record.extend_from_slice(plaintext);
    record.push(LAST_RECORD_DELIMITER);

    let key = aead::LessSafeKey::new(aead::UnboundKey::new(&aead::AES_128_GCM, &keys.cek)?);
    key.seal_in_place_append_tag(
        aead::Nonce::assume_unique_for_key(keys.nonce),
        aead::Aad::empty(),
        &mut record,
    )?;

    let mut body = Vec::with_capacity(HEADER_LEN + record.len());
    body.extend_from_slice(&salt);
    body.extend_from_slice(&RECORD_SIZE.to_be_bytes());
    body.push(KEY_ID_LEN as u8);
    body.extend_from_slice(as_public.as_ref());
    body.extend_from_slice(&record);
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Subscriber {
        private: agreement::EphemeralPrivateKey,
        public: Vec<u8>,
        auth: [u8; 16],
    }

    fn subscriber() -> Subscriber {
        let rng = SystemRandom::new();
        let private = agreement::EphemeralPrivateKey::generate(&agreement::ECDH_P256, &rng).unwrap();
        let public = private.compute_public_key().unwrap().as_ref().to_vec();
        let mut auth = [0u8; 16];
        rng.fill(&mut auth).unwrap();
        Subscriber { private, public, auth }
    }

    /// What the browser does on receipt
    fn decrypt(sub: Subscriber, body: &[u8]) -> Vec<u8> {
        let salt = &body[..SALT_LEN];
        let rs = u32::from_be_bytes(body[16..20].try_into().unwrap());
        assert_eq!(rs, RECORD_SIZE);
        assert_eq!(body[20] as usize, KEY_ID_LEN);
        let as_public = &body[21..HEADER_LEN];

        let peer = agreement::UnparsedPublicKey::new(&agreement::ECDH_P256, as_public);
        let ecdh = agreement::agree_ephemeral(sub.private, &peer, |s| s.to_vec()).unwrap();
        let keys = derive_keys(&ecdh, &sub.auth, &sub.public, as_public, salt).unwrap();

        let key = aead::LessSafeKey::new(aead::UnboundKey::new(&aead::AES_128_GCM, &keys.cek).unwrap());
        let mut record = body[HEADER_LEN..].to_vec();
        let plain = key
            .open_in_place(
                aead::Nonce::assume_unique_for_key(keys.nonce),
                aead::Aad::empty(),
                &mut record,
            )
            .unwrap();
        assert_eq!(plain.last(), Some(&LAST_RECORD_DELIMITER));
        plain[..plain.len() - 1].to_vec()
    }

    #[test]
    fn test_subscriber_can_decrypt() {
        let sub = subscriber();
        let plaintext = br#"{"title":"Hello","body":"From the relay"}"#;
        let body = encrypt(&sub.public, &sub.auth, plaintext).unwrap();

        assert_eq!(body.len(), HEADER_LEN + plaintext.len() + 1 + TAG_LEN);
        assert_eq!(decrypt(sub, &body), plaintext);
    }

    #[test]
    fn test_each_message_uses_fresh_salt_and_key() {
        let sub = subscriber();
        let a = encrypt(&sub.public, &sub.auth, b"same").unwrap();
        let b = encrypt(&sub.public, &sub.auth, b"same").unwrap();
        assert_ne!(a[..HEADER_LEN], b[..HEADER_LEN]);
        assert_ne!(a[HEADER_LEN..], b[HEADER_LEN..]);
    }

    #[test]
    fn test_largest_payload_fills_one_record() {
        let sub = subscriber();
        let plaintext = vec![b'a'; MAX_PLAINTEXT_LEN];
        let body = encrypt(&sub.public, &sub.auth, &plaintext).unwrap();
        assert_eq!(body.len(), RECORD_SIZE as usize);

        let too_big = vec![b'a'; MAX_PLAINTEXT_LEN + 1];
        assert!(matches!(
            encrypt(&sub.public, &sub.auth, &too_big),
            Err(EceError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn test_rejects_point_not_on_curve() {
        let mut bogus = vec![0x04];
        bogus.extend([0xffu8; 64]);
        assert!(matches!(
            encrypt(&bogus, &[0u8; 16], b"x"),
            Err(EceError::InvalidPublicKey)
        ));
    }
}
