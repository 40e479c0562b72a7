//! Base64url helpers for VAPID and subscription keys.
//!
//! Browsers hand out subscription keys as unpadded base64url, while some
//! tooling emits padded or standard-alphabet base64. Decoding accepts every
//! variant; encoding always produces unpadded base64url, which is what
//! `PushManager.subscribe` expects for `applicationServerKey`.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use thiserror::Error;

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error)]
#[error("invalid base64url key: {0}")]
pub struct KeyDecodeError(#[from] base64::DecodeError);

/// Decode a base64url (or standard base64) string, with or without padding.
pub fn decode_base64url(input: &str) -> Result<Vec<u8>, KeyDecodeError> {
    let normalized: String = input
        .trim()
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    Ok(URL_SAFE_LENIENT.decode(normalized)?)
}

/// Encode bytes as unpadded base64url.
pub fn encode_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_vector() {
        assert_eq!(decode_base64url("Zm9vYmFy").unwrap(), b"foobar");
        assert_eq!(decode_base64url("Zm9vYg").unwrap(), b"foob");
        assert_eq!(decode_base64url("Zm9vYg==").unwrap(), b"foob");
    }

    #[test]
    fn test_decode_url_and_standard_alphabets() {
        assert_eq!(decode_base64url("-_8").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(decode_base64url("+/8=").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn test_round_trip_preserves_bytes() {
        for len in 0..70usize {
            let bytes: Vec<u8> = (0..len).map(|i| (i * 37 % 256) as u8).collect();
            let encoded = encode_base64url(&bytes);
            assert!(!encoded.contains('='));
            let decoded = decode_base64url(&encoded).unwrap();
            assert_eq!(decoded.len(), len);
            assert_eq!(decoded, bytes);
        }
    }

    #[test]
    fn test_decode_uncompressed_point_length() {
        // 65-byte uncompressed P-256 point, as produced by PushSubscription.getKey("p256dh")
        let mut point = vec![0x04];
        point.extend((1..=64).map(|i| i as u8));
        let encoded = encode_base64url(&point);
        assert_eq!(encoded.len(), 87);
        assert_eq!(decode_base64url(&encoded).unwrap(), point);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_base64url("not base64!").is_err());
        assert!(decode_base64url("A").is_err());
    }
}
