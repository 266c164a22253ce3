//! URL-safe base64 encoding without padding
//!
//! Every base64 value on the ACME wire (JWS segments, CSRs, ARI CertIDs)
//! uses the URL-safe alphabet with padding stripped (RFC 4648 §5).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::AcmeError;

/// Encode bytes as URL-safe base64 without padding.
pub fn url_safe_encode(input: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Decode URL-safe base64, tolerating trailing padding characters.
///
/// Some issuers hand out EAB HMAC keys with `=` padding attached; the
/// padding carries no information, so it is stripped before decoding.
pub fn url_safe_decode(input: &str) -> Result<Vec<u8>, AcmeError> {
    URL_SAFE_NO_PAD
        .decode(input.trim_end_matches('='))
        .map_err(|e| AcmeError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_is_url_safe() {
        let encoded = url_safe_encode([0xfb, 0xff, 0xfe, 0x00, 0x01]);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
    }

    #[test]
    fn test_decode_tolerates_padding() {
        let padded = "aGVsbG8=";
        assert_eq!(url_safe_decode(padded).unwrap(), b"hello");
    }

    #[test]
    fn test_decode_rejects_invalid_alphabet() {
        assert!(url_safe_decode("not+valid/chars").is_err());
    }

    proptest! {
        #[test]
        fn test_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let encoded = url_safe_encode(&bytes);
            prop_assert!(!encoded.contains('+'));
            prop_assert!(!encoded.contains('/'));
            prop_assert!(!encoded.contains('='));
            prop_assert_eq!(url_safe_decode(&encoded).unwrap(), bytes);
        }
    }
}
