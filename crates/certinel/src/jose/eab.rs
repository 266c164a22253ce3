//! External Account Binding (RFC 8555 §7.3.4)
//!
//! Some CAs require new ACME accounts to be tied to a pre-established
//! identity: a key id plus a shared HMAC secret handed out by the CA. The
//! binding is a nested JWS-like object whose payload is the requesting
//! account's JWK, signed with HMAC-SHA256 instead of the account key.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::b64;
use crate::error::AcmeError;
use crate::jose::jwk::Jwk;
use crate::jose::JwsEnvelope;

/// Minimum decoded HMAC key length accepted
const MIN_HMAC_KEY_LEN: usize = 16;

/// EAB credentials issued by the CA out of band.
#[derive(Debug, Clone)]
pub struct EabCredentials {
    /// Key identifier assigned by the CA
    pub kid: String,
    /// base64url-encoded HMAC secret
    pub hmac_key: String,
}

impl EabCredentials {
    pub fn new(kid: impl Into<String>, hmac_key: impl Into<String>) -> Self {
        Self {
            kid: kid.into(),
            hmac_key: hmac_key.into(),
        }
    }

    /// Check the credentials without building a binding.
    ///
    /// The kid must be non-empty and the HMAC key must base64url-decode to
    /// at least 16 bytes.
    pub fn validate(&self) -> Result<Vec<u8>, AcmeError> {
        if self.kid.is_empty() {
            return Err(AcmeError::ExternalAccountBinding(
                "EAB key id cannot be empty".to_string(),
            ));
        }
        if self.hmac_key.is_empty() {
            return Err(AcmeError::ExternalAccountBinding(
                "EAB HMAC key cannot be empty".to_string(),
            ));
        }
        let secret = b64::url_safe_decode(&self.hmac_key).map_err(|_| {
            AcmeError::ExternalAccountBinding(
                "EAB HMAC key is not valid base64url".to_string(),
            )
        })?;
        if secret.len() < MIN_HMAC_KEY_LEN {
            return Err(AcmeError::ExternalAccountBinding(format!(
                "EAB HMAC key too short: {} bytes (minimum {MIN_HMAC_KEY_LEN})",
                secret.len()
            )));
        }
        Ok(secret)
    }
}

/// Protected header of the binding; field order is the serialized order.
#[derive(serde::Serialize)]
struct EabProtected<'a> {
    alg: &'static str,
    kid: &'a str,
    url: &'a str,
}

/// Build the `externalAccountBinding` object for a new-account payload.
///
/// The protected header is `{alg: "HS256", kid, url}`, the payload is the
/// requesting account's JWK, and the signature is HMAC-SHA256 over
/// `protected.payload` keyed by the decoded EAB secret.
pub(crate) fn create_binding(
    credentials: &EabCredentials,
    account_jwk: &Jwk,
    new_account_url: &str,
) -> Result<JwsEnvelope, AcmeError> {
    let secret = credentials.validate()?;

    let protected = serde_json::to_string(&EabProtected {
        alg: "HS256",
        kid: &credentials.kid,
        url: new_account_url,
    })?;
    let protected64 = b64::url_safe_encode(protected);
    let payload64 = b64::url_safe_encode(serde_json::to_string(account_jwk)?);

    let mut mac = Hmac::<Sha256>::new_from_slice(&secret)
        .map_err(|e| AcmeError::ExternalAccountBinding(e.to_string()))?;
    mac.update(format!("{protected64}.{payload64}").as_bytes());
    let signature = mac.finalize().into_bytes();

    Ok(JwsEnvelope {
        protected: protected64,
        payload: payload64,
        signature: b64::url_safe_encode(signature),
    })
}
