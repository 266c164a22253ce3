//! ACME-flavored JSON Web Signatures
//!
//! Every protocol request is a signed envelope `{protected, payload,
//! signature}`, each segment base64url-encoded without padding. Two header
//! forms exist: `jwk` for requests made before the server has assigned an
//! account URL (newAccount), and `kid` for everything after.
//!
//! Protected headers are serde structs with a fixed field order, so the
//! signed bytes are canonical by construction, with no post-hoc key
//! sorting.

mod ecdsa;
pub mod eab;
pub mod jwk;

use openssl::sign::Signer;
use serde::Serialize;

use crate::b64;
use crate::error::AcmeError;
use crate::keys::{AccountKeys, JwsAlgorithm};
use jwk::Jwk;

/// A signed ACME request body.
#[derive(Debug, Clone, Serialize)]
pub struct JwsEnvelope {
    pub protected: String,
    pub payload: String,
    pub signature: String,
}

impl JwsEnvelope {
    /// The envelope as a JSON value ready for POSTing.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "protected": self.protected,
            "payload": self.payload,
            "signature": self.signature,
        })
    }
}

#[derive(Serialize)]
struct KidProtected<'a> {
    alg: &'a str,
    kid: &'a str,
    nonce: &'a str,
    url: &'a str,
}

#[derive(Serialize)]
struct JwkProtected<'a> {
    alg: &'a str,
    jwk: &'a Jwk,
    nonce: &'a str,
    url: &'a str,
}

/// Sign a request identified by the account URL (`kid` header form).
///
/// `payload` of `None` produces the empty-string payload required for
/// POST-as-GET requests, not `"{}"`.
pub fn sign_with_kid(
    keys: &AccountKeys,
    kid: &str,
    url: &str,
    nonce: &str,
    payload: Option<&serde_json::Value>,
) -> Result<JwsEnvelope, AcmeError> {
    let algorithm = keys.algorithm()?;
    let protected = serde_json::to_string(&KidProtected {
        alg: algorithm.name(),
        kid,
        nonce,
        url,
    })?;
    sign_envelope(keys, algorithm, &protected, payload)
}

/// Sign a request identified by the public key itself (`jwk` header form).
///
/// Used for newAccount, where no account URL exists yet.
pub fn sign_with_jwk(
    keys: &AccountKeys,
    url: &str,
    nonce: &str,
    payload: Option<&serde_json::Value>,
) -> Result<JwsEnvelope, AcmeError> {
    let algorithm = keys.algorithm()?;
    let jwk = Jwk::from_keys(keys)?;
    let protected = serde_json::to_string(&JwkProtected {
        alg: algorithm.name(),
        jwk: &jwk,
        nonce,
        url,
    })?;
    sign_envelope(keys, algorithm, &protected, payload)
}

fn sign_envelope(
    keys: &AccountKeys,
    algorithm: JwsAlgorithm,
    protected: &str,
    payload: Option<&serde_json::Value>,
) -> Result<JwsEnvelope, AcmeError> {
    let protected64 = b64::url_safe_encode(protected);
    let payload64 = match payload {
        Some(value) => b64::url_safe_encode(serde_json::to_string(value)?),
        None => String::new(),
    };

    let signing_input = format!("{protected64}.{payload64}");
    let mut signer = Signer::new(algorithm.digest(), keys.pkey())
        .map_err(|e| AcmeError::Signing(e.to_string()))?;
    let signature = signer
        .sign_oneshot_to_vec(signing_input.as_bytes())
        .map_err(|e| AcmeError::Signing(e.to_string()))?;

    // RSA signatures are already raw; ECDSA comes back as DER
    let signature = match algorithm.curve() {
        Some(curve) => ecdsa::der_signature_to_fixed(&signature, curve.coordinate_len())?,
        None => signature,
    };

    Ok(JwsEnvelope {
        protected: protected64,
        payload: payload64,
        signature: b64::url_safe_encode(signature),
    })
}
