//! Account key pairs
//!
//! An ACME account is identified by an asymmetric key pair. Supported key
//! types are RSA (2048/3072/4096 bits) and ECDSA (P-256/P-384/P-521); the
//! JWS signing algorithm is derived from the key material, never configured
//! separately.

use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{Id, PKey, Private};
use openssl::rsa::Rsa;

use crate::error::AcmeError;

/// RSA key sizes accepted for account keys
const RSA_KEY_SIZES: [u32; 3] = [2048, 3072, 4096];

/// Supported ECDSA curves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    P256,
    P384,
    P521,
}

impl Curve {
    /// JWK standard curve name (RFC 7518 §6.2.1.1)
    pub fn jwk_name(&self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
        }
    }

    /// Byte length of one signature coordinate (r or s) on this curve
    pub fn coordinate_len(&self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }

    /// Parse a JWK-style curve name (`P-256`, `P-384`, `P-521`).
    pub fn from_jwk_name(name: &str) -> Option<Self> {
        match name {
            "P-256" => Some(Curve::P256),
            "P-384" => Some(Curve::P384),
            "P-521" => Some(Curve::P521),
            _ => None,
        }
    }

    pub(crate) fn nid(&self) -> Nid {
        match self {
            Curve::P256 => Nid::X9_62_PRIME256V1,
            Curve::P384 => Nid::SECP384R1,
            Curve::P521 => Nid::SECP521R1,
        }
    }

    pub(crate) fn from_nid(nid: Nid) -> Option<Self> {
        match nid {
            Nid::X9_62_PRIME256V1 => Some(Curve::P256),
            Nid::SECP384R1 => Some(Curve::P384),
            Nid::SECP521R1 => Some(Curve::P521),
            _ => None,
        }
    }
}

/// JWS signing algorithm, detected from the account key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwsAlgorithm {
    Rs256,
    Es256,
    Es384,
    Es512,
}

impl JwsAlgorithm {
    /// Wire name for the protected header's `alg` member
    pub fn name(&self) -> &'static str {
        match self {
            JwsAlgorithm::Rs256 => "RS256",
            JwsAlgorithm::Es256 => "ES256",
            JwsAlgorithm::Es384 => "ES384",
            JwsAlgorithm::Es512 => "ES512",
        }
    }

    /// The curve behind an ECDSA algorithm; `None` for RSA
    pub fn curve(&self) -> Option<Curve> {
        match self {
            JwsAlgorithm::Rs256 => None,
            JwsAlgorithm::Es256 => Some(Curve::P256),
            JwsAlgorithm::Es384 => Some(Curve::P384),
            JwsAlgorithm::Es512 => Some(Curve::P521),
        }
    }

    pub(crate) fn digest(&self) -> MessageDigest {
        match self {
            JwsAlgorithm::Rs256 | JwsAlgorithm::Es256 => MessageDigest::sha256(),
            JwsAlgorithm::Es384 => MessageDigest::sha384(),
            JwsAlgorithm::Es512 => MessageDigest::sha512(),
        }
    }
}

/// What kind of key pair to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySpec {
    Rsa(u32),
    Ec(Curve),
}

impl Default for KeySpec {
    /// ECDSA P-384, the historical default for new accounts
    fn default() -> Self {
        KeySpec::Ec(Curve::P384)
    }
}

/// An account's asymmetric key pair.
///
/// The pair exists iff a private key is present; the public half is always
/// derived from it. Rotation via [`AccountKeys::regenerate`] replaces both
/// halves atomically.
pub struct AccountKeys {
    pkey: PKey<Private>,
}

impl AccountKeys {
    /// Generate an RSA account key.
    ///
    /// # Errors
    ///
    /// Returns an error for key sizes other than 2048, 3072, or 4096 bits.
    pub fn generate_rsa(bits: u32) -> Result<Self, AcmeError> {
        if !RSA_KEY_SIZES.contains(&bits) {
            return Err(AcmeError::Crypto(format!(
                "invalid RSA key size: {bits} (supported: 2048, 3072, 4096)"
            )));
        }
        let rsa = Rsa::generate(bits)?;
        Ok(Self {
            pkey: PKey::from_rsa(rsa)?,
        })
    }

    /// Generate an ECDSA account key on the given curve.
    pub fn generate_ec(curve: Curve) -> Result<Self, AcmeError> {
        let group = EcGroup::from_curve_name(curve.nid())?;
        let ec = EcKey::generate(&group)?;
        Ok(Self {
            pkey: PKey::from_ec_key(ec)?,
        })
    }

    /// Generate a key pair from a [`KeySpec`].
    pub fn generate(spec: KeySpec) -> Result<Self, AcmeError> {
        match spec {
            KeySpec::Rsa(bits) => Self::generate_rsa(bits),
            KeySpec::Ec(curve) => Self::generate_ec(curve),
        }
    }

    /// Import an existing private key from PEM (PKCS#8 or traditional).
    pub fn from_private_key_pem(pem: &str) -> Result<Self, AcmeError> {
        let pkey = PKey::private_key_from_pem(pem.as_bytes())?;
        Ok(Self { pkey })
    }

    /// Export the private key as PKCS#8 PEM.
    pub fn private_key_pem(&self) -> Result<String, AcmeError> {
        let pem = self.pkey.private_key_to_pem_pkcs8()?;
        String::from_utf8(pem).map_err(|e| AcmeError::Crypto(e.to_string()))
    }

    /// Export the public key as SubjectPublicKeyInfo PEM.
    pub fn public_key_pem(&self) -> Result<String, AcmeError> {
        let pem = self.pkey.public_key_to_pem()?;
        String::from_utf8(pem).map_err(|e| AcmeError::Crypto(e.to_string()))
    }

    /// Replace the key pair with a freshly generated one.
    ///
    /// Both halves change together; the old key is dropped only after the
    /// new one was generated successfully.
    pub fn regenerate(&mut self, spec: KeySpec) -> Result<(), AcmeError> {
        let fresh = Self::generate(spec)?;
        self.pkey = fresh.pkey;
        Ok(())
    }

    /// Detect the JWS signing algorithm for this key.
    ///
    /// # Errors
    ///
    /// [`AcmeError::UnsupportedKeyType`] for non-RSA/EC keys,
    /// [`AcmeError::UnsupportedCurve`] for EC keys on unsupported curves.
    pub fn algorithm(&self) -> Result<JwsAlgorithm, AcmeError> {
        match self.pkey.id() {
            Id::RSA => Ok(JwsAlgorithm::Rs256),
            Id::EC => {
                let ec = self.pkey.ec_key()?;
                let nid = ec
                    .group()
                    .curve_name()
                    .ok_or_else(|| AcmeError::UnsupportedCurve("unnamed curve".to_string()))?;
                match Curve::from_nid(nid) {
                    Some(Curve::P256) => Ok(JwsAlgorithm::Es256),
                    Some(Curve::P384) => Ok(JwsAlgorithm::Es384),
                    Some(Curve::P521) => Ok(JwsAlgorithm::Es512),
                    None => Err(AcmeError::UnsupportedCurve(
                        nid.long_name().unwrap_or("unknown").to_string(),
                    )),
                }
            }
            _ => Err(AcmeError::UnsupportedKeyType),
        }
    }

    pub(crate) fn pkey(&self) -> &PKey<Private> {
        &self.pkey
    }
}

impl std::fmt::Debug for AccountKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountKeys")
            .field("algorithm", &self.algorithm().map(|a| a.name()))
            .finish()
    }
}
