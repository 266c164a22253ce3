//! JSON Web Key derivation and RFC 7638 thumbprints
//!
//! Members of each JWK variant are declared in lexicographic order, so the
//! serialized form is already the canonical form RFC 7638 hashes over:
//! identical key material always yields byte-identical JWK JSON.

use openssl::bn::{BigNum, BigNumContext};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::b64;
use crate::error::AcmeError;
use crate::keys::{AccountKeys, Curve, JwsAlgorithm};

/// Public JSON Web Key representation of an account key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Jwk {
    /// Elliptic-curve key: `{crv, kty, x, y}`
    Ec {
        crv: String,
        kty: String,
        x: String,
        y: String,
    },
    /// RSA key: `{e, kty, n}`
    Rsa {
        e: String,
        kty: String,
        n: String,
    },
}

impl Jwk {
    /// Compute the JWK for an account key.
    ///
    /// RSA moduli and exponents are big-endian unsigned integers without
    /// leading zeros; EC coordinates are zero-left-padded to the curve's
    /// full coordinate width.
    pub fn from_keys(keys: &AccountKeys) -> Result<Self, AcmeError> {
        match keys.algorithm()? {
            JwsAlgorithm::Rs256 => {
                let rsa = keys.pkey().rsa()?;
                Ok(Jwk::Rsa {
                    e: b64::url_safe_encode(rsa.e().to_vec()),
                    kty: "RSA".to_string(),
                    n: b64::url_safe_encode(rsa.n().to_vec()),
                })
            }
            alg => {
                let curve = alg.curve().ok_or(AcmeError::UnsupportedKeyType)?;
                Ok(Self::from_ec_key(keys, curve)?)
            }
        }
    }

    fn from_ec_key(keys: &AccountKeys, curve: Curve) -> Result<Self, AcmeError> {
        let ec = keys.pkey().ec_key()?;
        let mut ctx = BigNumContext::new()?;
        let mut x = BigNum::new()?;
        let mut y = BigNum::new()?;
        ec.public_key()
            .affine_coordinates(ec.group(), &mut x, &mut y, &mut ctx)?;

        let width = curve.coordinate_len() as i32;
        Ok(Jwk::Ec {
            crv: curve.jwk_name().to_string(),
            kty: "EC".to_string(),
            x: b64::url_safe_encode(x.to_vec_padded(width)?),
            y: b64::url_safe_encode(y.to_vec_padded(width)?),
        })
    }

    /// RFC 7638 thumbprint: base64url(SHA-256(canonical JWK JSON)).
    pub fn thumbprint(&self) -> Result<String, AcmeError> {
        let canonical = serde_json::to_string(self)?;
        let digest = Sha256::digest(canonical.as_bytes());
        Ok(b64::url_safe_encode(digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeySpec;

    #[test]
    fn test_rsa_jwk_shape() {
        let keys = AccountKeys::generate_rsa(2048).unwrap();
        let jwk = Jwk::from_keys(&keys).unwrap();
        match &jwk {
            Jwk::Rsa { e, kty, n } => {
                assert_eq!(kty, "RSA");
                assert!(!e.is_empty());
                // 2048-bit modulus -> 256 bytes -> 342 base64url chars
                assert_eq!(n.len(), 342);
            }
            Jwk::Ec { .. } => panic!("expected RSA JWK"),
        }
    }

    #[test]
    fn test_ec_jwk_curve_names_and_widths() {
        for (curve, name, b64_len) in [
            (Curve::P256, "P-256", 43),
            (Curve::P384, "P-384", 64),
            (Curve::P521, "P-521", 88),
        ] {
            let keys = AccountKeys::generate_ec(curve).unwrap();
            let jwk = Jwk::from_keys(&keys).unwrap();
            match &jwk {
                Jwk::Ec { crv, kty, x, y } => {
                    assert_eq!(kty, "EC");
                    assert_eq!(crv, name);
                    // padded coordinates always encode to the same length
                    assert_eq!(x.len(), b64_len);
                    assert_eq!(y.len(), b64_len);
                }
                Jwk::Rsa { .. } => panic!("expected EC JWK"),
            }
        }
    }

    #[test]
    fn test_jwk_is_deterministic() {
        for spec in [
            KeySpec::Rsa(2048),
            KeySpec::Rsa(3072),
            KeySpec::Ec(Curve::P256),
            KeySpec::Ec(Curve::P384),
            KeySpec::Ec(Curve::P521),
        ] {
            let keys = AccountKeys::generate(spec).unwrap();
            let first = Jwk::from_keys(&keys).unwrap();
            let second = Jwk::from_keys(&keys).unwrap();
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
            assert_eq!(
                first.thumbprint().unwrap(),
                second.thumbprint().unwrap()
            );
        }
    }

    #[test]
    fn test_canonical_member_order() {
        let keys = AccountKeys::generate_ec(Curve::P256).unwrap();
        let jwk = Jwk::from_keys(&keys).unwrap();
        let json = serde_json::to_string(&jwk).unwrap();
        let crv = json.find("\"crv\"").unwrap();
        let kty = json.find("\"kty\"").unwrap();
        let x = json.find("\"x\"").unwrap();
        let y = json.find("\"y\"").unwrap();
        assert!(crv < kty && kty < x && x < y);
    }

    #[test]
    fn test_thumbprint_matches_known_vector() {
        // RFC 7638 §3.1 example key and thumbprint
        let jwk = Jwk::Rsa {
            e: "AQAB".to_string(),
            kty: "RSA".to_string(),
            n: "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw"
                .to_string(),
        };
        assert_eq!(
            jwk.thumbprint().unwrap(),
            "NzbLsXh8uDCcd-6MNwXF4W_7noWXFZAfHkxZsRGC9Xs"
        );
    }
}
