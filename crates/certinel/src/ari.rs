//! ARI certificate identity
//!
//! ARI (RFC 9773) keys renewal information on a CertID derived from the
//! certificate itself: `base64url(AuthorityKeyIdentifier) + "." +
//! base64url(SerialNumber)`. The format must round-trip losslessly; the
//! CA matches it byte-for-byte against issued certificates.

use std::fmt;
use std::str::FromStr;

use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;

use crate::b64;
use crate::data::bundle::leaf_block;
use crate::error::AcmeError;

/// An ARI certificate identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertId {
    aki: Vec<u8>,
    serial: Vec<u8>,
}

impl CertId {
    /// Build from raw Authority Key Identifier and serial number bytes.
    ///
    /// # Errors
    ///
    /// Either part being empty is an error; an empty segment cannot
    /// round-trip through the wire format.
    pub fn from_parts(aki: Vec<u8>, serial: Vec<u8>) -> Result<Self, AcmeError> {
        if aki.is_empty() {
            return Err(AcmeError::InvalidCertId(
                "authority key identifier is empty".to_string(),
            ));
        }
        if serial.is_empty() {
            return Err(AcmeError::InvalidCertId("serial number is empty".to_string()));
        }
        Ok(Self { aki, serial })
    }

    /// Build from openssl-style text output.
    ///
    /// The AKI may carry a `keyid:` prefix and colon-separated bytes; the
    /// serial may carry a `0x` prefix and an odd number of digits.
    pub fn from_hex_parts(aki_hex: &str, serial_hex: &str) -> Result<Self, AcmeError> {
        Self::from_parts(aki_from_hex(aki_hex)?, serial_from_hex(serial_hex)?)
    }

    /// Derive the CertID from a leaf certificate PEM.
    ///
    /// # Errors
    ///
    /// Fails when the PEM cannot be parsed or the certificate carries no
    /// Authority Key Identifier extension.
    pub fn from_pem(cert_pem: &str) -> Result<Self, AcmeError> {
        let (_, pem) = parse_x509_pem(cert_pem.as_bytes())
            .map_err(|e| AcmeError::Certificate(format!("failed to parse PEM: {e}")))?;
        let (_, cert) = X509Certificate::from_der(&pem.contents)
            .map_err(|e| AcmeError::Certificate(format!("failed to parse certificate: {e}")))?;

        let aki = cert
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                ParsedExtension::AuthorityKeyIdentifier(aki) => {
                    aki.key_identifier.as_ref().map(|k| k.0.to_vec())
                }
                _ => None,
            })
            .ok_or_else(|| {
                AcmeError::Certificate(
                    "certificate has no Authority Key Identifier extension".to_string(),
                )
            })?;

        Self::from_parts(aki, cert.raw_serial().to_vec())
    }

    /// Derive the CertID from the first certificate of a PEM bundle.
    pub fn from_bundle(bundle: &str) -> Result<Self, AcmeError> {
        let leaf = leaf_block(bundle)
            .ok_or_else(|| AcmeError::Certificate("no certificate found in bundle".to_string()))?;
        Self::from_pem(&leaf)
    }

    /// Parse the wire form `base64url(aki).base64url(serial)`.
    ///
    /// # Errors
    ///
    /// Rejects anything without exactly one `.` separator, with empty
    /// segments, or with invalid base64url content.
    pub fn parse(cert_id: &str) -> Result<Self, AcmeError> {
        let mut parts = cert_id.split('.');
        let (aki64, serial64) = match (parts.next(), parts.next(), parts.next()) {
            (Some(aki), Some(serial), None) => (aki, serial),
            _ => {
                return Err(AcmeError::InvalidCertId(format!(
                    "expected base64url(aki).base64url(serial), got '{cert_id}'"
                )))
            }
        };
        if aki64.is_empty() || serial64.is_empty() {
            return Err(AcmeError::InvalidCertId(format!(
                "empty segment in '{cert_id}'"
            )));
        }

        let decode = |segment: &str| {
            b64::url_safe_decode(segment)
                .map_err(|_| AcmeError::InvalidCertId(format!("invalid base64url in '{cert_id}'")))
        };
        Self::from_parts(decode(aki64)?, decode(serial64)?)
    }

    /// Check whether a string is a well-formed CertID.
    pub fn is_valid(cert_id: &str) -> bool {
        Self::parse(cert_id).is_ok()
    }

    /// Raw Authority Key Identifier bytes.
    pub fn aki(&self) -> &[u8] {
        &self.aki
    }

    /// Raw serial number bytes as they appear in the certificate's DER.
    pub fn serial(&self) -> &[u8] {
        &self.serial
    }
}

impl fmt::Display for CertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            b64::url_safe_encode(&self.aki),
            b64::url_safe_encode(&self.serial)
        )
    }
}

impl FromStr for CertId {
    type Err = AcmeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Normalize an openssl-style AKI string to raw bytes.
///
/// Accepts `keyid:AB:CD:...`, bare `AB:CD:...`, or plain hex.
fn aki_from_hex(text: &str) -> Result<Vec<u8>, AcmeError> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix("keyid:").unwrap_or(trimmed).trim();
    let compact: String = trimmed.chars().filter(|c| *c != ':').collect();
    decode_hex(&compact)
}

/// Normalize a serial number hex string to raw bytes.
///
/// Accepts an optional `0x` prefix and pads odd-length input with a
/// leading zero digit.
fn serial_from_hex(text: &str) -> Result<Vec<u8>, AcmeError> {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if trimmed.len() % 2 == 1 {
        decode_hex(&format!("0{trimmed}"))
    } else {
        decode_hex(trimmed)
    }
}

fn decode_hex(text: &str) -> Result<Vec<u8>, AcmeError> {
    hex::decode(text).map_err(|e| AcmeError::Encoding(format!("invalid hex: {e}")))
}
