//! ECDSA signature format conversion
//!
//! The crypto provider emits ECDSA signatures as ASN.1 DER sequences of two
//! variable-length INTEGERs; JWS requires the raw fixed-width `r ‖ s`
//! concatenation (RFC 7518 §3.4). Both integers are stripped of any DER
//! sign byte and zero-left-padded to the curve's coordinate width.

use crate::error::AcmeError;

/// Convert a DER-encoded ECDSA signature to raw `r ‖ s`.
///
/// `coordinate_len` is the per-coordinate byte width of the curve (32 for
/// P-256, 48 for P-384, 66 for P-521); the output is always exactly
/// `2 * coordinate_len` bytes.
///
/// # Errors
///
/// Any unexpected tag byte or truncation is a hard failure; a malformed
/// signature must never be silently truncated or padded into validity.
pub(crate) fn der_signature_to_fixed(
    der: &[u8],
    coordinate_len: usize,
) -> Result<Vec<u8>, AcmeError> {
    let mut offset = 0usize;

    if read_byte(der, offset)? != 0x30 {
        return Err(AcmeError::MalformedSignature("missing SEQUENCE tag"));
    }
    offset += 1;

    // Skip the sequence length; long-form lengths carry extra octets.
    let length = read_byte(der, offset)?;
    offset += 1;
    if length & 0x80 != 0 {
        offset += (length & 0x7f) as usize;
    }

    let (r, next) = read_integer(der, offset)?;
    let (s, _) = read_integer(der, next)?;

    let mut raw = Vec::with_capacity(2 * coordinate_len);
    raw.extend_from_slice(&pad_coordinate(r, coordinate_len)?);
    raw.extend_from_slice(&pad_coordinate(s, coordinate_len)?);
    Ok(raw)
}

fn read_byte(der: &[u8], offset: usize) -> Result<u8, AcmeError> {
    der.get(offset)
        .copied()
        .ok_or(AcmeError::MalformedSignature("truncated signature"))
}

/// Read one short-form INTEGER, returning its content and the next offset.
fn read_integer(der: &[u8], mut offset: usize) -> Result<(&[u8], usize), AcmeError> {
    if read_byte(der, offset)? != 0x02 {
        return Err(AcmeError::MalformedSignature("missing INTEGER tag"));
    }
    offset += 1;
    let len = read_byte(der, offset)? as usize;
    offset += 1;
    let content = der
        .get(offset..offset + len)
        .ok_or(AcmeError::MalformedSignature("integer length out of range"))?;
    Ok((content, offset + len))
}

/// Strip DER leading zeros and left-pad to the coordinate width.
fn pad_coordinate(value: &[u8], coordinate_len: usize) -> Result<Vec<u8>, AcmeError> {
    let stripped: &[u8] = {
        let mut v = value;
        while v.len() > 1 && v[0] == 0 {
            v = &v[1..];
        }
        v
    };
    if stripped.len() > coordinate_len {
        return Err(AcmeError::MalformedSignature(
            "integer wider than curve coordinate",
        ));
    }
    let mut padded = vec![0u8; coordinate_len - stripped.len()];
    padded.extend_from_slice(stripped);
    Ok(padded)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a short-form DER signature from raw r and s contents.
    fn der(r: &[u8], s: &[u8]) -> Vec<u8> {
        let mut out = vec![0x30, (4 + r.len() + s.len()) as u8];
        out.push(0x02);
        out.push(r.len() as u8);
        out.extend_from_slice(r);
        out.push(0x02);
        out.push(s.len() as u8);
        out.extend_from_slice(s);
        out
    }

    #[test]
    fn test_fixed_width_output() {
        let sig = der(&[0x01; 32], &[0x02; 32]);
        let raw = der_signature_to_fixed(&sig, 32).unwrap();
        assert_eq!(raw.len(), 64);
        assert_eq!(&raw[..32], &[0x01; 32]);
        assert_eq!(&raw[32..], &[0x02; 32]);
    }

    #[test]
    fn test_strips_der_sign_byte_and_pads() {
        // r carries a leading 0x00 sign byte; s is a single short byte
        let mut r = vec![0x00];
        r.extend_from_slice(&[0xff; 32]);
        let sig = der(&r, &[0x05]);
        let raw = der_signature_to_fixed(&sig, 32).unwrap();
        assert_eq!(raw.len(), 64);
        assert_eq!(&raw[..32], &[0xff; 32]);
        assert_eq!(&raw[32..63], &[0x00; 31]);
        assert_eq!(raw[63], 0x05);
    }

    #[test]
    fn test_rejects_bad_sequence_tag() {
        let mut sig = der(&[0x01; 32], &[0x02; 32]);
        sig[0] = 0x31;
        assert!(matches!(
            der_signature_to_fixed(&sig, 32),
            Err(AcmeError::MalformedSignature(_))
        ));
    }

    #[test]
    fn test_rejects_bad_integer_tag() {
        let mut sig = der(&[0x01; 32], &[0x02; 32]);
        sig[2] = 0x04;
        assert!(matches!(
            der_signature_to_fixed(&sig, 32),
            Err(AcmeError::MalformedSignature(_))
        ));
    }

    #[test]
    fn test_rejects_truncated_input() {
        let sig = der(&[0x01; 32], &[0x02; 32]);
        assert!(der_signature_to_fixed(&sig[..10], 32).is_err());
        assert!(der_signature_to_fixed(&[], 32).is_err());
    }

    #[test]
    fn test_rejects_oversized_integer() {
        let sig = der(&[0x01; 40], &[0x02; 32]);
        assert!(matches!(
            der_signature_to_fixed(&sig, 32),
            Err(AcmeError::MalformedSignature(_))
        ));
    }

    #[test]
    fn test_long_form_sequence_length() {
        // P-521 signatures exceed 127 bytes, forcing a long-form length
        let r = [0x11u8; 66];
        let s = [0x22u8; 66];
        let mut sig = vec![0x30, 0x81, (4 + r.len() + s.len()) as u8];
        sig.push(0x02);
        sig.push(r.len() as u8);
        sig.extend_from_slice(&r);
        sig.push(0x02);
        sig.push(s.len() as u8);
        sig.extend_from_slice(&s);

        let raw = der_signature_to_fixed(&sig, 66).unwrap();
        assert_eq!(raw.len(), 132);
    }
}
