//! Certificate bundle splitting

use serde::{Deserialize, Serialize};

use crate::error::AcmeError;
use crate::transport::HttpResponse;

const BEGIN_CERTIFICATE: &str = "-----BEGIN CERTIFICATE-----";
const END_CERTIFICATE: &str = "-----END CERTIFICATE-----";

/// A downloaded certificate chain split into its parts.
///
/// The server returns a PEM stream; the first certificate is the leaf and
/// the remainder, in order, is the intermediate chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateBundle {
    /// All certificates in original order
    pub fullchain: String,
    /// The leaf (end-entity) certificate
    pub certificate: String,
    /// Intermediate certificates concatenated in original order
    pub intermediate: String,
}

impl CertificateBundle {
    /// Split a PEM stream by scanning BEGIN/END CERTIFICATE markers.
    ///
    /// # Errors
    ///
    /// Returns [`AcmeError::Certificate`] when the stream contains no
    /// certificate blocks.
    pub fn from_pem_stream(stream: &str) -> Result<Self, AcmeError> {
        let blocks = split_pem_blocks(stream);
        if blocks.is_empty() {
            return Err(AcmeError::Certificate(
                "no certificate found in response body".to_string(),
            ));
        }

        Ok(Self {
            fullchain: blocks.join("\n"),
            certificate: blocks[0].clone(),
            intermediate: blocks[1..].join("\n"),
        })
    }

    /// Build a bundle from a certificate-download response.
    pub fn from_response(response: &HttpResponse) -> Result<Self, AcmeError> {
        Self::from_pem_stream(&response.body)
    }
}

/// Collect the PEM certificate blocks of a stream, preserving order.
///
/// Lines outside BEGIN/END markers are ignored; each returned block is
/// trimmed and self-contained.
pub(crate) fn split_pem_blocks(stream: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;

    for line in stream.lines() {
        if line.contains(BEGIN_CERTIFICATE) {
            current = Some(format!("{line}\n"));
        } else if line.contains(END_CERTIFICATE) {
            if let Some(mut block) = current.take() {
                block.push_str(line);
                blocks.push(block);
            }
        } else if let Some(block) = current.as_mut() {
            block.push_str(line);
            block.push('\n');
        }
    }

    blocks
}

/// The first certificate block of a PEM stream, when present.
pub(crate) fn leaf_block(stream: &str) -> Option<String> {
    split_pem_blocks(stream).into_iter().next()
}
