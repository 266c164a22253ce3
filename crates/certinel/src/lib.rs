//! Certinel ACME Client Library
//!
//! An ACME (RFC 8555) client for obtaining, renewing, and revoking X.509
//! certificates from automated CAs such as Let's Encrypt, with ARI
//! (RFC 9773) renewal scheduling.
//!
//! This library provides the protocol core:
//!
//! - **JWS Signing**: ACME-flavored JSON Web Signatures for RSA and ECDSA
//!   account keys, with JWK thumbprints and External Account Binding
//! - **Accounts**: account creation/lookup and key-pair persistence
//! - **Orders**: order creation, authorization polling, CSR finalization
//! - **Certificates**: bundle download, splitting, revocation
//! - **Renewal Scheduling**: ARI suggested windows merged with
//!   expiry-based fallback and anti-thundering-herd jitter
//!
//! # Example
//!
//! ```ignore
//! use certinel::{AccountKeys, AcmeClient, Curve};
//!
//! let keys = AccountKeys::generate_ec(Curve::P384)?;
//! let client = AcmeClient::builder()
//!     .staging(true)
//!     .account_keys(keys)
//!     .build()?;
//!
//! let account = client
//!     .account()
//!     .create(&["mailto:admin@example.com".to_string()], None)
//!     .await?;
//! let order = client
//!     .orders()
//!     .create(&account, &["example.com".to_string()], None)
//!     .await?;
//! ```
//!
//! HTTP transport is pluggable through [`HttpTransport`]; a reqwest-based
//! implementation is bundled. Retry/backoff policy is an outer concern;
//! the client surfaces exact status codes and `Retry-After` values so an
//! external retrier can act correctly, and never retries a signed request
//! itself (nonces are single-use).

// ============================================================================
// Module Declarations
// ============================================================================

pub mod ari;
pub mod b64;
pub mod client;
pub mod data;
pub mod directory;
pub mod endpoints;
pub mod error;
pub mod jose;
pub mod keys;
pub mod nonce;
pub mod renewal;
pub mod storage;
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;

// ============================================================================
// Public API Re-exports
// ============================================================================

// Client session
pub use client::{AcmeClient, AcmeClientBuilder, LETSENCRYPT_PRODUCTION, LETSENCRYPT_STAGING};

// Keys and signing
pub use jose::eab::EabCredentials;
pub use jose::jwk::Jwk;
pub use keys::{AccountKeys, Curve, JwsAlgorithm, KeySpec};

// Data entities
pub use data::{
    AccountData, Authorization, AuthorizationStatus, CertificateBundle, Challenge, Identifier,
    Order, OrderStatus, RenewalInfo,
};

// Directory
pub use directory::{Directory, DirectoryMeta};

// ARI identity and renewal scheduling
pub use ari::CertId;
pub use renewal::RenewalManager;

// Storage
pub use storage::AccountStore;

// Errors
pub use error::{AcmeError, Problem, StorageError, Subproblem};

// Transport seam
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
