//! Endpoint operations
//!
//! Stateless operation structs borrowing the client session; obtained via
//! the accessor methods on [`crate::AcmeClient`].

pub mod account;
pub mod authorization;
pub mod certificate;
pub mod order;
pub mod renewal_info;

pub use account::AccountEndpoint;
pub use authorization::AuthorizationEndpoint;
pub use certificate::CertificateEndpoint;
pub use order::OrderEndpoint;
pub use renewal_info::RenewalInfoEndpoint;
