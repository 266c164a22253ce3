//! Shared helpers for integration tests
//!
//! Stands up a wiremock ACME server: directory document, nonce endpoint,
//! and factories for test certificates and CSRs.

#![allow(dead_code)]

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::extension::{AuthorityKeyIdentifier, BasicConstraints, SubjectKeyIdentifier};
use openssl::x509::{X509Name, X509ReqBuilder, X509};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use certinel::{AccountKeys, AcmeClient, Curve};

/// Mount the directory document at `/dir`.
pub async fn mock_directory(server: &MockServer, with_ari: bool) {
    let uri = server.uri();
    let mut directory = serde_json::json!({
        "newNonce": format!("{uri}/acme/new-nonce"),
        "newAccount": format!("{uri}/acme/new-account"),
        "newOrder": format!("{uri}/acme/new-order"),
        "revokeCert": format!("{uri}/acme/revoke-cert"),
        "meta": { "termsOfService": format!("{uri}/terms") }
    });
    if with_ari {
        directory["renewalInfo"] = serde_json::json!(format!("{uri}/acme/renewal-info"));
    }

    Mock::given(method("GET"))
        .and(path("/dir"))
        .respond_with(ResponseTemplate::new(200).set_body_json(directory))
        .mount(server)
        .await;
}

/// Mount the nonce endpoint; every HEAD returns a fresh-looking nonce.
pub async fn mock_nonce(server: &MockServer) {
    Mock::given(method("HEAD"))
        .and(path("/acme/new-nonce"))
        .respond_with(ResponseTemplate::new(200).insert_header("Replay-Nonce", "test-nonce-1"))
        .mount(server)
        .await;
}

/// Mount a successful new-account response.
pub async fn mock_account(server: &MockServer, account_id: &str) {
    let location = format!("{}/acme/acct/{account_id}", server.uri());
    Mock::given(method("POST"))
        .and(path("/acme/new-account"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Location", location.as_str())
                .set_body_json(serde_json::json!({ "status": "valid" })),
        )
        .mount(server)
        .await;
}

/// A client pointed at the mock server's directory.
pub fn client(server: &MockServer, keys: AccountKeys) -> AcmeClient {
    AcmeClient::builder()
        .base_url(format!("{}/dir", server.uri()))
        .account_keys(keys)
        .build()
        .unwrap()
}

/// A client without account keys.
pub fn anonymous_client(server: &MockServer) -> AcmeClient {
    AcmeClient::builder()
        .base_url(format!("{}/dir", server.uri()))
        .build()
        .unwrap()
}

pub fn p384_keys() -> AccountKeys {
    AccountKeys::generate_ec(Curve::P384).unwrap()
}

/// A freshly issued test certificate chain.
pub struct TestCert {
    pub leaf_pem: String,
    pub ca_pem: String,
    pub serial: Vec<u8>,
}

fn p256_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

fn x509_name(cn: &str) -> X509Name {
    let mut builder = X509Name::builder().unwrap();
    builder.append_entry_by_text("CN", cn).unwrap();
    builder.build()
}

/// Issue a CA + leaf pair; the leaf expires `not_after_days` from now and
/// carries an Authority Key Identifier (required for ARI CertIDs).
pub fn issue_test_cert(not_after_days: u32) -> TestCert {
    let ca_key = p256_key();
    let ca_name = x509_name("certinel test ca");

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let ca_serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&ca_serial).unwrap();
    builder.set_subject_name(&ca_name).unwrap();
    builder.set_issuer_name(&ca_name).unwrap();
    builder.set_pubkey(&ca_key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(3650).unwrap())
        .unwrap();
    builder
        .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
        .unwrap();
    let ski = SubjectKeyIdentifier::new()
        .build(&builder.x509v3_context(None, None))
        .unwrap();
    builder.append_extension(ski).unwrap();
    builder.sign(&ca_key, MessageDigest::sha256()).unwrap();
    let ca_cert = builder.build();

    let leaf_key = p256_key();
    let serial_bytes = vec![0x07, 0xf2, 0x55, 0x83, 0x10, 0x9f];

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let leaf_serial = BigNum::from_slice(&serial_bytes)
        .unwrap()
        .to_asn1_integer()
        .unwrap();
    builder.set_serial_number(&leaf_serial).unwrap();
    builder.set_subject_name(&x509_name("example.com")).unwrap();
    builder.set_issuer_name(ca_cert.subject_name()).unwrap();
    builder.set_pubkey(&leaf_key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(not_after_days).unwrap())
        .unwrap();
    let aki = AuthorityKeyIdentifier::new()
        .keyid(true)
        .build(&builder.x509v3_context(Some(&ca_cert), None))
        .unwrap();
    builder.append_extension(aki).unwrap();
    builder.sign(&ca_key, MessageDigest::sha256()).unwrap();
    let leaf = builder.build();

    TestCert {
        leaf_pem: String::from_utf8(leaf.to_pem().unwrap()).unwrap(),
        ca_pem: String::from_utf8(ca_cert.to_pem().unwrap()).unwrap(),
        serial: serial_bytes,
    }
}

/// A PEM-armored CSR for `example.com`.
pub fn test_csr_pem() -> String {
    let key = p256_key();
    let mut builder = X509ReqBuilder::new().unwrap();
    builder.set_pubkey(&key).unwrap();
    builder.set_subject_name(&x509_name("example.com")).unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();
    String::from_utf8(builder.build().to_pem().unwrap()).unwrap()
}

/// Decode the protected header of a captured JWS request body.
pub fn decoded_protected_header(body: &[u8]) -> serde_json::Value {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let envelope: serde_json::Value = serde_json::from_slice(body).unwrap();
    let protected = URL_SAFE_NO_PAD
        .decode(envelope["protected"].as_str().unwrap())
        .unwrap();
    serde_json::from_slice(&protected).unwrap()
}

/// Decode the payload of a captured JWS request body; `None` for the empty
/// POST-as-GET payload.
pub fn decoded_payload(body: &[u8]) -> Option<serde_json::Value> {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let envelope: serde_json::Value = serde_json::from_slice(body).unwrap();
    let payload = envelope["payload"].as_str().unwrap();
    if payload.is_empty() {
        return None;
    }
    Some(serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap())
}
