//! Shared helpers for unit tests

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::extension::{AuthorityKeyIdentifier, BasicConstraints, SubjectKeyIdentifier};
use openssl::x509::{X509Name, X509};

/// A freshly issued test certificate chain.
pub(crate) struct TestCert {
    /// Leaf certificate PEM (carries an Authority Key Identifier)
    pub leaf_pem: String,
    /// Self-signed issuer PEM (carries no AKI)
    pub ca_pem: String,
    /// The leaf's serial number bytes as set at issuance
    pub serial: Vec<u8>,
}

fn p256_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

fn name(cn: &str) -> X509Name {
    let mut builder = X509Name::builder().unwrap();
    builder.append_entry_by_text("CN", cn).unwrap();
    builder.build()
}

/// Issue a CA + leaf pair; the leaf expires `not_after_days` from now.
pub(crate) fn issue_test_cert(not_after_days: u32) -> TestCert {
    let ca_key = p256_key();
    let ca_name = name("certinel test ca");

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
    let leaf_name = name("example.com");
    let serial_bytes = vec![0x07, 0xf2, 0x55, 0x83, 0x10, 0x9f];

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let leaf_serial = BigNum::from_slice(&serial_bytes)
        .unwrap()
        .to_asn1_integer()
        .unwrap();
    builder.set_serial_number(&leaf_serial).unwrap();
    builder.set_subject_name(&leaf_name).unwrap();
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
