#![forbid(unsafe_code)]

//! Key loading from X.509 certificates and public-key encodings.
//!
//! Accepted inputs: PEM certificates, DER certificates, SubjectPublicKeyInfo
//! (PEM or DER), PKCS#1 `RSA PUBLIC KEY` PEM, and the bare base64 certificate
//! body that SAML settings files and metadata commonly carry.

use crate::key::VerificationKey;
use base64::Engine;
use samlvakt_core::Error;
use samlvakt_crypto::PublicKey;

/// Load a public key from a DER-encoded SubjectPublicKeyInfo.
///
/// Tries RSA, then EC P-256, then EC P-384.
pub fn load_spki_der(spki_der: &[u8]) -> Result<VerificationKey, Error> {
    use spki::DecodePublicKey;

    if let Ok(pk) = rsa::RsaPublicKey::from_public_key_der(spki_der) {
        return Ok(VerificationKey::new(PublicKey::Rsa(pk)));
    }
    if let Ok(vk) = p256::ecdsa::VerifyingKey::from_public_key_der(spki_der) {
        return Ok(VerificationKey::new(PublicKey::EcP256(vk)));
    }
    if let Ok(vk) = p384::ecdsa::VerifyingKey::from_public_key_der(spki_der) {
        return Ok(VerificationKey::new(PublicKey::EcP384(vk)));
    }
    Err(Error::Key(
        "unsupported public key (expected RSA, EC P-256 or EC P-384)".into(),
    ))
}

/// Load a public key from a PEM-encoded SubjectPublicKeyInfo (`-----BEGIN PUBLIC KEY-----`).
pub fn load_spki_pem(pem_data: &[u8]) -> Result<VerificationKey, Error> {
    let (label, der_bytes) = decode_pem(pem_data)?;
    if label != "PUBLIC KEY" {
        return Err(Error::Key(format!("expected PUBLIC KEY PEM label, got: {label}")));
    }
    load_spki_der(&der_bytes)
}

/// Load an RSA public key from PKCS#1 PEM (`-----BEGIN RSA PUBLIC KEY-----`).
pub fn load_rsa_public_pkcs1_pem(pem_data: &[u8]) -> Result<VerificationKey, Error> {
    use pkcs1::DecodeRsaPublicKey;

    let (label, der_bytes) = decode_pem(pem_data)?;
    if label != "RSA PUBLIC KEY" {
        return Err(Error::Key(format!("expected RSA PUBLIC KEY PEM label, got: {label}")));
    }
    let pk = rsa::RsaPublicKey::from_pkcs1_der(&der_bytes)
        .map_err(|e| Error::Key(format!("failed to parse RSA public key: {e}")))?;
    Ok(VerificationKey::new(PublicKey::Rsa(pk)))
}

/// Load the public key from a DER-encoded X.509 certificate.
///
/// The certificate is parsed only to reach its key; validity period and
/// issuer chain are not checked.
pub fn load_x509_cert_der(data: &[u8]) -> Result<VerificationKey, Error> {
    use der::{Decode, Encode};
    use x509_cert::Certificate;

    let cert = Certificate::from_der(data)
        .map_err(|e| Error::Certificate(format!("failed to parse X.509 certificate: {e}")))?;
    let spki_der = cert
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| Error::Certificate(format!("failed to encode SPKI: {e}")))?;

    let mut key = load_spki_der(&spki_der)?;
    key.certificate_der = Some(data.to_vec());
    key.subject = Some(cert.tbs_certificate.subject.to_string());
    Ok(key)
}

/// Load the public key from a PEM-encoded X.509 certificate.
pub fn load_x509_cert_pem(pem_data: &[u8]) -> Result<VerificationKey, Error> {
    let (label, der_bytes) = decode_pem(pem_data)?;
    if label != "CERTIFICATE" {
        return Err(Error::Certificate(format!(
            "expected CERTIFICATE PEM label, got: {label}"
        )));
    }
    load_x509_cert_der(&der_bytes)
}

/// Load a certificate given as its bare base64 body, without PEM armour.
/// Embedded whitespace and line breaks are ignored.
pub fn load_x509_cert_base64(text: &str) -> Result<VerificationKey, Error> {
    let der = decode_base64(text)?;
    load_x509_cert_der(&der)
}

/// Auto-detect the encoding and load a public key.
///
/// PEM is dispatched on its label. Anything else is tried as a DER
/// certificate, then DER SubjectPublicKeyInfo, then a bare base64
/// certificate body.
pub fn load_public_auto(data: &[u8]) -> Result<VerificationKey, Error> {
    if find_pem_start(data).is_some() {
        let (label, _) = decode_pem(data)?;
        return match label.as_str() {
            "CERTIFICATE" => load_x509_cert_pem(data),
            "PUBLIC KEY" => load_spki_pem(data),
            "RSA PUBLIC KEY" => load_rsa_public_pkcs1_pem(data),
            other => Err(Error::Key(format!("unsupported PEM label: {other}"))),
        };
    }

    if let Ok(key) = load_x509_cert_der(data) {
        return Ok(key);
    }
    if let Ok(key) = load_spki_der(data) {
        return Ok(key);
    }
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(key) = load_x509_cert_base64(text) {
            return Ok(key);
        }
    }
    Err(Error::Key(
        "unable to detect key format (expected PEM, DER or base64 certificate)".into(),
    ))
}

/// Load a key file, auto-detecting the format.
pub fn load_key_file(path: &std::path::Path) -> Result<VerificationKey, Error> {
    let data = std::fs::read(path)?;
    load_public_auto(&data)
}

/// Decode standard base64, ignoring whitespace.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, Error> {
    let clean: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if clean.is_empty() {
        return Err(Error::Base64("empty value".into()));
    }
    base64::engine::general_purpose::STANDARD
        .decode(clean.as_bytes())
        .map_err(|e| Error::Base64(e.to_string()))
}

fn find_pem_start(data: &[u8]) -> Option<usize> {
    const MARKER: &[u8] = b"-----BEGIN ";
    data.windows(MARKER.len()).position(|w| w == MARKER)
}

/// Decode a PEM document, skipping any text before the armour (as left by
/// `openssl x509 -text`) and surrounding whitespace.
fn decode_pem(pem_data: &[u8]) -> Result<(String, Vec<u8>), Error> {
    let start = find_pem_start(pem_data)
        .ok_or_else(|| Error::Key("no PEM armour found".into()))?;
    let text = std::str::from_utf8(&pem_data[start..])
        .map_err(|e| Error::Key(format!("invalid PEM encoding: {e}")))?;
    let (label, der) = pem_rfc7468::decode_vec(text.trim().as_bytes())
        .map_err(|e| Error::Key(format!("failed to decode PEM: {e}")))?;
    Ok((label.to_owned(), der))
}
