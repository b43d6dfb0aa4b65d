#![forbid(unsafe_code)]

//! A trusted verification key.

use samlvakt_crypto::PublicKey;

/// A public key configured as trusted, with the certificate it came from.
#[derive(Debug, Clone)]
pub struct VerificationKey {
    /// Optional key name, matched against `<ds:KeyName>` hints.
    pub name: Option<String>,
    pub public_key: PublicKey,
    /// DER of the X.509 certificate, when loaded from one.
    pub certificate_der: Option<Vec<u8>>,
    /// Certificate subject (RFC 4514 form), for diagnostics only.
    pub subject: Option<String>,
}

impl VerificationKey {
    /// A bare public key with no certificate.
    pub fn new(public_key: PublicKey) -> Self {
        Self {
            name: None,
            public_key,
            certificate_der: None,
            subject: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Human-readable label for logs: name, subject or key type.
    pub fn label(&self) -> String {
        match (&self.name, &self.subject) {
            (Some(name), _) => name.clone(),
            (None, Some(subject)) => subject.clone(),
            (None, None) => self.public_key.describe(),
        }
    }
}
