#![forbid(unsafe_code)]

//! Store of trusted verification keys.

use crate::key::VerificationKey;
use crate::keyinfo::KeyInfoHint;

/// The set of keys a signature may be verified with.
///
/// Built once from configuration and shared read-only across validations.
#[derive(Debug, Clone, Default)]
pub struct TrustedKeys {
    keys: Vec<VerificationKey>,
}

impl TrustedKeys {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key to the store.
    pub fn add_key(&mut self, key: VerificationKey) {
        self.keys.push(key);
    }

    /// Find a key by name.
    pub fn find_by_name(&self, name: &str) -> Option<&VerificationKey> {
        self.keys.iter().find(|k| k.name.as_deref() == Some(name))
    }

    /// Find the key loaded from exactly this certificate.
    pub fn find_by_certificate(&self, der: &[u8]) -> Option<&VerificationKey> {
        self.keys
            .iter()
            .find(|k| k.certificate_der.as_deref() == Some(der))
    }

    /// Keys to try for a signature carrying `hint`.
    ///
    /// When the hint names configured keys (by certificate bytes or key
    /// name), only those are returned. Otherwise, including when there is no
    /// hint at all, every configured key is a candidate. The hint can never
    /// add a key.
    pub fn candidates(&self, hint: Option<&KeyInfoHint>) -> Vec<&VerificationKey> {
        if let Some(hint) = hint {
            let matched: Vec<&VerificationKey> = self
                .keys
                .iter()
                .filter(|k| {
                    let cert_match = k
                        .certificate_der
                        .as_ref()
                        .is_some_and(|der| hint.certificates.contains(der));
                    let name_match = k
                        .name
                        .as_ref()
                        .is_some_and(|name| hint.key_names.contains(name));
                    cert_match || name_match
                })
                .collect();
            if !matched.is_empty() {
                tracing::debug!(matched = matched.len(), "KeyInfo hint selected configured keys");
                return matched;
            }
            if !hint.is_empty() {
                tracing::debug!("KeyInfo hint matches no configured key; trying all keys");
            }
        }
        self.keys.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<VerificationKey> for TrustedKeys {
    fn from_iter<I: IntoIterator<Item = VerificationKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
