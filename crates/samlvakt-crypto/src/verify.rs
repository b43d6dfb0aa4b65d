#![forbid(unsafe_code)]

//! Signature verification (RSA PKCS#1 v1.5, ECDSA P-256/P-384).

use samlvakt_core::{algorithm, Error};

/// Public key material a signature can be checked against.
#[derive(Debug, Clone)]
pub enum PublicKey {
    Rsa(rsa::RsaPublicKey),
    EcP256(p256::ecdsa::VerifyingKey),
    EcP384(p384::ecdsa::VerifyingKey),
}

impl PublicKey {
    /// Short human-readable key type, e.g. `RSA-2048`.
    pub fn describe(&self) -> String {
        use rsa::traits::PublicKeyParts;
        match self {
            Self::Rsa(pk) => format!("RSA-{}", pk.size() * 8),
            Self::EcP256(_) => "EC P-256".to_owned(),
            Self::EcP384(_) => "EC P-384".to_owned(),
        }
    }
}

/// Trait for signature algorithms.
pub trait SignatureAlgorithm: Send + Sync {
    fn uri(&self) -> &'static str;

    /// Whether `key` is of the type this algorithm verifies with.
    fn accepts(&self, key: &PublicKey) -> bool;

    /// Verify `signature` over `data`.
    ///
    /// Returns `Ok(false)` for a well-formed signature that does not verify
    /// and an error when the key type does not fit or the signature bytes
    /// are malformed.
    fn verify(&self, key: &PublicKey, data: &[u8], signature: &[u8]) -> Result<bool, Error>;
}

fn rsa_pkcs1v15(
    uri: &'static str,
    hash: HashType,
) -> Result<Box<dyn SignatureAlgorithm>, Error> {
    Ok(Box::new(RsaPkcs1v15 { uri, hash }))
}

/// Create a signature algorithm from its URI.
pub fn from_uri(uri: &str) -> Result<Box<dyn SignatureAlgorithm>, Error> {
    match uri {
        #[cfg(feature = "legacy-algorithms")]
        algorithm::RSA_SHA1 => rsa_pkcs1v15(algorithm::RSA_SHA1, HashType::Sha1),
        algorithm::RSA_SHA224 => rsa_pkcs1v15(algorithm::RSA_SHA224, HashType::Sha224),
        algorithm::RSA_SHA256 => rsa_pkcs1v15(algorithm::RSA_SHA256, HashType::Sha256),
        algorithm::RSA_SHA384 => rsa_pkcs1v15(algorithm::RSA_SHA384, HashType::Sha384),
        algorithm::RSA_SHA512 => rsa_pkcs1v15(algorithm::RSA_SHA512, HashType::Sha512),

        algorithm::ECDSA_SHA256 => Ok(Box::new(EcdsaP256)),
        algorithm::ECDSA_SHA384 => Ok(Box::new(EcdsaP384)),

        _ => Err(Error::UnsupportedAlgorithm(format!("signature algorithm: {uri}"))),
    }
}

/// URIs of every signature method this build accepts.
pub fn supported_uris() -> Vec<&'static str> {
    vec![
        #[cfg(feature = "legacy-algorithms")]
        algorithm::RSA_SHA1,
        algorithm::RSA_SHA224,
        algorithm::RSA_SHA256,
        algorithm::RSA_SHA384,
        algorithm::RSA_SHA512,
        algorithm::ECDSA_SHA256,
        algorithm::ECDSA_SHA384,
    ]
}

#[derive(Debug, Clone, Copy)]
enum HashType {
    #[cfg(feature = "legacy-algorithms")]
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

// ── RSA PKCS#1 v1.5 ─────────────────────────────────────────────────

struct RsaPkcs1v15 {
    uri: &'static str,
    hash: HashType,
}

impl SignatureAlgorithm for RsaPkcs1v15 {
    fn uri(&self) -> &'static str {
        self.uri
    }

    fn accepts(&self, key: &PublicKey) -> bool {
        matches!(key, PublicKey::Rsa(_))
    }

    fn verify(&self, key: &PublicKey, data: &[u8], sig_bytes: &[u8]) -> Result<bool, Error> {
        use signature::Verifier;
        let PublicKey::Rsa(public_key) = key else {
            return Err(Error::Key("RSA key required".into()));
        };
        let sig = rsa::pkcs1v15::Signature::try_from(sig_bytes)
            .map_err(|e| Error::Crypto(format!("invalid RSA signature: {e}")))?;
        macro_rules! do_verify {
            ($hasher:ty) => {{
                let vk = rsa::pkcs1v15::VerifyingKey::<$hasher>::new(public_key.clone());
                Ok(vk.verify(data, &sig).is_ok())
            }};
        }
        match self.hash {
            #[cfg(feature = "legacy-algorithms")]
            HashType::Sha1 => do_verify!(sha1::Sha1),
            HashType::Sha224 => do_verify!(sha2::Sha224),
            HashType::Sha256 => do_verify!(sha2::Sha256),
            HashType::Sha384 => do_verify!(sha2::Sha384),
            HashType::Sha512 => do_verify!(sha2::Sha512),
        }
    }
}

// ── ECDSA ────────────────────────────────────────────────────────────
//
// XML-DSig carries ECDSA signatures as the raw concatenation r || s, each
// half left-padded to the curve's field size.

struct EcdsaP256;

/// Convert an XML-DSig `r || s` value to a P-256 signature.
pub fn xmldsig_to_p256(rs: &[u8]) -> Result<p256::ecdsa::Signature, Error> {
    if rs.len() != 64 {
        return Err(Error::Crypto(format!(
            "P-256 signature must be 64 bytes, got {}",
            rs.len()
        )));
    }
    p256::ecdsa::Signature::from_slice(rs)
        .map_err(|e| Error::Crypto(format!("invalid P-256 signature: {e}")))
}

impl SignatureAlgorithm for EcdsaP256 {
    fn uri(&self) -> &'static str {
        algorithm::ECDSA_SHA256
    }

    fn accepts(&self, key: &PublicKey) -> bool {
        matches!(key, PublicKey::EcP256(_))
    }

    fn verify(&self, key: &PublicKey, data: &[u8], sig_bytes: &[u8]) -> Result<bool, Error> {
        use signature::Verifier;
        let PublicKey::EcP256(vk) = key else {
            return Err(Error::Key("P-256 key required".into()));
        };
        let sig = xmldsig_to_p256(sig_bytes)?;
        Ok(vk.verify(data, &sig).is_ok())
    }
}

struct EcdsaP384;

/// Convert an XML-DSig `r || s` value to a P-384 signature.
pub fn xmldsig_to_p384(rs: &[u8]) -> Result<p384::ecdsa::Signature, Error> {
    if rs.len() != 96 {
        return Err(Error::Crypto(format!(
            "P-384 signature must be 96 bytes, got {}",
            rs.len()
        )));
    }
    p384::ecdsa::Signature::from_slice(rs)
        .map_err(|e| Error::Crypto(format!("invalid P-384 signature: {e}")))
}

impl SignatureAlgorithm for EcdsaP384 {
    fn uri(&self) -> &'static str {
        algorithm::ECDSA_SHA384
    }

    fn accepts(&self, key: &PublicKey) -> bool {
        matches!(key, PublicKey::EcP384(_))
    }

    fn verify(&self, key: &PublicKey, data: &[u8], sig_bytes: &[u8]) -> Result<bool, Error> {
        use signature::Verifier;
        let PublicKey::EcP384(vk) = key else {
            return Err(Error::Key("P-384 key required".into()));
        };
        let sig = xmldsig_to_p384(sig_bytes)?;
        Ok(vk.verify(data, &sig).is_ok())
    }
}
