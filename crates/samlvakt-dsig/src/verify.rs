#![forbid(unsafe_code)]

//! Cryptographic signature verification.
//!
//! `SignedInfo` is canonicalized with its declared method and checked
//! against the configured trusted keys. The `KeyInfo` hint may narrow the
//! candidates but never contributes key material.

use crate::locate::SignatureBlock;
use samlvakt_c14n::C14nMode;
use samlvakt_core::{RejectReason, Rejection};
use samlvakt_crypto::verify as sig;
use samlvakt_keys::{TrustedKeys, VerificationKey};

/// Verify `SignatureValue` over the canonical `SignedInfo`.
///
/// Returns the key that verified the signature.
pub fn verify_signature<'k>(
    block: &SignatureBlock<'_, '_>,
    keys: &'k TrustedKeys,
) -> Result<&'k VerificationKey, Rejection> {
    let mode = C14nMode::require(&block.canonicalization_method)
        .map_err(|e| Rejection::from_error(RejectReason::SignatureInvalid, e))?;
    let algorithm = sig::from_uri(&block.signature_method)
        .map_err(|e| Rejection::from_error(RejectReason::SignatureInvalid, e))?;

    if keys.is_empty() {
        return Err(Rejection::new(
            RejectReason::NoKeyMaterial,
            "no trusted identity-provider key configured",
        ));
    }

    let signed_info =
        samlvakt_c14n::canonicalize_subtree(block.signed_info, mode, &block.inclusive_prefixes)
            .map_err(|e| Rejection::from_error(RejectReason::SignatureInvalid, e))?;

    let candidates: Vec<&VerificationKey> = keys
        .candidates(block.key_info.as_ref())
        .into_iter()
        .filter(|k| algorithm.accepts(&k.public_key))
        .collect();
    if candidates.is_empty() {
        return Err(Rejection::new(
            RejectReason::NoKeyMaterial,
            format!("no trusted key fits {}", block.signature_method),
        ));
    }

    let mut last_error = None;
    for key in candidates.iter().copied() {
        match algorithm.verify(&key.public_key, &signed_info, &block.signature_value) {
            Ok(true) => return Ok(key),
            Ok(false) => {}
            Err(e) => last_error = Some(e),
        }
    }

    let detail = match last_error {
        Some(e) => format!("no trusted key verifies the signature ({e})"),
        None => format!(
            "no trusted key verifies the signature ({} tried)",
            candidates.len()
        ),
    };
    Err(Rejection::new(RejectReason::SignatureInvalid, detail))
}
