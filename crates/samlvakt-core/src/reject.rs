#![forbid(unsafe_code)]

//! Rejection reasons reported by the validation stages.

use crate::Error;

/// Why a document was rejected. A closed set: callers treat every value
/// the same way (refuse the login) and use it for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum RejectReason {
    #[error("no usable signature")]
    NoSignature,

    #[error("reference digest mismatch")]
    ReferenceMismatch,

    #[error("document must contain exactly one assertion")]
    MultipleOrZeroAssertions,

    #[error("assertion conditions not valid at this time")]
    TimestampOutOfWindow,

    #[error("no usable trusted key")]
    NoKeyMaterial,

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,
}

impl RejectReason {
    /// Stable identifier, suitable as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoSignature => "NoSignature",
            Self::ReferenceMismatch => "ReferenceMismatch",
            Self::MultipleOrZeroAssertions => "MultipleOrZeroAssertions",
            Self::TimestampOutOfWindow => "TimestampOutOfWindow",
            Self::NoKeyMaterial => "NoKeyMaterial",
            Self::SignatureInvalid => "SignatureInvalid",
            Self::UnsupportedAlgorithm => "UnsupportedAlgorithm",
        }
    }
}

/// A failed stage: the reason plus a human-readable detail for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}: {detail}")]
pub struct Rejection {
    pub reason: RejectReason,
    pub detail: String,
}

impl Rejection {
    pub fn new(reason: RejectReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }

    /// Classify a lower-level error raised while running a stage whose
    /// failures are reported as `stage_reason`.
    ///
    /// [`Error::UnsupportedAlgorithm`] is always reported as
    /// [`RejectReason::UnsupportedAlgorithm`], whichever stage raised it.
    pub fn from_error(stage_reason: RejectReason, error: Error) -> Self {
        let reason = match error {
            Error::UnsupportedAlgorithm(_) => RejectReason::UnsupportedAlgorithm,
            _ => stage_reason,
        };
        Self::new(reason, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_algorithm_overrides_stage() {
        let r = Rejection::from_error(
            RejectReason::ReferenceMismatch,
            Error::UnsupportedAlgorithm("digest algorithm: urn:x".into()),
        );
        assert_eq!(r.reason, RejectReason::UnsupportedAlgorithm);
        assert!(r.detail.contains("urn:x"));
    }

    #[test]
    fn test_other_errors_keep_stage_reason() {
        let r = Rejection::from_error(
            RejectReason::ReferenceMismatch,
            Error::InvalidUri("ID not found: _a".into()),
        );
        assert_eq!(r.reason, RejectReason::ReferenceMismatch);
    }

    #[test]
    fn test_display() {
        let r = Rejection::new(RejectReason::NoSignature, "no ds:Signature");
        assert_eq!(r.to_string(), "no usable signature: no ds:Signature");
        assert_eq!(r.reason.code(), "NoSignature");
    }
}
