#![forbid(unsafe_code)]

//! The validation state machine.
//!
//! ```text
//! Start -> LocatedSignature -> ReferencesValid -> PolicyValid -> SignatureValid -> Accepted
//!   \______________\___________________\_______________\______________> Rejected(reason)
//! ```
//!
//! Stages run in order and the first failure is final. The signature is
//! located and its references digested before the assertion policy is
//! consulted, and the signature value is checked last.

use crate::policy;
use crate::settings::TrustSettings;
use chrono::{DateTime, Utc};
use samlvakt_core::{Error, RejectReason, Rejection};
use samlvakt_dsig::{locate, reference, verify, DsigContext};
use samlvakt_keys::TrustedKeys;
use samlvakt_xml::AssertionDocument;
use std::fmt;

/// Pipeline progress. Every run ends in `Accepted` or `Rejected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationState {
    Start,
    LocatedSignature,
    ReferencesValid,
    PolicyValid,
    SignatureValid,
    Accepted,
    Rejected(Rejection),
}

impl ValidationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected(_))
    }
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("Start"),
            Self::LocatedSignature => f.write_str("LocatedSignature"),
            Self::ReferencesValid => f.write_str("ReferencesValid"),
            Self::PolicyValid => f.write_str("PolicyValid"),
            Self::SignatureValid => f.write_str("SignatureValid"),
            Self::Accepted => f.write_str("Accepted"),
            Self::Rejected(r) => write!(f, "Rejected({})", r.reason.code()),
        }
    }
}

/// Result of validating one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid { reason: RejectReason, detail: String },
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Valid => None,
            Self::Invalid { reason, .. } => Some(*reason),
        }
    }
}

impl From<Result<(), Rejection>> for ValidationOutcome {
    fn from(result: Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Self::Valid,
            Err(Rejection { reason, detail }) => Self::Invalid { reason, detail },
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("OK"),
            Self::Invalid { reason, detail } => {
                write!(f, "INVALID ({}): {detail}", reason.code())
            }
        }
    }
}

/// Validates SAML responses against a fixed set of trusted keys.
///
/// Holds no per-call state; one pipeline can be shared across threads and
/// reused for any number of documents.
#[derive(Debug, Clone)]
pub struct ValidationPipeline {
    keys: TrustedKeys,
    ctx: DsigContext,
}

impl ValidationPipeline {
    /// Build a pipeline, loading the trusted certificates from `settings`.
    pub fn new(settings: &TrustSettings) -> Result<Self, Error> {
        Ok(Self::with_keys(settings, settings.trusted_keys()?))
    }

    /// Build a pipeline around an already loaded key store.
    pub fn with_keys(settings: &TrustSettings, keys: TrustedKeys) -> Self {
        Self {
            keys,
            ctx: DsigContext::with_id_attrs(settings.id_attributes.clone()),
        }
    }

    /// Validate `document` at instant `now`.
    pub fn validate(&self, document: &AssertionDocument, now: DateTime<Utc>) -> ValidationOutcome {
        match self.run(document, now) {
            ValidationState::Rejected(rejection) => Err(rejection).into(),
            _ => ValidationOutcome::Valid,
        }
    }

    /// Run every stage and return the terminal state.
    pub fn run(&self, document: &AssertionDocument, now: DateTime<Utc>) -> ValidationState {
        let working = document.working_copy();
        let mut state = ValidationState::Start;
        let result = self.run_stages(&working, now, &mut |next| {
            tracing::debug!(from = %state, to = %next, "validation transition");
            state = next;
        });

        match result {
            Ok(()) => {
                tracing::debug!(from = %state, to = "Accepted", "validation transition");
                ValidationState::Accepted
            }
            Err(rejection) => {
                tracing::warn!(
                    stage = %state,
                    reason = rejection.reason.code(),
                    detail = %rejection.detail,
                    "SAML response rejected"
                );
                ValidationState::Rejected(rejection)
            }
        }
    }

    fn run_stages(
        &self,
        working: &AssertionDocument,
        now: DateTime<Utc>,
        advance: &mut dyn FnMut(ValidationState),
    ) -> Result<(), Rejection> {
        let doc = working
            .parse_doc()
            .map_err(|e| Rejection::from_error(RejectReason::NoSignature, e))?;

        let block = locate::locate(&doc)?;
        advance(ValidationState::LocatedSignature);

        reference::validate_references(&doc, &block, &self.ctx)?;
        advance(ValidationState::ReferencesValid);

        policy::check_policy(&doc, now)?;
        advance(ValidationState::PolicyValid);

        let key = verify::verify_signature(&block, &self.keys)?;
        tracing::debug!(key = %key.label(), position = %block.position, "signature verified");
        advance(ValidationState::SignatureValid);

        Ok(())
    }
}
