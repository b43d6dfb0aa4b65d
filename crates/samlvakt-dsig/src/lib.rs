#![forbid(unsafe_code)]

//! XML Digital Signature verification for SAML responses.
//!
//! The three stages here run in order against one parsed working copy:
//!
//! 1. [`locate::locate`] finds the signature at one of the two positions a
//!    SAML response may carry it and reads `SignedInfo`.
//! 2. [`reference::validate_references`] recomputes every reference digest
//!    and checks that the signature actually covers the element it sits in.
//! 3. [`verify::verify_signature`] canonicalizes `SignedInfo` and checks
//!    `SignatureValue` against trusted keys only.
//!
//! Each stage reports failure as a [`Rejection`](samlvakt_core::Rejection).

pub mod context;
pub mod locate;
pub mod reference;
pub mod verify;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::DsigContext;
pub use locate::{ReferenceEntry, SignatureBlock, SignaturePosition};
