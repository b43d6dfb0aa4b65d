#![forbid(unsafe_code)]

//! samlvakt: validate SAML 2.0 responses in pure Rust.
//!
//! This crate re-exports the workspace crates and the types most callers
//! need. See [`saml::ValidationPipeline`] for the entry point.

pub use samlvakt_c14n as c14n;
pub use samlvakt_core as core;
pub use samlvakt_crypto as crypto;
pub use samlvakt_dsig as dsig;
pub use samlvakt_keys as keys;
pub use samlvakt_saml as saml;
pub use samlvakt_transforms as transforms;
pub use samlvakt_xml as xml;

pub use samlvakt_core::{Error, RejectReason, Rejection};
pub use samlvakt_saml::{
    AssertionDocument, TrustSettings, ValidationOutcome, ValidationPipeline, ValidationState,
};
