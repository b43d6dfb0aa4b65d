#![forbid(unsafe_code)]

//! Reference processing for samlvakt.
//!
//! Resolves `Reference/@URI` to a node set and runs the transform chain that
//! turns it into the octets to digest. Only the transforms SAML signatures
//! use are implemented: enveloped-signature and canonicalization.

pub mod enveloped;
pub mod pipeline;
pub mod uri;

pub use pipeline::{Transform, TransformData, TransformPipeline};
