#![forbid(unsafe_code)]

//! Core types shared by every samlvakt crate: the error type, rejection
//! reasons, the algorithm URIs that may appear in `Algorithm` attributes and
//! the XML-DSig / SAML namespace and element names.

pub mod algorithm;
pub mod error;
pub mod ns;
pub mod reject;

pub use error::{Error, Result};
pub use reject::{RejectReason, Rejection};
