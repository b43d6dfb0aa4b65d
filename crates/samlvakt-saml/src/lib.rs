#![forbid(unsafe_code)]

//! SAML 2.0 response validation.
//!
//! [`ValidationPipeline`] decides whether an inbound SAML response was
//! issued by a trusted identity provider, is unmodified, and is being used
//! inside its validity window. [`metadata::sp_metadata`] renders the service
//! provider metadata published to the identity provider.
//!
//! ```no_run
//! use samlvakt_saml::{AssertionDocument, TrustSettings, ValidationPipeline};
//!
//! # fn main() -> Result<(), samlvakt_core::Error> {
//! let settings = TrustSettings::load("settings.yaml")?;
//! let pipeline = ValidationPipeline::new(&settings)?;
//! let document = AssertionDocument::parse(std::fs::read_to_string("response.xml")?)?;
//! if pipeline.validate(&document, chrono::Utc::now()).is_valid() {
//!     // establish the session
//! }
//! # Ok(())
//! # }
//! ```

pub mod metadata;
pub mod pipeline;
pub mod policy;
pub mod settings;

pub use pipeline::{ValidationOutcome, ValidationPipeline, ValidationState};
pub use samlvakt_core::{RejectReason, Rejection};
pub use samlvakt_xml::AssertionDocument;
pub use settings::{IdpCertificate, TrustSettings};
