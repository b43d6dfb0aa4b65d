#![forbid(unsafe_code)]

//! XML document model for samlvakt.
//!
//! Provides an owned [`AssertionDocument`] over `roxmltree`, the `NodeSet`
//! used for document-subset canonicalization and a handful of
//! namespace-aware lookup helpers.

pub mod document;
pub mod nodeset;
pub mod select;

pub use document::{AssertionDocument, IdMap};
pub use nodeset::NodeSet;

/// roxmltree parsing options used for every inbound document.
///
/// DTDs are rejected.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: false,
        ..Default::default()
    }
}
