#![forbid(unsafe_code)]

//! `<ds:KeyInfo>` processing.
//!
//! Whatever a document carries in `KeyInfo` is attacker-controlled. It is
//! read into a [`KeyInfoHint`] that can only narrow the choice among keys
//! that were already configured as trusted; it never supplies key material.

use crate::loader;
use samlvakt_core::ns;
use samlvakt_xml::select;

/// Key identifiers found in a `<ds:KeyInfo>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInfoHint {
    /// `<ds:KeyName>` values.
    pub key_names: Vec<String>,
    /// Decoded `<ds:X509Data>/<ds:X509Certificate>` values (DER).
    pub certificates: Vec<Vec<u8>>,
}

impl KeyInfoHint {
    /// Read the hint from a `<ds:KeyInfo>` element.
    ///
    /// Undecodable certificate values are skipped.
    pub fn from_node(key_info: roxmltree::Node<'_, '_>) -> Self {
        let mut hint = Self::default();

        for name in select::find_child_elements(key_info, ns::DSIG, ns::node::KEY_NAME) {
            let text = select::text_content(name);
            let text = text.trim();
            if !text.is_empty() {
                hint.key_names.push(text.to_owned());
            }
        }

        for data in select::find_child_elements(key_info, ns::DSIG, ns::node::X509_DATA) {
            for cert in select::find_child_elements(data, ns::DSIG, ns::node::X509_CERTIFICATE) {
                match loader::decode_base64(&select::text_content(cert)) {
                    Ok(der) => hint.certificates.push(der),
                    Err(e) => tracing::debug!(error = %e, "ignoring undecodable X509Certificate"),
                }
            }
        }

        hint
    }

    pub fn is_empty(&self) -> bool {
        self.key_names.is_empty() && self.certificates.is_empty()
    }
}
