#![forbid(unsafe_code)]

//! Signature location.
//!
//! A SAML response is signed either on the `samlp:Response` itself or on
//! the `saml:Assertion` it carries. Only those two positions are accepted:
//!
//! 1. a `ds:Signature` that is a direct child of the document element;
//! 2. otherwise, a `ds:Signature` that is a direct child of a
//!    `saml:Assertion` which is itself a direct child of the document
//!    element.
//!
//! A signature anywhere else (inside `Extensions`, an attribute value, a
//! nested assertion) is never picked up, so an attacker cannot satisfy
//! verification with a validly signed fragment smuggled into the document.

use samlvakt_core::{ns, Error, RejectReason, Rejection};
use samlvakt_keys::{loader, KeyInfoHint};
use samlvakt_transforms::pipeline::read_inclusive_prefixes;
use samlvakt_xml::select;
use std::fmt;

/// Where the located signature sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignaturePosition {
    Response,
    Assertion,
}

impl fmt::Display for SignaturePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Response => f.write_str("response"),
            Self::Assertion => f.write_str("assertion"),
        }
    }
}

/// One `<ds:Reference>` of `SignedInfo`.
#[derive(Debug, Clone)]
pub struct ReferenceEntry<'a, 'input> {
    /// `URI` attribute; absent is treated as `""`.
    pub uri: String,
    /// The `<ds:Transforms>` element, if present.
    pub transforms: Option<roxmltree::Node<'a, 'input>>,
    pub digest_method: String,
    pub digest_value: Vec<u8>,
}

/// Read-only view of a located `<ds:Signature>`.
#[derive(Debug, Clone)]
pub struct SignatureBlock<'a, 'input> {
    pub signature: roxmltree::Node<'a, 'input>,
    pub position: SignaturePosition,
    /// The element the signature is enveloped in; a reference must cover it.
    pub enveloping: roxmltree::Node<'a, 'input>,
    pub signed_info: roxmltree::Node<'a, 'input>,
    pub canonicalization_method: String,
    /// `PrefixList` of the canonicalization method, for exclusive C14N.
    pub inclusive_prefixes: Vec<String>,
    pub signature_method: String,
    pub references: Vec<ReferenceEntry<'a, 'input>>,
    pub signature_value: Vec<u8>,
    /// Untrusted key hint from `<ds:KeyInfo>`.
    pub key_info: Option<KeyInfoHint>,
}

/// Locate the signature of a SAML response document.
///
/// Fails with [`RejectReason::NoSignature`] when there is no signature at an
/// accepted position, when one position holds more than one signature, or
/// when the signature is structurally unusable.
pub fn locate<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
) -> Result<SignatureBlock<'a, 'input>, Rejection> {
    let root = doc.root_element();

    let (signature, position) = match single_signature(root)? {
        Some(sig) => (sig, SignaturePosition::Response),
        None => {
            let assertions =
                select::find_child_elements(root, ns::SAML_ASSERTION, ns::node::ASSERTION);
            let assertion_sig = assertions
                .into_iter()
                .map(single_signature)
                .find_map(|found| found.transpose())
                .transpose()?;
            match assertion_sig {
                Some(sig) => (sig, SignaturePosition::Assertion),
                None => {
                    return Err(Rejection::new(
                        RejectReason::NoSignature,
                        "no ds:Signature on the response or its assertion",
                    ))
                }
            }
        }
    };

    let block = read_signature(signature, position)
        .map_err(|e| Rejection::from_error(RejectReason::NoSignature, e))?;
    tracing::debug!(
        position = %block.position,
        signature_method = %block.signature_method,
        canonicalization_method = %block.canonicalization_method,
        references = block.references.len(),
        "located signature"
    );
    Ok(block)
}

/// The `ds:Signature` child of `parent`, rejecting more than one.
fn single_signature<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
) -> Result<Option<roxmltree::Node<'a, 'input>>, Rejection> {
    let mut signatures = select::find_child_elements(parent, ns::DSIG, ns::node::SIGNATURE);
    if signatures.len() > 1 {
        return Err(Rejection::new(
            RejectReason::NoSignature,
            format!(
                "{} ds:Signature elements on {}",
                signatures.len(),
                select::qualified_name(parent)
            ),
        ));
    }
    Ok(signatures.pop())
}

fn read_signature<'a, 'input>(
    signature: roxmltree::Node<'a, 'input>,
    position: SignaturePosition,
) -> Result<SignatureBlock<'a, 'input>, Error> {
    let enveloping = signature
        .parent_element()
        .ok_or_else(|| Error::XmlStructure("Signature has no parent element".into()))?;

    let signed_info = select::find_child_element(signature, ns::DSIG, ns::node::SIGNED_INFO)
        .ok_or_else(|| Error::MissingElement("SignedInfo".into()))?;

    let c14n_node =
        select::find_child_element(signed_info, ns::DSIG, ns::node::CANONICALIZATION_METHOD)
            .ok_or_else(|| Error::MissingElement("CanonicalizationMethod".into()))?;
    let canonicalization_method = algorithm_of(c14n_node, "CanonicalizationMethod")?;
    let inclusive_prefixes = read_inclusive_prefixes(c14n_node);

    let method_node = select::find_child_element(signed_info, ns::DSIG, ns::node::SIGNATURE_METHOD)
        .ok_or_else(|| Error::MissingElement("SignatureMethod".into()))?;
    let signature_method = algorithm_of(method_node, "SignatureMethod")?;

    let references = select::find_child_elements(signed_info, ns::DSIG, ns::node::REFERENCE)
        .into_iter()
        .map(read_reference)
        .collect::<Result<Vec<_>, Error>>()?;

    let value_node = select::find_child_element(signature, ns::DSIG, ns::node::SIGNATURE_VALUE)
        .ok_or_else(|| Error::MissingElement("SignatureValue".into()))?;
    let signature_value = loader::decode_base64(&select::text_content(value_node))
        .map_err(|e| Error::Base64(format!("SignatureValue: {e}")))?;

    let key_info = select::find_child_element(signature, ns::DSIG, ns::node::KEY_INFO)
        .map(KeyInfoHint::from_node);

    Ok(SignatureBlock {
        signature,
        position,
        enveloping,
        signed_info,
        canonicalization_method,
        inclusive_prefixes,
        signature_method,
        references,
        signature_value,
        key_info,
    })
}

fn read_reference<'a, 'input>(
    reference: roxmltree::Node<'a, 'input>,
) -> Result<ReferenceEntry<'a, 'input>, Error> {
    let uri = reference.attribute(ns::attr::URI).unwrap_or("").to_owned();

    let method_node = select::find_child_element(reference, ns::DSIG, ns::node::DIGEST_METHOD)
        .ok_or_else(|| Error::MissingElement("DigestMethod".into()))?;
    let digest_method = algorithm_of(method_node, "DigestMethod")?;

    let value_node = select::find_child_element(reference, ns::DSIG, ns::node::DIGEST_VALUE)
        .ok_or_else(|| Error::MissingElement("DigestValue".into()))?;
    let digest_value = loader::decode_base64(&select::text_content(value_node))
        .map_err(|e| Error::Base64(format!("DigestValue: {e}")))?;

    Ok(ReferenceEntry {
        uri,
        transforms: select::find_child_element(reference, ns::DSIG, ns::node::TRANSFORMS),
        digest_method,
        digest_value,
    })
}

fn algorithm_of(node: roxmltree::Node<'_, '_>, element: &str) -> Result<String, Error> {
    node.attribute(ns::attr::ALGORITHM)
        .map(str::to_owned)
        .ok_or_else(|| Error::MissingAttribute(format!("Algorithm on {element}")))
}
