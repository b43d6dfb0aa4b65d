//! Fixtures for the unit tests: an unsigned SAML response template and a
//! signer that fills in digest and signature values.

use crate::locate::locate;
use base64::Engine;
use rsa::pkcs8::DecodePrivateKey;
use samlvakt_c14n::C14nMode;
use samlvakt_keys::{loader, TrustedKeys};
use samlvakt_transforms::{uri, TransformData, TransformPipeline};
use samlvakt_xml::IdMap;
use sha2::Digest;
use signature::{SignatureEncoding, Signer};

pub const RESPONSE_ID: &str = "_response-1";
pub const ASSERTION_ID: &str = "_assertion-1";

pub const IDP_KEY: &str = include_str!("../../../test-data/keys/idp-key.pem");
pub const IDP_CERT: &str = include_str!("../../../test-data/keys/idp-cert.pem");
pub const ATTACKER_KEY: &str = include_str!("../../../test-data/keys/attacker-key.pem");

const ZERO_DIGEST: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";
const EMPTY_SIGNATURE_VALUE: &str = "<ds:SignatureValue>AAAA</ds:SignatureValue>";

/// An assertion signature with placeholder digest and signature values.
pub const SIGNATURE_TEMPLATE: &str = concat!(
    r#"<ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#">"#,
    r#"<ds:SignedInfo>"#,
    r#"<ds:CanonicalizationMethod Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"/>"#,
    r#"<ds:SignatureMethod Algorithm="http://www.w3.org/2001/04/xmldsig-more#rsa-sha256"/>"#,
    r##"<ds:Reference URI="#_assertion-1">"##,
    r#"<ds:Transforms>"#,
    r#"<ds:Transform Algorithm="http://www.w3.org/2000/09/xmldsig#enveloped-signature"/>"#,
    r#"<ds:Transform Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"/>"#,
    r#"</ds:Transforms>"#,
    r#"<ds:DigestMethod Algorithm="http://www.w3.org/2001/04/xmlenc#sha256"/>"#,
    r#"<ds:DigestValue>AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=</ds:DigestValue>"#,
    r#"</ds:Reference>"#,
    r#"</ds:SignedInfo>"#,
    r#"<ds:SignatureValue>AAAA</ds:SignatureValue>"#,
    r#"<ds:KeyInfo><ds:KeyName>idp</ds:KeyName></ds:KeyInfo>"#,
    r#"</ds:Signature>"#
);

/// A response with one assertion. `response_extra` is inserted after the
/// response issuer, `assertion_extra` after the assertion issuer.
pub fn response(response_extra: &str, assertion_extra: &str) -> String {
    format!(
        concat!(
            r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" "#,
            r#"xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="{rid}" Version="2.0" "#,
            r#"IssueInstant="2026-03-01T12:00:00Z">"#,
            "<saml:Issuer>https://idp.example.test</saml:Issuer>{response_extra}",
            r#"<saml:Assertion ID="{aid}" Version="2.0" IssueInstant="2026-03-01T12:00:00Z">"#,
            "<saml:Issuer>https://idp.example.test</saml:Issuer>{assertion_extra}",
            "<saml:Subject><saml:NameID>alice@example.test</saml:NameID></saml:Subject>",
            "</saml:Assertion></samlp:Response>"
        ),
        rid = RESPONSE_ID,
        aid = ASSERTION_ID,
        response_extra = response_extra,
        assertion_extra = assertion_extra,
    )
}

/// A response whose assertion is signed by the IdP key.
pub fn signed_response() -> String {
    sign(&response("", SIGNATURE_TEMPLATE), IDP_KEY)
}

/// Fill in the digest of the first reference and the RSA-SHA256 signature
/// value of the located signature.
pub fn sign(xml: &str, key_pem: &str) -> String {
    let engine = base64::engine::general_purpose::STANDARD;

    let digest = {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let block = locate(&doc).unwrap();
        let reference = &block.references[0];
        let ids = IdMap::build(&doc, &["ID".to_owned()]).unwrap();
        let resolved = uri::resolve_uri(&reference.uri, &doc, &ids).unwrap();
        let pipeline =
            TransformPipeline::from_transforms_node(reference.transforms, block.signature).unwrap();
        let octets = pipeline
            .execute(&doc, TransformData::NodeSet(resolved.node_set))
            .unwrap()
            .into_octets(&doc)
            .unwrap();
        engine.encode(sha2::Sha256::digest(&octets))
    };
    let xml = xml.replacen(ZERO_DIGEST, &digest, 1);

    let signature = {
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let block = locate(&doc).unwrap();
        let signed_info =
            samlvakt_c14n::canonicalize_subtree(block.signed_info, C14nMode::Exclusive, &[])
                .unwrap();
        let private = rsa::RsaPrivateKey::from_pkcs8_pem(key_pem).unwrap();
        let sk = rsa::pkcs1v15::SigningKey::<sha2::Sha256>::new(private);
        engine.encode(sk.sign(&signed_info).to_vec())
    };
    xml.replacen(
        EMPTY_SIGNATURE_VALUE,
        &format!("<ds:SignatureValue>{signature}</ds:SignatureValue>"),
        1,
    )
}

/// Trusted keys holding the IdP certificate under the name `idp`.
pub fn idp_keys() -> TrustedKeys {
    [loader::load_x509_cert_pem(IDP_CERT.as_bytes())
        .unwrap()
        .with_name("idp")]
    .into_iter()
    .collect()
}
