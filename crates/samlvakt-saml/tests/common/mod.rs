//! Shared fixtures: a SAML response builder that signs at test time.

#![allow(dead_code)]

use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rsa::pkcs8::DecodePrivateKey;
use samlvakt_c14n::C14nMode;
use samlvakt_core::ns;
use samlvakt_saml::TrustSettings;
use samlvakt_xml::NodeSet;
use sha2::Digest;
use signature::{SignatureEncoding, Signer};

pub const IDP_KEY: &str = include_str!("../../../../test-data/keys/idp-key.pem");
pub const IDP_CERT: &str = include_str!("../../../../test-data/keys/idp-cert.pem");
pub const IDP_EC_KEY: &str = include_str!("../../../../test-data/keys/idp-ec-key.pem");
pub const IDP_EC_CERT: &str = include_str!("../../../../test-data/keys/idp-ec-cert.pem");
pub const ATTACKER_KEY: &str = include_str!("../../../../test-data/keys/attacker-key.pem");
pub const ATTACKER_CERT: &str = include_str!("../../../../test-data/keys/attacker-cert.pem");

pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
pub const ECDSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256";
pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";

const DIGEST_PLACEHOLDER: &str = "@@DIGEST@@";
const SIGNATURE_PLACEHOLDER: &str = "@@SIGNATURE@@";

/// The instant every scenario validates at: 2026-03-01T12:00:00Z.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// Settings trusting the RSA IdP certificate (`idp`) and the EC one (`idp-ec`).
pub fn settings() -> TrustSettings {
    TrustSettings::new("https://sp.example.test/metadata", "https://sp.example.test/acs")
        .with_named_idp_certificate("idp", IDP_CERT)
        .with_named_idp_certificate("idp-ec", IDP_EC_CERT)
}

/// Base64 body of a PEM certificate, as carried in `ds:X509Certificate`.
pub fn cert_body(pem: &str) -> String {
    pem.lines().filter(|l| !l.starts_with("-----")).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningKey {
    Idp,
    IdpEc,
    Attacker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignAt {
    /// Direct child of the response, covering the response.
    Response,
    /// Direct child of the first assertion, covering it.
    Assertion,
    /// Inside the first assertion's `Subject`, covering the assertion.
    Nested,
}

#[derive(Debug, Clone)]
pub enum KeyHint {
    None,
    KeyName(String),
    Certificate(String),
}

/// Builds a response with one or more assertions and signs it.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    assertions: usize,
    not_before: Option<i64>,
    not_on_or_after: Option<i64>,
    sign_at: SignAt,
    key: SigningKey,
    hint: KeyHint,
    id_attr: &'static str,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBuilder {
    /// One assertion, signed by the IdP at the assertion, valid from
    /// `now - 60s` to `now + 60s`.
    pub fn new() -> Self {
        Self {
            assertions: 1,
            not_before: Some(-60),
            not_on_or_after: Some(60),
            sign_at: SignAt::Assertion,
            key: SigningKey::Idp,
            hint: KeyHint::KeyName("idp".into()),
            id_attr: "ID",
        }
    }

    pub fn assertions(mut self, count: usize) -> Self {
        self.assertions = count;
        self
    }

    /// `NotBefore` as an offset in seconds from [`now`], or absent.
    pub fn not_before(mut self, offset: Option<i64>) -> Self {
        self.not_before = offset;
        self
    }

    /// `NotOnOrAfter` as an offset in seconds from [`now`], or absent.
    pub fn not_on_or_after(mut self, offset: Option<i64>) -> Self {
        self.not_on_or_after = offset;
        self
    }

    pub fn sign_at(mut self, sign_at: SignAt) -> Self {
        self.sign_at = sign_at;
        self
    }

    pub fn key(mut self, key: SigningKey) -> Self {
        self.key = key;
        self
    }

    pub fn hint(mut self, hint: KeyHint) -> Self {
        self.hint = hint;
        self
    }

    /// Name of the ID attribute carried by the assertions.
    pub fn id_attr(mut self, name: &'static str) -> Self {
        self.id_attr = name;
        self
    }

    /// The response with placeholder digest and signature values.
    pub fn unsigned(&self) -> String {
        let signature = self.signature_template();
        let (response_sig, assertion_sig, subject_sig) = match self.sign_at {
            SignAt::Response => (signature.as_str(), "", ""),
            SignAt::Assertion => ("", signature.as_str(), ""),
            SignAt::Nested => ("", "", signature.as_str()),
        };

        let conditions = self.conditions();
        let mut assertions = String::new();
        for i in 1..=self.assertions {
            let (assertion_sig, subject_sig) = if i == 1 {
                (assertion_sig, subject_sig)
            } else {
                ("", "")
            };
            assertions.push_str(&format!(
                concat!(
                    r#"<saml:Assertion {id_attr}="_assertion-{i}" Version="2.0" IssueInstant="{issued}">"#,
                    "<saml:Issuer>https://idp.example.test</saml:Issuer>{assertion_sig}",
                    "<saml:Subject><saml:NameID>alice@example.test</saml:NameID>{subject_sig}</saml:Subject>",
                    "{conditions}",
                    "</saml:Assertion>"
                ),
                id_attr = self.id_attr,
                i = i,
                issued = timestamp(0),
                assertion_sig = assertion_sig,
                subject_sig = subject_sig,
                conditions = conditions,
            ));
        }

        format!(
            concat!(
                r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" "#,
                r#"xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" "#,
                r#"ID="_response-1" Version="2.0" IssueInstant="{issued}">"#,
                "<saml:Issuer>https://idp.example.test</saml:Issuer>{response_sig}",
                "{assertions}",
                "</samlp:Response>"
            ),
            issued = timestamp(0),
            response_sig = response_sig,
            assertions = assertions,
        )
    }

    /// The signed response.
    pub fn build(&self) -> String {
        let xml = self.unsigned();
        let digest = reference_digest(&xml, self.id_attr);
        let xml = xml.replacen(DIGEST_PLACEHOLDER, &digest, 1);
        let signature = self.sign_signed_info(&xml);
        xml.replacen(SIGNATURE_PLACEHOLDER, &signature, 1)
    }

    fn conditions(&self) -> String {
        let mut attrs = String::new();
        if let Some(offset) = self.not_before {
            attrs.push_str(&format!(r#" NotBefore="{}""#, timestamp(offset)));
        }
        if let Some(offset) = self.not_on_or_after {
            attrs.push_str(&format!(r#" NotOnOrAfter="{}""#, timestamp(offset)));
        }
        if attrs.is_empty() {
            String::new()
        } else {
            format!("<saml:Conditions{attrs}/>")
        }
    }

    fn signature_template(&self) -> String {
        let target = match self.sign_at {
            SignAt::Response => "_response-1",
            SignAt::Assertion | SignAt::Nested => "_assertion-1",
        };
        let method = match self.key {
            SigningKey::Idp | SigningKey::Attacker => RSA_SHA256,
            SigningKey::IdpEc => ECDSA_SHA256,
        };
        let key_info = match &self.hint {
            KeyHint::None => String::new(),
            KeyHint::KeyName(name) => {
                format!("<ds:KeyInfo><ds:KeyName>{name}</ds:KeyName></ds:KeyInfo>")
            }
            KeyHint::Certificate(pem) => format!(
                "<ds:KeyInfo><ds:X509Data><ds:X509Certificate>{}</ds:X509Certificate></ds:X509Data></ds:KeyInfo>",
                cert_body(pem)
            ),
        };
        format!(
            concat!(
                r#"<ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#">"#,
                "<ds:SignedInfo>",
                r#"<ds:CanonicalizationMethod Algorithm="{c14n}"/>"#,
                r#"<ds:SignatureMethod Algorithm="{method}"/>"#,
                r##"<ds:Reference URI="#{target}">"##,
                "<ds:Transforms>",
                r#"<ds:Transform Algorithm="http://www.w3.org/2000/09/xmldsig#enveloped-signature"/>"#,
                r#"<ds:Transform Algorithm="{c14n}"/>"#,
                "</ds:Transforms>",
                r#"<ds:DigestMethod Algorithm="{sha256}"/>"#,
                "<ds:DigestValue>{digest}</ds:DigestValue>",
                "</ds:Reference>",
                "</ds:SignedInfo>",
                "<ds:SignatureValue>{signature}</ds:SignatureValue>",
                "{key_info}",
                "</ds:Signature>"
            ),
            c14n = EXC_C14N,
            method = method,
            target = target,
            sha256 = SHA256,
            digest = DIGEST_PLACEHOLDER,
            signature = SIGNATURE_PLACEHOLDER,
            key_info = key_info,
        )
    }

    fn sign_signed_info(&self, xml: &str) -> String {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let signed_info = doc
            .descendants()
            .find(|n| n.has_tag_name((ns::DSIG, ns::node::SIGNED_INFO)))
            .unwrap();
        let octets =
            samlvakt_c14n::canonicalize_subtree(signed_info, C14nMode::Exclusive, &[]).unwrap();

        let raw = match self.key {
            SigningKey::Idp => rsa_sign(IDP_KEY, &octets),
            SigningKey::Attacker => rsa_sign(ATTACKER_KEY, &octets),
            SigningKey::IdpEc => {
                let sk = <p256::ecdsa::SigningKey as p256::pkcs8::DecodePrivateKey>::from_pkcs8_pem(
                    IDP_EC_KEY,
                )
                .unwrap();
                let sig: p256::ecdsa::Signature = sk.sign(&octets);
                sig.to_bytes().to_vec()
            }
        };
        base64::engine::general_purpose::STANDARD.encode(raw)
    }
}

fn rsa_sign(key_pem: &str, data: &[u8]) -> Vec<u8> {
    let private = rsa::RsaPrivateKey::from_pkcs8_pem(key_pem).unwrap();
    let sk = rsa::pkcs1v15::SigningKey::<sha2::Sha256>::new(private);
    sk.sign(data).to_vec()
}

/// SHA-256 over the exclusive canonical form of the referenced element,
/// with the signature removed.
fn reference_digest(xml: &str, id_attr: &str) -> String {
    let doc = roxmltree::Document::parse(xml).unwrap();
    let signature = doc
        .descendants()
        .find(|n| n.has_tag_name((ns::DSIG, ns::node::SIGNATURE)))
        .unwrap();
    let reference = signature
        .descendants()
        .find(|n| n.has_tag_name((ns::DSIG, ns::node::REFERENCE)))
        .unwrap();
    let id = reference
        .attribute(ns::attr::URI)
        .and_then(|uri| uri.strip_prefix('#'))
        .unwrap();
    let target = doc
        .descendants()
        .find(|n| n.attribute(ns::attr::ID) == Some(id) || n.attribute(id_attr) == Some(id))
        .unwrap();

    let mut node_set = NodeSet::tree_without_comments(target);
    node_set.remove_subtree(signature);
    let octets =
        samlvakt_c14n::canonicalize_doc(&doc, C14nMode::Exclusive, Some(&node_set), &[]).unwrap();
    base64::engine::general_purpose::STANDARD.encode(sha2::Sha256::digest(&octets))
}

/// [`now`] shifted by `offset` seconds, as an `xs:dateTime`.
pub fn timestamp(offset: i64) -> String {
    (now() + Duration::seconds(offset))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}
