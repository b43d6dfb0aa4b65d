#![forbid(unsafe_code)]

//! Service-provider trust settings.
//!
//! Settings are built in code or loaded from YAML:
//!
//! ```yaml
//! sp_entity_id: https://sp.example.test/metadata
//! acs_url: https://sp.example.test/acs
//! name_id_format: urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress
//! idp_certificates:
//!   - name: idp
//!     path: keys/idp-cert.pem
//! ```

use samlvakt_core::Error;
use samlvakt_keys::{loader, TrustedKeys, VerificationKey};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// NameID format requested when the settings name none.
pub const DEFAULT_NAME_ID_FORMAT: &str = "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress";

/// What the service provider trusts and how it identifies itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustSettings {
    /// SP issuer / entity ID.
    pub sp_entity_id: String,

    /// Assertion consumer service URL (HTTP-POST binding).
    pub acs_url: String,

    #[serde(default = "default_name_id_format")]
    pub name_id_format: String,

    #[serde(default)]
    pub idp_certificates: Vec<IdpCertificate>,

    /// Attribute names treated as XML IDs when resolving references.
    #[serde(default = "default_id_attributes")]
    pub id_attributes: Vec<String>,
}

/// One trusted identity-provider certificate or public key.
///
/// Exactly one of `pem` and `path` must be set. Inline values may be PEM
/// or a bare base64 certificate body; files may also be DER.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdpCertificate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pem: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_name_id_format() -> String {
    DEFAULT_NAME_ID_FORMAT.to_string()
}

fn default_id_attributes() -> Vec<String> {
    vec!["ID".to_string()]
}

impl TrustSettings {
    pub fn new(sp_entity_id: impl Into<String>, acs_url: impl Into<String>) -> Self {
        Self {
            sp_entity_id: sp_entity_id.into(),
            acs_url: acs_url.into(),
            name_id_format: default_name_id_format(),
            idp_certificates: Vec::new(),
            id_attributes: default_id_attributes(),
        }
    }

    pub fn with_name_id_format(mut self, format: impl Into<String>) -> Self {
        self.name_id_format = format.into();
        self
    }

    /// Trust an inline certificate (PEM or bare base64 body).
    pub fn with_idp_certificate(mut self, pem: impl Into<String>) -> Self {
        self.idp_certificates.push(IdpCertificate {
            name: None,
            pem: Some(pem.into()),
            path: None,
        });
        self
    }

    /// Trust an inline certificate under a key name usable as a `KeyName` hint.
    pub fn with_named_idp_certificate(
        mut self,
        name: impl Into<String>,
        pem: impl Into<String>,
    ) -> Self {
        self.idp_certificates.push(IdpCertificate {
            name: Some(name.into()),
            pem: Some(pem.into()),
            path: None,
        });
        self
    }

    /// Trust a certificate or public key file.
    pub fn with_idp_certificate_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.idp_certificates.push(IdpCertificate {
            name: None,
            pem: None,
            path: Some(path.into()),
        });
        self
    }

    /// Register an additional ID attribute name.
    pub fn with_id_attribute(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.id_attributes.contains(&name) {
            self.id_attributes.push(name);
        }
        self
    }

    /// Parse settings from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, Error> {
        let settings: Self =
            serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        settings.check()?;
        Ok(settings)
    }

    /// Load settings from a YAML file.
    ///
    /// Relative certificate paths are resolved against the directory that
    /// holds the settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut settings = Self::from_yaml_str(&text).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })?;

        if let Some(base) = path.parent() {
            for cert in &mut settings.idp_certificates {
                if let Some(cert_path) = cert.path.as_mut() {
                    if cert_path.is_relative() {
                        *cert_path = base.join(&*cert_path);
                    }
                }
            }
        }
        Ok(settings)
    }

    fn check(&self) -> Result<(), Error> {
        if self.id_attributes.is_empty() {
            return Err(Error::Config("id_attributes must not be empty".into()));
        }
        for (i, cert) in self.idp_certificates.iter().enumerate() {
            match (&cert.pem, &cert.path) {
                (Some(_), None) | (None, Some(_)) => {}
                _ => {
                    return Err(Error::Config(format!(
                        "idp_certificates[{i}]: exactly one of `pem` or `path` is required"
                    )))
                }
            }
        }
        Ok(())
    }

    /// Load every configured certificate into a key store.
    ///
    /// An entry that cannot be read or parsed is skipped with a warning.
    /// With nothing usable the store is empty and every validation rejects
    /// with `NoKeyMaterial`.
    pub fn trusted_keys(&self) -> Result<TrustedKeys, Error> {
        self.check()?;
        let mut keys = TrustedKeys::new();
        for (i, cert) in self.idp_certificates.iter().enumerate() {
            match cert.load() {
                Ok(key) => {
                    tracing::debug!(index = i, key = %key.label(), "loaded trusted key");
                    keys.add_key(key);
                }
                Err(e) => {
                    tracing::warn!(index = i, error = %e, "skipping unusable IdP certificate");
                }
            }
        }
        Ok(keys)
    }
}

impl IdpCertificate {
    fn load(&self) -> Result<VerificationKey, Error> {
        let key = match (&self.pem, &self.path) {
            (Some(pem), None) => loader::load_public_auto(pem.trim().as_bytes())?,
            (None, Some(path)) => loader::load_key_file(path)?,
            _ => return Err(Error::Config("exactly one of `pem` or `path` is required".into())),
        };
        Ok(match &self.name {
            Some(name) => key.with_name(name.clone()),
            None => key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDP_CERT: &str = include_str!("../../../test-data/keys/idp-cert.pem");

    fn bare_base64(pem: &str) -> String {
        pem.lines().filter(|l| !l.starts_with("-----")).collect()
    }

    #[test]
    fn test_yaml_defaults() {
        let settings = TrustSettings::from_yaml_str(
            "sp_entity_id: https://sp.example.test\nacs_url: https://sp.example.test/acs\n",
        )
        .unwrap();
        assert_eq!(settings.name_id_format, DEFAULT_NAME_ID_FORMAT);
        assert_eq!(settings.id_attributes, vec!["ID".to_string()]);
        assert!(settings.idp_certificates.is_empty());
        assert!(settings.trusted_keys().unwrap().is_empty());
    }

    #[test]
    fn test_yaml_missing_required_field() {
        let err = TrustSettings::from_yaml_str("sp_entity_id: x\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_certificate_needs_exactly_one_source() {
        let yaml = "sp_entity_id: x\nacs_url: y\nidp_certificates:\n  - name: idp\n";
        assert!(matches!(
            TrustSettings::from_yaml_str(yaml),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_inline_pem_and_base64() {
        let settings = TrustSettings::new("sp", "https://sp/acs")
            .with_named_idp_certificate("idp", IDP_CERT)
            .with_idp_certificate(bare_base64(IDP_CERT));
        let keys = settings.trusted_keys().unwrap();
        assert_eq!(keys.len(), 2);
        let named = keys.find_by_name("idp").unwrap();
        assert!(named.certificate_der.is_some());
    }

    #[test]
    fn test_unusable_certificate_is_skipped() {
        let settings = TrustSettings::new("sp", "https://sp/acs")
            .with_idp_certificate("not a certificate")
            .with_idp_certificate(IDP_CERT);
        assert_eq!(settings.trusted_keys().unwrap().len(), 1);
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test-data");
        let settings_path = std::env::temp_dir().join(format!(
            "samlvakt-settings-{}.yaml",
            std::process::id()
        ));
        let yaml = format!(
            "sp_entity_id: sp\nacs_url: https://sp/acs\nidp_certificates:\n  - path: {}\n  - path: relative-cert.pem\n",
            dir.join("keys/idp-cert.pem").display()
        );
        std::fs::write(&settings_path, yaml).unwrap();

        let settings = TrustSettings::load(&settings_path).unwrap();
        std::fs::remove_file(&settings_path).unwrap();

        assert_eq!(
            settings.idp_certificates[1].path.as_deref(),
            Some(std::env::temp_dir().join("relative-cert.pem").as_path())
        );
        assert!(settings.idp_certificates[0]
            .path
            .as_ref()
            .unwrap()
            .is_absolute());
        // The relative file does not exist and is skipped.
        assert_eq!(settings.trusted_keys().unwrap().len(), 1);
    }

    #[test]
    fn test_id_attribute_dedup() {
        let settings = TrustSettings::new("sp", "acs")
            .with_id_attribute("AssertionID")
            .with_id_attribute("ID");
        assert_eq!(settings.id_attributes, vec!["ID", "AssertionID"]);
    }

    #[test]
    fn test_yaml_round_trip_skips_empty_fields() {
        let settings = TrustSettings::new("sp", "acs").with_idp_certificate_file("idp.pem");
        let yaml = serde_yaml::to_string(&settings).unwrap();
        assert!(!yaml.contains("pem: null"));
        assert_eq!(TrustSettings::from_yaml_str(&yaml).unwrap(), settings);
    }
}
