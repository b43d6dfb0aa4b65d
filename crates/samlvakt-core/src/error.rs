#![forbid(unsafe_code)]

/// Errors raised below the validation pipeline.
///
/// The pipeline never returns these to its caller directly: each stage
/// folds them into a [`Rejection`](crate::Rejection).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed XML: {0}")]
    XmlParse(String),

    #[error("unexpected document structure: {0}")]
    XmlStructure(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A signature that could not be checked or did not verify.
    #[error("signature check failed: {0}")]
    Crypto(String),

    #[error("unusable key: {0}")]
    Key(String),

    #[error("reference digest mismatch: {0}")]
    DigestMismatch(String),

    #[error("transform failed: {0}")]
    Transform(String),

    #[error("invalid base64: {0}")]
    Base64(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("missing element: {0}")]
    MissingElement(String),

    #[error("missing attribute: {0}")]
    MissingAttribute(String),

    #[error("unresolvable reference URI: {0}")]
    InvalidUri(String),

    #[error("unusable certificate: {0}")]
    Certificate(String),

    /// Trust settings could not be read or are inconsistent.
    #[error("settings: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
