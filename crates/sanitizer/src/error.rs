use thiserror::Error;

/// Mistakes in trusted policy configuration, reported when the policy is
/// built. Untrusted input never produces one of these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyError {
    #[error("rel token `{0}` contains whitespace; pass each token separately")]
    RelTokenWhitespace(String),
    #[error("rel tokens must not be empty")]
    EmptyRelToken,
    #[error("invalid element name `{0}`")]
    InvalidElementName(String),
    #[error("invalid attribute name `{0}`")]
    InvalidAttributeName(String),
    #[error("invalid URL protocol `{0}`")]
    InvalidProtocol(String),
    #[error("invalid attribute value pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    Schema(#[from] css::SchemaError),
}
