/// Error raised by credential and presentation issuance and verification.
///
/// A signature that does not match any key of the signer is not an error:
/// it is reported as a negative [`VerifyResult`](crate::VerifyResult).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed input.
    #[error("invalid_argument: {0}")]
    InvalidArgument(String),

    /// No usable signing key, or the signing key is not published by the
    /// signer's DID document.
    #[error("key_not_found: {0}")]
    KeyNotFound(String),

    /// DID resolution failed or yielded no usable key material.
    #[error("resolver_error: {0}")]
    ResolverError(String),
}

impl Error {
    pub fn invalid_argument(message: impl ToString) -> Self {
        Self::InvalidArgument(message.to_string())
    }

    pub fn key_not_found(message: impl ToString) -> Self {
        Self::KeyNotFound(message.to_string())
    }

    pub fn resolver_error(message: impl ToString) -> Self {
        Self::ResolverError(message.to_string())
    }

    /// Error code, as found in the `errorCode` of verification results.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::KeyNotFound(_) => "key_not_found",
            Self::ResolverError(_) => "resolver_error",
        }
    }

    /// Error message, without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(m) | Self::KeyNotFound(m) | Self::ResolverError(m) => m,
        }
    }
}

impl From<eip712_typed_data::FromJsonError> for Error {
    fn from(value: eip712_typed_data::FromJsonError) -> Self {
        Self::invalid_argument(value)
    }
}

impl From<eip712_typed_data::TypesGenerationError> for Error {
    fn from(value: eip712_typed_data::TypesGenerationError) -> Self {
        Self::invalid_argument(value)
    }
}

impl From<eip712_typed_data::TypedDataHashError> for Error {
    fn from(value: eip712_typed_data::TypedDataHashError) -> Self {
        Self::invalid_argument(value)
    }
}
