use crate::{remove_did_parameters, Document};

mod static_resolver;

pub use static_resolver::StaticDIDResolver;

/// DID resolution error.
///
/// Error raised by the [`DIDResolver::resolve`] method.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// DID method is not supported by this resolver.
    #[error("DID method `{0}` not supported")]
    MethodNotSupported(String),

    /// DID document could not be found.
    #[error("DID document not found")]
    NotFound,

    /// The resolved DID document is malformed.
    #[error("invalid DID document: {0}")]
    InvalidData(String),

    /// Internal resolver-specific error.
    #[error("DID resolver internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new internal error.
    pub fn internal(error: impl ToString) -> Self {
        Self::Internal(error.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// DID resolver.
pub trait DIDResolver {
    /// Resolves a DID.
    ///
    /// Fetches the DID document referenced by the input DID. Implementations
    /// receive a DID stripped of any parameter, path, query or fragment.
    ///
    /// See: <https://www.w3.org/TR/did-core/#did-resolution>
    #[allow(async_fn_in_trait)]
    async fn resolve(&self, did: &str) -> Result<Document, Error>;

    /// Resolves the DID part of a DID URL.
    #[allow(async_fn_in_trait)]
    async fn resolve_did_url(&self, did_url: &str) -> Result<Document, Error> {
        self.resolve(remove_did_parameters(did_url)).await
    }
}

impl<'a, T: DIDResolver> DIDResolver for &'a T {
    async fn resolve(&self, did: &str) -> Result<Document, Error> {
        T::resolve(*self, did).await
    }
}
