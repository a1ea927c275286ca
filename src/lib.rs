//! Issuance and verification of Verifiable Credentials and Verifiable
//! Presentations with [Ethereum EIP712 Signature 2021][1] proofs.
//!
//! Documents are signed as EIP-712 typed data whose types are inferred from
//! the document itself. The types and domain are embedded in the proof so
//! that verifiers can rebuild the exact signed payload, recover the signer
//! address and look it up in the signer DID document.
//!
//! Signing, DID resolution and signature recovery are performed by
//! collaborators: see [`KeyManager`], [`DIDResolver`] and
//! [`SignatureRecovery`].
//!
//! [1]: <https://w3c-ccg.github.io/ethereum-eip712-signature-2021-spec/>
pub mod document;
mod error;
mod issue;
pub mod key;
mod options;
pub mod proof;
pub mod recovery;
mod provider;
mod verify;

pub use eip712_dids::{DIDResolver, Document as DIDDocument, StaticDIDResolver};
pub use eip712_typed_data as eip712;

pub use error::Error;
pub use issue::issue;
pub use key::{KeyManager, LocalKeyManager, ManagedIdentity, ManagedKey};
pub use options::*;
pub use provider::CredentialProviderEip712;
pub use recovery::{Secp256k1Recovery, SignatureRecovery};
pub use verify::{verify, VerifyError, VerifyResult, INVALID_SIGNATURE};

/// Proof type identifier.
pub const PROOF_TYPE: &str = "EthereumEip712Signature2021";
