//! DID documents and resolution, reduced to what EIP-712 credential proofs
//! need: Ethereum addresses and chain ids of verification methods.
mod caip10;
mod did;
mod document;
pub mod eip155;
pub mod resolution;

pub use caip10::{BlockchainAccountId, BlockchainAccountIdParseError, ChainId};
pub use did::remove_did_parameters;
pub use document::{AddressError, ChainIdError, Document, VerificationMethod};
pub use resolution::{DIDResolver, StaticDIDResolver};
