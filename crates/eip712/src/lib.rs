//! EIP-712 typed structured data for credential proofs.
//!
//! This crate infers an EIP-712 type schema from an arbitrary JSON-like
//! document ([`Types::generate`]), assembles the canonical signing payload
//! ([`TypedData::build`]) and computes the digest signed by wallets
//! ([`TypedData::hash`]).
use keccak_hash::keccak;
use serde::{Deserialize, Serialize};

mod domain;
mod encode;
mod generate;
mod hashing;
mod ty;
mod value;

pub use domain::Domain;
pub use generate::TypesGenerationError;
pub use hashing::TypedDataHashError;
pub use ty::*;
pub use value::*;

/// Typed data payload, hashed and signed as a whole.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    pub domain: Value,
    pub types: Types,
    pub message: Value,
    pub primary_type: StructName,
}

impl TypedData {
    /// Builds the signing payload of `document`.
    ///
    /// The types are inferred from the document itself, with `primary_type`
    /// naming its root structure.
    pub fn build(
        document: &Struct,
        primary_type: StructName,
        domain: Domain,
    ) -> Result<Self, TypesGenerationError> {
        let types = Types::generate(document, primary_type.clone())?;
        Ok(Self {
            domain: domain.into(),
            types,
            message: Value::Struct(document.clone()),
            primary_type,
        })
    }

    /// Encode a typed data message for hashing and signing.
    /// [Reference](https://github.com/ethereum/EIPs/blob/master/EIPS/eip-712.md#specification)
    pub fn hash(&self) -> Result<[u8; 32], TypedDataHashError> {
        let bytes = self.encode()?;
        Ok(keccak(bytes).to_fixed_bytes())
    }

    pub fn encode(&self) -> Result<[u8; 66], TypedDataHashError> {
        let message_hash = self.message.hash(&self.primary_type, &self.types)?;
        let domain_separator = self.domain.hash(EIP712_DOMAIN, &self.types)?;

        let mut result = [0; 66];
        result[0] = 0x19;
        result[1] = 0x01;
        result[2..34].copy_from_slice(&domain_separator);
        result[34..].copy_from_slice(&message_hash);

        Ok(result)
    }
}

pub(crate) fn bytes_from_hex(s: &str) -> Option<Vec<u8>> {
    s.strip_prefix("0x")
        .and_then(|hex_str| hex::decode(hex_str).ok())
}
