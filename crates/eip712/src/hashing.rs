use keccak_hash::keccak;

use crate::{StructName, TypeDefinition, TypeRef, Types, Value, ValueKind};

/// Error raised when a value does not conform to the types it is hashed
/// with.
#[derive(Debug, thiserror::Error)]
pub enum TypedDataHashError {
    #[error("Missing referenced type: {0}")]
    MissingReferencedType(StructName),
    #[error("Expected `{0}` value, found {1}")]
    TypeMismatch(String, ValueKind),
    #[error("Expected `{0}` value of length {1}, found {2}")]
    Length(String, usize, usize),
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
    #[error("Supplied uint is negative: {0}")]
    NegativeUint(String),
    #[error("Integer of {0} bytes does not fit in 32 bytes")]
    IntegerTooLong(usize),
    #[error("Expected `0x`-prefixed hex string")]
    ExpectedHex,
    #[error("Untyped properties: {0:?}")]
    UntypedProperties(Vec<String>),
}

impl TypedDataHashError {
    pub(crate) fn mismatch(type_: &TypeRef, value: &Value) -> Self {
        Self::TypeMismatch(type_.to_string(), value.kind())
    }
}

impl Value {
    /// `hashStruct` of the value as an instance of the given structure.
    ///
    /// See: <https://eips.ethereum.org/EIPS/eip-712#definition-of-hashstruct>
    pub fn hash(&self, struct_name: &str, types: &Types) -> Result<[u8; 32], TypedDataHashError> {
        let encoded_data = self.encode(&TypeRef::Struct(struct_name.to_owned()), types)?;
        Ok(keccak(encoded_data).to_fixed_bytes())
    }
}

impl TypeDefinition {
    /// `typeHash` of the structure.
    pub fn hash(
        &self,
        struct_name: &StructName,
        types: &Types,
    ) -> Result<[u8; 32], TypedDataHashError> {
        Ok(keccak(self.encode(struct_name, types)?).to_fixed_bytes())
    }
}
