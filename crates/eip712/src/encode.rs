use std::collections::{BTreeMap, HashSet};

use keccak_hash::keccak;

use crate::{
    bytes_from_hex, hashing::TypedDataHashError, StructName, TypeDefinition, TypeRef, Types, Value,
};

const WORD: usize = 32;

/// Left-pads `bytes` to a 32 bytes word with `padding`.
fn word(bytes: &[u8], padding: u8) -> Vec<u8> {
    let mut word = vec![padding; WORD - bytes.len()];
    word.extend_from_slice(bytes);
    word
}

impl Value {
    /// Raw bytes of an integer, bytes or hex string value.
    pub fn as_bytes(&self) -> Result<Vec<u8>, TypedDataHashError> {
        match self {
            Value::Bytes(bytes) => Ok(bytes.clone()),
            Value::Integer(int) => Ok(int.to_be_bytes().to_vec()),
            Value::String(string) => bytes_from_hex(string).ok_or(TypedDataHashError::ExpectedHex),
            _ => Err(TypedDataHashError::ExpectedHex),
        }
    }

    fn byte_string(&self, type_: &TypeRef) -> Result<Vec<u8>, TypedDataHashError> {
        match self {
            Value::Bytes(bytes) => Ok(bytes.clone()),
            Value::String(string) => bytes_from_hex(string).ok_or(TypedDataHashError::ExpectedHex),
            _ => Err(TypedDataHashError::mismatch(type_, self)),
        }
    }

    /// Encode the value into a byte string according to the [EIP-712
    /// `encodeData` function][1].
    ///
    /// Note: this implementation follows eth-sig-util
    /// which [diverges from EIP-712 when encoding arrays][2].
    ///
    /// [1]: <https://eips.ethereum.org/EIPS/eip-712#definition-of-encodedata>
    /// [2]: <https://github.com/MetaMask/eth-sig-util/issues/106>
    pub fn encode(&self, type_: &TypeRef, types: &Types) -> Result<Vec<u8>, TypedDataHashError> {
        match type_ {
            TypeRef::String => match self {
                Value::String(string) => Ok(keccak(string.as_bytes()).to_fixed_bytes().to_vec()),
                Value::Number(number) => {
                    Ok(keccak(number.to_string().as_bytes()).to_fixed_bytes().to_vec())
                }
                _ => Err(TypedDataHashError::mismatch(type_, self)),
            },
            TypeRef::Bytes => Ok(keccak(self.byte_string(type_)?).to_fixed_bytes().to_vec()),
            TypeRef::BytesN(n) => {
                if !(1..=WORD).contains(n) {
                    return Err(TypedDataHashError::UnsupportedType(type_.to_string()));
                }
                let mut bytes = self.byte_string(type_)?;
                if bytes.len() != *n {
                    return Err(TypedDataHashError::Length(type_.to_string(), *n, bytes.len()));
                }
                bytes.resize(WORD, 0);
                Ok(bytes)
            }
            TypeRef::UintN(n) | TypeRef::IntN(n) => {
                if n % 8 != 0 || !(8..=256).contains(n) {
                    return Err(TypedDataHashError::UnsupportedType(type_.to_string()));
                }
                let int = match self {
                    Value::Integer(int) if *int < 0 => {
                        if let TypeRef::UintN(_) = type_ {
                            return Err(TypedDataHashError::NegativeUint(type_.to_string()));
                        }
                        return Ok(word(&int.to_be_bytes(), 0xff));
                    }
                    Value::Integer(int) => return Ok(word(&int.to_be_bytes(), 0)),
                    Value::String(_) | Value::Bytes(_) => self.as_bytes()?,
                    _ => return Err(TypedDataHashError::mismatch(type_, self)),
                };
                if int.len() > WORD {
                    return Err(TypedDataHashError::IntegerTooLong(int.len()));
                }
                // Negative signed integers are sign-extended.
                let negative = matches!(type_, TypeRef::IntN(_))
                    && int.first().is_some_and(|b| b & 0x80 != 0);
                Ok(word(&int, if negative { 0xff } else { 0x00 }))
            }
            TypeRef::Bool => {
                let b = self
                    .as_bool()
                    .ok_or_else(|| TypedDataHashError::mismatch(type_, self))?;
                Ok(word(&[b as u8], 0))
            }
            TypeRef::Address => {
                let bytes = self.as_bytes()?;
                if bytes.len() != 20 {
                    return Err(TypedDataHashError::Length(type_.to_string(), 20, bytes.len()));
                }
                Ok(word(&bytes, 0))
            }
            TypeRef::Array(element_type) | TypeRef::ArrayN(element_type, _) => {
                let array = self
                    .as_array()
                    .ok_or_else(|| TypedDataHashError::mismatch(type_, self))?;
                if let TypeRef::ArrayN(_, n) = type_ {
                    if array.len() != *n {
                        return Err(TypedDataHashError::Length(type_.to_string(), *n, array.len()));
                    }
                }
                let mut enc = Vec::with_capacity(WORD * array.len());
                for element in array {
                    enc.extend(encode_field(element, element_type, types)?);
                }
                Ok(enc)
            }
            TypeRef::Struct(struct_name) => self.encode_struct(type_, struct_name, types),
        }
    }

    fn encode_struct(
        &self,
        type_: &TypeRef,
        struct_name: &StructName,
        types: &Types,
    ) -> Result<Vec<u8>, TypedDataHashError> {
        let definition = types
            .get(struct_name)
            .ok_or_else(|| TypedDataHashError::MissingReferencedType(struct_name.clone()))?;
        let object = self
            .as_struct()
            .ok_or_else(|| TypedDataHashError::mismatch(type_, self))?;

        let mut untyped: HashSet<&String> = object.keys().collect();
        let mut enc = Vec::with_capacity(WORD * (definition.member_variables().len() + 1));
        enc.extend_from_slice(&definition.hash(struct_name, types)?);
        for member in definition.member_variables() {
            untyped.remove(&member.name);
            match object.get(&member.name) {
                Some(value) => enc.extend(encode_field(value, &member.type_, types)?),
                // Missing members encode as a zero word.
                None => enc.extend(word(&[], 0)),
            }
        }

        if !untyped.is_empty() {
            let mut names: Vec<String> = untyped.into_iter().cloned().collect();
            names.sort();
            return Err(TypedDataHashError::UntypedProperties(names));
        }
        Ok(enc)
    }
}

/// Encodes a member: reference types (structs and arrays) are replaced by
/// the hash of their encoding.
fn encode_field(
    value: &Value,
    type_: &TypeRef,
    types: &Types,
) -> Result<Vec<u8>, TypedDataHashError> {
    let encoded = value.encode(type_, types)?;
    match type_ {
        TypeRef::Struct(_) | TypeRef::Array(_) | TypeRef::ArrayN(_, _) => {
            Ok(keccak(&encoded).to_fixed_bytes().to_vec())
        }
        _ => Ok(encoded),
    }
}

impl TypeDefinition {
    /// Encode the type into a byte string using the [EIP-712 `encodeType`
    /// function][1].
    ///
    /// The primary structure comes first, followed by every structure it
    /// references, directly or not, sorted by name.
    ///
    /// [1]: <https://eips.ethereum.org/EIPS/eip-712#definition-of-encodetype>
    pub fn encode(
        &self,
        struct_name: &StructName,
        types: &Types,
    ) -> Result<Vec<u8>, TypedDataHashError> {
        let mut referenced = BTreeMap::new();
        collect_references(self, types, &mut referenced)?;
        referenced.remove(struct_name);

        let mut encoded = signature(struct_name, self);
        for (name, definition) in referenced {
            encoded.push_str(&signature(name, definition));
        }
        Ok(encoded.into_bytes())
    }
}

fn collect_references<'a>(
    definition: &'a TypeDefinition,
    types: &'a Types,
    referenced: &mut BTreeMap<&'a StructName, &'a TypeDefinition>,
) -> Result<(), TypedDataHashError> {
    for struct_name in definition
        .member_variables()
        .iter()
        .filter_map(|member| member.type_.as_struct_name())
    {
        if referenced.contains_key(struct_name) {
            continue;
        }
        let referenced_definition = types
            .get(struct_name)
            .ok_or_else(|| TypedDataHashError::MissingReferencedType(struct_name.clone()))?;
        referenced.insert(struct_name, referenced_definition);
        collect_references(referenced_definition, types, referenced)?;
    }
    Ok(())
}

/// `Name(type1 name1,type2 name2)`
fn signature(struct_name: &str, definition: &TypeDefinition) -> String {
    let members: Vec<String> = definition
        .member_variables()
        .iter()
        .map(|member| format!("{} {}", member.type_, member.name))
        .collect();
    format!("{struct_name}({})", members.join(","))
}
