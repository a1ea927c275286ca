use std::{fmt, num::ParseIntError, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub type StructName = String;

/// Name of the domain separator structure.
pub const EIP712_DOMAIN: &str = "EIP712Domain";

/// EIP-712 types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    BytesN(usize),
    UintN(usize),
    IntN(usize),
    Bool,
    Address,
    Bytes,
    String,
    Array(Box<TypeRef>),
    ArrayN(Box<TypeRef>, usize),
    Struct(StructName),
}

impl TypeRef {
    /// Return name of struct if this type is a reference to a struct or array of structs
    pub fn as_struct_name(&self) -> Option<&StructName> {
        match self {
            Self::Struct(name) => Some(name),
            Self::Array(type_box) | Self::ArrayN(type_box, _) => type_box.as_struct_name(),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TypeParseError {
    #[error("Missing `[` in array type `{0}`")]
    UnmatchedBracket(String),
    #[error("Invalid size in type `{0}`: {1}")]
    Size(String, ParseIntError),
}

fn parse_size(type_: &str, size: &str) -> Result<usize, TypeParseError> {
    size.parse()
        .map_err(|e| TypeParseError::Size(type_.to_owned(), e))
}

impl FromStr for TypeRef {
    type Err = TypeParseError;

    fn from_str(type_: &str) -> Result<Self, Self::Err> {
        if let Some(head) = type_.strip_suffix(']') {
            let (element, len) = head
                .rsplit_once('[')
                .ok_or_else(|| TypeParseError::UnmatchedBracket(type_.to_owned()))?;
            let element = Box::new(element.parse()?);
            return match len {
                "" => Ok(Self::Array(element)),
                len => Ok(Self::ArrayN(element, parse_size(type_, len)?)),
            };
        }

        let parsed = match type_ {
            "bytes" => Self::Bytes,
            "string" => Self::String,
            "address" => Self::Address,
            "bool" => Self::Bool,
            _ => match ["uint", "int", "bytes"]
                .into_iter()
                .find_map(|prefix| Some((prefix, type_.strip_prefix(prefix)?)))
            {
                Some(("uint", size)) => Self::UintN(parse_size(type_, size)?),
                Some(("int", size)) => Self::IntN(parse_size(type_, size)?),
                Some((_, size)) => Self::BytesN(parse_size(type_, size)?),
                None => Self::Struct(type_.to_owned()),
            },
        };
        Ok(parsed)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Bytes => f.write_str("bytes"),
            Self::String => f.write_str("string"),
            Self::Bool => f.write_str("bool"),
            Self::Address => f.write_str("address"),
            Self::BytesN(n) => write!(f, "bytes{n}"),
            Self::UintN(n) => write!(f, "uint{n}"),
            Self::IntN(n) => write!(f, "int{n}"),
            Self::Array(element) => write!(f, "{element}[]"),
            Self::ArrayN(element, n) => write!(f, "{element}[{n}]"),
            Self::Struct(name) => f.write_str(name),
        }
    }
}

impl From<TypeRef> for String {
    fn from(type_: TypeRef) -> String {
        match type_ {
            TypeRef::Struct(name) => name,
            other => other.to_string(),
        }
    }
}

/// Structured typed data as described in
/// [Definition of typed structured data 𝕊](https://github.com/ethereum/EIPs/blob/master/EIPS/eip-712.md#definition-of-typed-structured-data-%F0%9D%95%8A)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeDefinition(Vec<MemberVariable>);

impl TypeDefinition {
    pub fn new(member_variables: Vec<MemberVariable>) -> Self {
        Self(member_variables)
    }

    pub fn member_variables(&self) -> &[MemberVariable] {
        &self.0
    }

    pub fn push(&mut self, m: MemberVariable) {
        self.0.push(m)
    }

    /// Type of the `EIP712Domain` structure used by credential proofs.
    pub fn credential_domain() -> Self {
        Self(vec![
            MemberVariable::new("name".to_string(), TypeRef::String),
            MemberVariable::new("version".to_string(), TypeRef::String),
            MemberVariable::new("chainId".to_string(), TypeRef::UintN(256)),
        ])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberVariable {
    pub name: String,

    #[serde(rename = "type")]
    pub type_: TypeRef,
}

impl MemberVariable {
    pub fn new(name: String, type_: TypeRef) -> Self {
        Self { name, type_ }
    }
}

/// Type schema of a typed data payload.
///
/// Structure definitions are kept in insertion order so that a schema
/// serializes identically every time it is produced from the same document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Types {
    #[serde(rename = "EIP712Domain", default = "TypeDefinition::credential_domain")]
    pub eip712_domain: TypeDefinition,

    #[serde(flatten)]
    pub types: IndexMap<StructName, TypeDefinition>,
}

impl Types {
    pub fn get(&self, struct_name: &str) -> Option<&TypeDefinition> {
        if struct_name == EIP712_DOMAIN {
            Some(&self.eip712_domain)
        } else {
            self.types.get(struct_name)
        }
    }
}
