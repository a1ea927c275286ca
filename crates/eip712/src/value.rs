use core::fmt;
use indexmap::{Equivalent, IndexMap};
use serde::{Deserialize, Serialize};
use std::hash::Hash;

use crate::StructName;

mod serialize;

/// EIP-712 structure instance.
///
/// Members keep their insertion order, which is the order used when
/// inferring the structure's type definition.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Struct(IndexMap<String, Value>);

impl Struct {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self(IndexMap::with_capacity(cap))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &(impl ?Sized + Hash + Equivalent<String>)) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> indexmap::map::Iter<String, Value> {
        self.0.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<String, Value> {
        self.0.keys()
    }

    /// Inserts a member.
    ///
    /// An existing member keeps its position and only has its value replaced.
    pub fn insert(&mut self, name: String, value: Value) -> Option<Value> {
        self.0.insert(name, value)
    }

    /// Removes a member, preserving the order of the remaining ones.
    pub fn remove(&mut self, key: &(impl ?Sized + Hash + Equivalent<String>)) -> Option<Value> {
        self.0.shift_remove(key)
    }
}

impl IntoIterator for Struct {
    type IntoIter = indexmap::map::IntoIter<String, Value>;
    type Item = (String, Value);

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Struct {
    type IntoIter = indexmap::map::Iter<'a, String, Value>;
    type Item = (&'a String, &'a Value);

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(StructName, Value)> for Struct {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(IndexMap::from_iter(iter))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    String,
    Bytes,
    Array,
    Struct,
    Bool,
    Integer,
    Number,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Array => "array",
            Self::Struct => "struct",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/// EIP-712 values, JSON-compatible
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub enum Value {
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Struct(Struct),
    Bool(bool),
    Integer(i128),
    /// Number without an integer representation, typed as a string.
    Number(serde_json::Number),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Array(_) => ValueKind::Array,
            Self::Struct(_) => ValueKind::Struct,
            Self::Bool(_) => ValueKind::Bool,
            Self::Integer(_) => ValueKind::Integer,
            Self::Number(_) => ValueKind::Number,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            // Only the strings eth-sig-util reads unambiguously as booleans.
            Value::String(string) => match string.as_str() {
                "" => Some(false),
                "true" | "1" => Some(true),
                _ => None,
            },
            Value::Integer(0) => Some(false),
            Value::Integer(1) => Some(true),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(string) => Some(string),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Value::Struct(map) => Some(map),
            _ => None,
        }
    }

    pub fn into_struct(self) -> Option<Struct> {
        match self {
            Value::Struct(map) => Some(map),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<Struct> for Value {
    fn from(value: Struct) -> Self {
        Value::Struct(value)
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> serde_json::Value {
        match value {
            Value::Bool(true) => serde_json::Value::Bool(true),
            Value::Bool(false) => serde_json::Value::Bool(false),
            Value::Integer(int) => integer_to_json(int),
            Value::Number(number) => serde_json::Value::Number(number),
            Value::Bytes(bytes) => {
                serde_json::Value::String("0x".to_string() + &hex::encode(bytes))
            }
            Value::String(string) => serde_json::Value::String(string),
            Value::Array(array) => {
                serde_json::Value::Array(array.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Struct(map) => serde_json::Value::from(map),
        }
    }
}

fn integer_to_json(int: i128) -> serde_json::Value {
    if let Ok(int) = i64::try_from(int) {
        serde_json::Value::Number(int.into())
    } else if let Ok(int) = u64::try_from(int) {
        serde_json::Value::Number(int.into())
    } else {
        serde_json::Value::String(int.to_string())
    }
}

impl From<Struct> for serde_json::Value {
    fn from(value: Struct) -> serde_json::Value {
        serde_json::Value::Object(
            value
                .into_iter()
                .map(|(name, value)| (name, serde_json::Value::from(value)))
                .collect(),
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FromJsonError {
    #[error("Unexpected null value")]
    UnexpectedNull,
    #[error("Expected object")]
    ExpectedObject,
}

impl TryFrom<serde_json::Value> for Value {
    type Error = FromJsonError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let eip712_value = match value {
            serde_json::Value::Null => return Err(Self::Error::UnexpectedNull),
            serde_json::Value::Bool(true) => Value::Bool(true),
            serde_json::Value::Bool(false) => Value::Bool(false),
            serde_json::Value::String(string) => Value::String(string),
            serde_json::Value::Number(number) => match (number.as_i64(), number.as_u64()) {
                (Some(int), _) => Value::Integer(int.into()),
                (None, Some(int)) => Value::Integer(int.into()),
                (None, None) => Value::Number(number),
            },
            serde_json::Value::Array(array) => Value::Array(
                array
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<Vec<Self>, Self::Error>>()?,
            ),
            serde_json::Value::Object(object) => Value::Struct(
                object
                    .into_iter()
                    .map(|(name, value)| Value::try_from(value).map(|v| (name, v)))
                    .collect::<Result<Struct, Self::Error>>()?,
            ),
        };

        Ok(eip712_value)
    }
}

impl TryFrom<serde_json::Value> for Struct {
    type Error = FromJsonError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Value::try_from(value)?
            .into_struct()
            .ok_or(FromJsonError::ExpectedObject)
    }
}
