use serde::Serialize;

use crate::Value;

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Bool(b) => b.serialize(serializer),
            Self::Integer(i) => i.serialize(serializer),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => s.serialize(serializer),
            // Bytes travel as `0x`-prefixed hex strings, as in JSON typed data.
            Self::Bytes(b) => format!("0x{}", hex::encode(b)).serialize(serializer),
            Self::Array(a) => a.serialize(serializer),
            Self::Struct(s) => s.serialize(serializer),
        }
    }
}
