use serde::{Deserialize, Serialize};

use crate::{Struct, Value};

/// Domain separator of credential and presentation proofs.
///
/// Matches the `EIP712Domain` structure returned by
/// [`TypeDefinition::credential_domain`](crate::TypeDefinition::credential_domain).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub chain_id: u64,
    pub name: String,
    pub version: String,
}

impl Domain {
    pub const VERSION: &'static str = "1";

    pub fn new(name: impl Into<String>, chain_id: u64) -> Self {
        Self {
            chain_id,
            name: name.into(),
            version: Self::VERSION.to_owned(),
        }
    }
}

impl From<Domain> for Value {
    fn from(domain: Domain) -> Self {
        let mut object = Struct::with_capacity(3);
        object.insert("chainId".to_string(), Value::Integer(domain.chain_id.into()));
        object.insert("name".to_string(), Value::String(domain.name));
        object.insert("version".to_string(), Value::String(domain.version));
        Value::Struct(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn domain_value() {
        let value = Value::from(Domain::new("VerifiableCredential", u64::MAX));
        assert_eq!(
            serde_json::Value::from(value),
            json!({ "chainId": u64::MAX, "name": "VerifiableCredential", "version": "1" })
        );
    }
}
