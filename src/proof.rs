use eip712_typed_data::{StructName, TypedData, Types, Value};
use serde::{Deserialize, Serialize};

use crate::{Error, PROOF_TYPE};

/// Proof properties not covered by the signature.
pub const UNSIGNED_PROOF_PROPERTIES: [&str; 3] = ["proofValue", "eip712", "eip712Domain"];

/// [Ethereum EIP712 Signature 2021](https://w3c-ccg.github.io/ethereum-eip712-signature-2021-spec/)
/// proof.
///
/// Properties are declared in the order they are signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    pub verification_method: String,
    pub created: String,
    pub proof_purpose: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eip712: Option<ProofInfo>,
}

impl Proof {
    /// Unsigned proof, as included in the signed message.
    pub fn new(verification_method: String, created: String, proof_purpose: String) -> Self {
        Self {
            verification_method,
            created,
            proof_purpose,
            type_: PROOF_TYPE.to_owned(),
            proof_value: None,
            eip712: None,
        }
    }
}

/// Object at the `eip712` property of the proof: everything needed to
/// rebuild the signed typed data, except the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofInfo {
    pub domain: Value,
    pub types: Types,
    pub primary_type: StructName,
}

impl From<TypedData> for ProofInfo {
    fn from(typed_data: TypedData) -> Self {
        Self {
            domain: typed_data.domain,
            types: typed_data.types,
            primary_type: typed_data.primary_type,
        }
    }
}

/// Proof info reconciled from the current `eip712` property and the legacy
/// `eip712Domain` property.
///
/// Fields of `eip712` take precedence. Legacy proofs name the types
/// `messageSchema`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatProof {
    pub domain: Value,
    pub types: Types,
    pub primary_type: StructName,
}

impl CompatProof {
    pub fn from_proof(proof: &serde_json::Map<String, serde_json::Value>) -> Result<Self, Error> {
        let mut compat = serde_json::Map::new();
        for property in ["eip712Domain", "eip712"] {
            if let Some(serde_json::Value::Object(info)) = proof.get(property) {
                compat.extend(info.clone());
            }
        }

        let types = compat
            .remove("types")
            .or_else(|| compat.remove("messageSchema"));
        let (Some(domain), Some(types), Some(primary_type)) =
            (compat.remove("domain"), types, compat.remove("primaryType"))
        else {
            return Err(Error::invalid_argument(
                "proof is missing expected properties",
            ));
        };

        let serde_json::Value::String(primary_type) = primary_type else {
            return Err(Error::invalid_argument("proof primaryType must be a string"));
        };
        if !types.is_object() {
            return Err(Error::invalid_argument(
                "proof types must be an object, remote types are not supported",
            ));
        }
        let types: Types = serde_json::from_value(types)
            .map_err(|e| Error::invalid_argument(format!("invalid proof types: {e}")))?;
        let domain = Value::try_from(domain)?;
        if domain.as_struct().is_none() {
            return Err(Error::invalid_argument("proof domain must be an object"));
        }

        Ok(Self {
            domain,
            types,
            primary_type,
        })
    }

    /// Typed data signed over `message`.
    pub fn into_typed_data(self, message: Value) -> TypedData {
        TypedData {
            domain: self.domain,
            types: self.types,
            message,
            primary_type: self.primary_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info() -> serde_json::Value {
        json!({
            "domain": { "chainId": 1, "name": "VerifiableCredential", "version": "1" },
            "types": {
                "EIP712Domain": [
                    { "name": "name", "type": "string" },
                    { "name": "version", "type": "string" },
                    { "name": "chainId", "type": "uint256" }
                ],
                "VerifiableCredential": [
                    { "name": "issuer", "type": "string" }
                ]
            },
            "primaryType": "VerifiableCredential"
        })
    }

    fn object(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn current_proof() {
        let compat = CompatProof::from_proof(&object(json!({ "eip712": info() }))).unwrap();
        assert_eq!(compat.primary_type, "VerifiableCredential");
        assert!(compat.types.get("VerifiableCredential").is_some());
    }

    #[test]
    fn legacy_proof() {
        let mut legacy = info();
        let types = legacy.as_object_mut().unwrap().remove("types").unwrap();
        legacy["messageSchema"] = types;
        let legacy = CompatProof::from_proof(&object(json!({ "eip712Domain": legacy }))).unwrap();
        let current = CompatProof::from_proof(&object(json!({ "eip712": info() }))).unwrap();
        assert_eq!(legacy, current);
    }

    #[test]
    fn current_fields_win() {
        let mut legacy = info();
        legacy["primaryType"] = json!("Legacy");
        let compat = CompatProof::from_proof(&object(json!({
            "eip712Domain": legacy,
            "eip712": { "primaryType": "VerifiableCredential" }
        })))
        .unwrap();
        assert_eq!(compat.primary_type, "VerifiableCredential");
    }

    #[test]
    fn missing_properties() {
        let mut partial = info();
        partial.as_object_mut().unwrap().remove("domain");
        assert!(matches!(
            CompatProof::from_proof(&object(json!({ "eip712": partial }))),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            CompatProof::from_proof(&object(json!({}))),
            Err(Error::InvalidArgument(_))
        ));

        let mut remote = info();
        remote["types"] = json!("https://example.org/types.json");
        assert!(matches!(
            CompatProof::from_proof(&object(json!({ "eip712": remote }))),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn unsigned_proof_serialization() {
        let proof = Proof::new(
            "did:example:123#controller".to_string(),
            "2021-01-01T00:00:00.000Z".to_string(),
            "assertionMethod".to_string(),
        );
        let value = serde_json::to_value(&proof).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            ["verificationMethod", "created", "proofPurpose", "type"]
        );
        assert_eq!(value["type"], PROOF_TYPE);
    }
}
