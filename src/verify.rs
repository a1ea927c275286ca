use eip712_dids::DIDResolver;
use eip712_typed_data::Struct;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    document,
    proof::{CompatProof, UNSIGNED_PROOF_PROPERTIES},
    recovery::SignatureRecovery,
    Error, ProofRole,
};

/// Error code of signatures not matching any key of the signer.
pub const INVALID_SIGNATURE: &str = "invalid_signature";

/// Outcome of a completed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResult {
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<VerifyError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyError {
    pub message: String,
    pub error_code: String,
}

impl VerifyResult {
    pub fn success() -> Self {
        Self {
            verified: true,
            error: None,
        }
    }

    pub fn invalid_signature(role: ProofRole) -> Self {
        Self {
            verified: false,
            error: Some(VerifyError {
                message: format!(
                    "{INVALID_SIGNATURE}: The signature does not match any of the {} signing keys",
                    role.signer_property()
                ),
                error_code: INVALID_SIGNATURE.to_owned(),
            }),
        }
    }
}

/// Verifies the `EthereumEip712Signature2021` proof of a credential or
/// presentation.
///
/// The signed typed data is rebuilt from the document and the types embedded
/// in the proof, the signer address is recovered and then looked up among
/// the verification methods of the issuer (or holder) DID document.
pub async fn verify(
    document: &Value,
    role: ProofRole,
    resolver: &impl DIDResolver,
    recovery: &impl SignatureRecovery,
) -> Result<VerifyResult, Error> {
    let document = document::as_object(document)?;
    let proof = document
        .get("proof")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::invalid_argument("proof is undefined"))?;
    let signature = proof
        .get("proofValue")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid_argument("proof is undefined"))?;

    let mut verification_message = document.clone();
    let mut verify_input_proof = proof.clone();
    for property in UNSIGNED_PROOF_PROPERTIES {
        verify_input_proof.shift_remove(property);
    }
    verification_message.shift_remove("proof");
    verification_message.insert("proof".to_string(), Value::Object(verify_input_proof));

    let compat = CompatProof::from_proof(proof)?;
    let message = Struct::try_from(Value::Object(verification_message))?;
    let typed_data = compat.into_typed_data(message.into());
    let recovered = recovery
        .recover(&typed_data, signature)
        .map_err(Error::invalid_argument)?;
    log::debug!("recovered signer address {recovered}");

    let signer = document::signer_did(document, role)?;
    let did_document = resolver
        .resolve(signer)
        .await
        .map_err(Error::resolver_error)?;
    if did_document.verification_method.is_empty() {
        return Err(Error::resolver_error(format!(
            "{} DIDDocument does not contain any verificationMethods",
            role.signer_property()
        )));
    }

    for verification_method in &did_document.verification_method {
        match verification_method.ethereum_address() {
            Ok(address) if address.eq_ignore_ascii_case(&recovered) => {
                log::debug!("signature matches {}", verification_method.id);
                return Ok(VerifyResult::success());
            }
            Ok(_) => (),
            Err(e) => log::debug!("skipping {}: {e}", verification_method.id),
        }
    }

    Ok(VerifyResult::invalid_signature(role))
}
