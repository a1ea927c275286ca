use eip712_dids::{DIDResolver, Document, VerificationMethod};
use eip712_typed_data::{Domain, Struct, TypedData};
use serde_json::Value;

use crate::{
    document,
    key::{self, KeyManager, KeyManagerError, ManagedKey},
    proof::{Proof, ProofInfo},
    Error, IssueOptions, ProofRole,
};

/// Signs a credential or presentation with an `EthereumEip712Signature2021`
/// proof.
///
/// The input document is left untouched; the signed copy is returned.
pub async fn issue(
    document: &Value,
    role: ProofRole,
    options: &IssueOptions,
    key_manager: &impl KeyManager,
    resolver: &impl DIDResolver,
) -> Result<Value, Error> {
    let mut document = document::as_object(document)?.clone();

    let issuance_date = document::normalize(&mut document, role)?;
    let signer = document::signer_did(&document, role)?.to_owned();
    if role == ProofRole::Presentation {
        document::normalize_credentials(&mut document)?;
    }

    let identity = key_manager.get_identity(&signer).await.map_err(|e| {
        Error::invalid_argument(format!(
            "{} must be a DID managed by this agent: {e}",
            role.signer_property()
        ))
    })?;

    let key_ref = match &options.key_ref {
        Some(key_ref) => key_ref.clone(),
        None => identity
            .keys
            .iter()
            .find(|k| key::is_default_signing_key(k))
            .map(|k| k.kid.clone())
            .ok_or_else(|| {
                Error::key_not_found(format!(
                    "No suitable signing key is known for {}",
                    identity.did
                ))
            })?,
    };
    log::debug!("signing with key {key_ref}");

    let did_document = resolver
        .resolve(&signer)
        .await
        .map_err(Error::resolver_error)?;
    let verification_method = identity
        .keys
        .iter()
        .filter(|k| k.kid == key_ref)
        .find_map(|k| find_verification_method(k, &did_document))
        .ok_or_else(|| {
            Error::key_not_found("The signing key is not available in the issuer DID document")
        })?;

    let chain_id = match verification_method.chain_id() {
        Ok(chain_id) => chain_id,
        Err(e) => {
            log::warn!(
                "unable to get chain id of {}, defaulting to 1: {e}",
                verification_method.id
            );
            1
        }
    };
    log::debug!("chain id: {chain_id}");

    let proof = Proof::new(
        verification_method.id.clone(),
        issuance_date,
        options.proof_purpose().to_owned(),
    );
    document.shift_remove("proof");
    document.insert("proof".to_string(), to_json(&proof)?);

    let primary_type = role.canonical_name();
    let message = Struct::try_from(Value::Object(document.clone()))?;
    let typed_data = TypedData::build(
        &message,
        primary_type.to_owned(),
        Domain::new(primary_type, chain_id),
    )?;
    log::debug!("built {primary_type} typed data");

    let data = serde_json::to_vec(&typed_data).map_err(Error::invalid_argument)?;
    let signature = key_manager
        .sign(&key_ref, &data, key::SIGN_TYPED_DATA)
        .await
        .map_err(|e| match e {
            KeyManagerError::UnknownKey(_) => Error::key_not_found(e),
            e => Error::invalid_argument(e),
        })?;

    let proof = Proof {
        proof_value: Some(signature),
        eip712: Some(ProofInfo::from(typed_data)),
        ..proof
    };
    document.insert("proof".to_string(), to_json(&proof)?);

    Ok(Value::Object(document))
}

/// Finds the verification method published for a managed key, by Ethereum
/// address.
fn find_verification_method<'a>(
    key: &ManagedKey,
    document: &'a Document,
) -> Option<&'a VerificationMethod> {
    let address = key.ethereum_address().ok()?;
    document
        .verification_method
        .iter()
        .find(|vm| vm.ethereum_address().is_ok_and(|a| a == address))
}

fn to_json(proof: &Proof) -> Result<Value, Error> {
    serde_json::to_value(proof).map_err(Error::invalid_argument)
}
