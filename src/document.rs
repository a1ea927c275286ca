//! Normalization of credentials and presentations before signing.
use chrono::{SecondsFormat, Utc};
use eip712_dids::remove_did_parameters;
use serde_json::{Map, Value};

use crate::{Error, ProofRole};

/// Base context of Verifiable Credentials and Presentations.
pub const MANDATORY_CREDENTIAL_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

pub type Object = Map<String, Value>;

pub(crate) fn as_object(document: &Value) -> Result<&Object, Error> {
    document
        .as_object()
        .ok_or_else(|| Error::invalid_argument("document must be a JSON object"))
}

/// Normalizes an `@context` or `type` entry into an array starting with
/// `start_with`, without duplicates or empty strings.
pub fn process_entry_to_array(entry: Option<&Value>, start_with: &str) -> Result<Vec<Value>, Error> {
    let entries: Vec<&str> = match entry {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(array)) => array
            .iter()
            .map(|v| {
                v.as_str()
                    .ok_or_else(|| Error::invalid_argument(format!("expected string entry, found {v}")))
            })
            .collect::<Result<_, _>>()?,
        Some(other) => {
            return Err(Error::invalid_argument(format!(
                "expected string or array of strings, found {other}"
            )))
        }
    };

    let mut result: Vec<&str> = vec![start_with];
    for entry in entries {
        if !entry.is_empty() && !result.contains(&entry) {
            result.push(entry);
        }
    }
    Ok(result.into_iter().map(|s| Value::String(s.to_owned())).collect())
}

/// Current time, formatted like `2021-01-01T00:00:00.000Z`.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Normalizes `@context`, `type` and `issuanceDate` in place.
///
/// Present properties keep their position, missing ones are appended.
/// Returns the issuance date.
pub fn normalize(document: &mut Object, role: ProofRole) -> Result<String, Error> {
    let context = process_entry_to_array(document.get("@context"), MANDATORY_CREDENTIAL_CONTEXT)?;
    let type_ = process_entry_to_array(document.get("type"), role.canonical_name())?;
    let issuance_date = match document.get("issuanceDate") {
        None | Some(Value::Null) => now(),
        Some(Value::String(date)) if !date.is_empty() => date.clone(),
        Some(Value::String(_)) => now(),
        Some(other) => {
            return Err(Error::invalid_argument(format!(
                "issuanceDate must be a string, found {other}"
            )))
        }
    };

    document.insert("@context".to_string(), Value::Array(context));
    document.insert("type".to_string(), Value::Array(type_));
    document.insert(
        "issuanceDate".to_string(),
        Value::String(issuance_date.clone()),
    );
    Ok(issuance_date)
}

/// Identifier of the credential issuer, from either a string or an object
/// `issuer` property.
///
/// Returns `None` when missing or empty.
pub fn extract_issuer(document: &Object) -> Option<&str> {
    let issuer = match document.get("issuer")? {
        Value::String(id) => id.as_str(),
        Value::Object(issuer) => issuer.get("id")?.as_str()?,
        _ => return None,
    };
    (!issuer.is_empty()).then_some(issuer)
}

pub fn extract_holder(document: &Object) -> Option<&str> {
    document
        .get("holder")
        .and_then(Value::as_str)
        .filter(|holder| !holder.is_empty())
}

/// DID of the signer of a document, without DID parameters.
pub fn signer_did(document: &Object, role: ProofRole) -> Result<&str, Error> {
    let signer = match role {
        ProofRole::Credential => extract_issuer(document),
        ProofRole::Presentation => extract_holder(document),
    };
    signer.map(remove_did_parameters).ok_or_else(|| {
        Error::invalid_argument(format!(
            "{} must not be empty",
            role.signer_property()
        ))
    })
}

/// Canonical string form of a credential embedded in a presentation.
///
/// EIP-712 arrays hold a single type, so every credential becomes a string:
/// its JWT when it has one, or else its JCS serialization.
pub fn canonical_credential(credential: &Value) -> Result<String, Error> {
    match credential {
        Value::String(jwt) => Ok(jwt.clone()),
        _ => match credential.pointer("/proof/jwt").and_then(Value::as_str) {
            Some(jwt) => Ok(jwt.to_owned()),
            None => serde_jcs::to_string(credential).map_err(Error::invalid_argument),
        },
    }
}

/// Replaces the `verifiableCredential` entries of a presentation by their
/// canonical string form.
pub fn normalize_credentials(presentation: &mut Object) -> Result<(), Error> {
    let Some(credentials) = presentation.get_mut("verifiableCredential") else {
        return Ok(());
    };
    let canonical = match &*credentials {
        Value::Null => return Ok(()),
        Value::Array(array) => array
            .iter()
            .map(canonical_credential)
            .collect::<Result<Vec<_>, _>>()?,
        single => vec![canonical_credential(single)?],
    };
    *credentials = Value::Array(canonical.into_iter().map(Value::String).collect());
    Ok(())
}
