use std::collections::BTreeMap;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::{
    caip10::{BlockchainAccountId, BlockchainAccountIdParseError},
    eip155,
};

/// [DID document](https://www.w3.org/TR/did-core/#dfn-did-documents).
///
/// Only the verification methods are interpreted; every other property is
/// kept as is.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,

    pub id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationMethod>,

    #[serde(flatten)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Document {
    pub fn new(id: String) -> Self {
        Self {
            context: None,
            id,
            verification_method: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn find_verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("verification method `{0}` has no Ethereum key material")]
    NoKeyMaterial(String),
    #[error("invalid Ethereum address `{0}`")]
    InvalidAddress(String),
    #[error("unsupported blockchain account namespace `{0}`")]
    UnsupportedNamespace(String),
    #[error("invalid blockchain account id: {0}")]
    BlockchainAccountId(#[from] BlockchainAccountIdParseError),
    #[error("invalid public key: {0}")]
    PublicKey(String),
    #[error("unsupported JWK: expected a secp256k1 EC key")]
    UnsupportedJwk,
}

#[derive(Debug, thiserror::Error)]
pub enum ChainIdError {
    #[error("no chain id can be derived from verification method `{0}`")]
    NotFound(String),
    #[error("invalid blockchain account id: {0}")]
    BlockchainAccountId(#[from] BlockchainAccountIdParseError),
    #[error("invalid chain reference `{0}`")]
    InvalidReference(String),
}

/// Verification method, as found in a DID document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VerificationMethod {
    pub id: String,

    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default)]
    pub controller: String,

    /// Verification methods properties.
    #[serde(flatten)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl VerificationMethod {
    pub fn new(id: String, type_: String, controller: String) -> Self {
        Self {
            id,
            type_,
            controller,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(name.to_owned(), value.into());
        self
    }

    fn string_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(serde_json::Value::as_str)
    }

    pub fn blockchain_account_id(
        &self,
    ) -> Option<Result<BlockchainAccountId, BlockchainAccountIdParseError>> {
        self.string_property("blockchainAccountId")
            .map(str::parse)
    }

    /// Lowercase Ethereum address controlled by this verification method.
    ///
    /// Looked up, in order, from `ethereumAddress`, `blockchainAccountId`,
    /// `publicKeyHex` and `publicKeyJwk`.
    pub fn ethereum_address(&self) -> Result<String, AddressError> {
        if let Some(address) = self.string_property("ethereumAddress") {
            return eip155::normalize_address(address)
                .ok_or_else(|| AddressError::InvalidAddress(address.to_owned()));
        }

        if let Some(account_id) = self.blockchain_account_id() {
            let account_id = account_id?;
            if account_id.chain_id.namespace != "eip155" {
                return Err(AddressError::UnsupportedNamespace(
                    account_id.chain_id.namespace,
                ));
            }
            return eip155::normalize_address(&account_id.account_address)
                .ok_or(AddressError::InvalidAddress(account_id.account_address));
        }

        if let Some(public_key_hex) = self.string_property("publicKeyHex") {
            let hex_str = public_key_hex.trim_start_matches("0x");
            let bytes = hex::decode(hex_str).map_err(|e| AddressError::PublicKey(e.to_string()))?;
            let pk = k256::PublicKey::from_sec1_bytes(&bytes)
                .map_err(|e| AddressError::PublicKey(e.to_string()))?;
            return Ok(eip155::hash_public_key(&pk));
        }

        if let Some(jwk) = self.properties.get("publicKeyJwk") {
            return address_from_jwk(jwk);
        }

        Err(AddressError::NoKeyMaterial(self.id.clone()))
    }

    /// EIP-155 chain id of the account controlled by this verification
    /// method.
    ///
    /// Taken from the `blockchainAccountId` property, or else from the
    /// network segment of `did:ethr` and `did:pkh:eip155` identifiers.
    pub fn chain_id(&self) -> Result<u64, ChainIdError> {
        if let Some(account_id) = self.blockchain_account_id() {
            let account_id = account_id?;
            return account_id
                .eip155_chain_id()
                .ok_or(ChainIdError::InvalidReference(account_id.chain_id.to_string()));
        }

        let did = if self.controller.is_empty() {
            crate::remove_did_parameters(&self.id)
        } else {
            &self.controller
        };
        if let Some(method_specific_id) = did.strip_prefix("did:ethr:") {
            // did:ethr:[network:]address
            return match method_specific_id.split_once(':') {
                None => Ok(1),
                Some((network, _)) => eip155::network_chain_id(network)
                    .ok_or_else(|| ChainIdError::InvalidReference(network.to_owned())),
            };
        }
        if let Some(account) = did.strip_prefix("did:pkh:eip155:") {
            // did:pkh:eip155:chain:address
            let reference = account.split(':').next().unwrap_or_default();
            return reference
                .parse()
                .map_err(|_| ChainIdError::InvalidReference(reference.to_owned()));
        }

        Err(ChainIdError::NotFound(self.id.clone()))
    }
}

fn address_from_jwk(jwk: &serde_json::Value) -> Result<String, AddressError> {
    let param = |name: &str| jwk.get(name).and_then(serde_json::Value::as_str);
    if param("kty") != Some("EC") || param("crv") != Some("secp256k1") {
        return Err(AddressError::UnsupportedJwk);
    }
    let coordinate = |name: &str| -> Result<Vec<u8>, AddressError> {
        let encoded = param(name).ok_or(AddressError::UnsupportedJwk)?;
        URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| AddressError::PublicKey(e.to_string()))
    };
    let mut sec1 = vec![0x04];
    sec1.extend(coordinate("x")?);
    sec1.extend(coordinate("y")?);
    let pk = k256::PublicKey::from_sec1_bytes(&sec1)
        .map_err(|e| AddressError::PublicKey(e.to_string()))?;
    Ok(eip155::hash_public_key(&pk))
}
