//! Managed keys and the key manager signing on their behalf.
use std::collections::HashMap;

use eip712_dids::eip155;
use eip712_typed_data::TypedData;
use k256::ecdsa::SigningKey;
use serde::{Deserialize, Serialize};

use crate::recovery;

/// Algorithm tag of EIP-712 typed data signatures.
pub const SIGN_TYPED_DATA: &str = "eth_signTypedData";

/// Algorithm tags denoting support for EIP-712 credential proofs.
pub const ALGORITHMS: [&str; 2] = [SIGN_TYPED_DATA, crate::PROOF_TYPE];

/// Algorithms supported by secp256k1 keys of the [`LocalKeyManager`].
const SECP256K1_ALGORITHMS: [&str; 6] = [
    "ES256K",
    "ES256K-R",
    "eth_signTransaction",
    SIGN_TYPED_DATA,
    "eth_signMessage",
    "eth_rawSign",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    Ed25519,
    Secp256k1,
    Secp256r1,
    X25519,
    Bls12381G1,
    Bls12381G2,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub algorithms: Vec<String>,

    #[serde(flatten)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Key held by a [`KeyManager`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedKey {
    pub kid: String,

    #[serde(rename = "type")]
    pub type_: KeyType,

    /// SEC1 encoded public key, hex encoded.
    pub public_key_hex: String,

    #[serde(default)]
    pub meta: KeyMetadata,
}

impl ManagedKey {
    pub fn algorithms(&self) -> impl Iterator<Item = &str> {
        self.meta.algorithms.iter().map(String::as_str)
    }

    /// Lowercase Ethereum address of a secp256k1 key.
    pub fn ethereum_address(&self) -> Result<String, KeyManagerError> {
        if self.type_ != KeyType::Secp256k1 {
            return Err(KeyManagerError::UnsupportedKeyType(self.type_));
        }
        let hex_str = self.public_key_hex.trim_start_matches("0x");
        let bytes = hex::decode(hex_str).map_err(|e| KeyManagerError::InvalidKey(e.to_string()))?;
        let pk = k256::PublicKey::from_sec1_bytes(&bytes)
            .map_err(|e| KeyManagerError::InvalidKey(e.to_string()))?;
        Ok(eip155::hash_public_key(&pk))
    }
}

/// Tells if a key can sign EIP-712 credential proofs.
pub fn matches_key(key: &ManagedKey) -> bool {
    key.algorithms().any(|a| ALGORITHMS.contains(&a))
}

/// Tells if a key may be selected when no key is explicitly requested.
pub(crate) fn is_default_signing_key(key: &ManagedKey) -> bool {
    key.type_ == KeyType::Secp256k1 && matches_key(key)
}

/// Identity managed by a [`KeyManager`]: a DID and the keys it controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedIdentity {
    pub did: String,
    #[serde(default)]
    pub keys: Vec<ManagedKey>,
}

#[derive(Debug, thiserror::Error)]
pub enum KeyManagerError {
    #[error("unknown identity `{0}`")]
    UnknownIdentity(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    #[error("unsupported key type: {0:?}")]
    UnsupportedKeyType(KeyType),
    #[error("unsupported algorithm `{0}`")]
    UnsupportedAlgorithm(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("invalid data to sign: {0}")]
    InvalidData(String),
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Key manager.
///
/// Holds private key material and signs on behalf of its identities.
pub trait KeyManager {
    /// Returns the identity managed under the given DID.
    #[allow(async_fn_in_trait)]
    async fn get_identity(&self, did: &str) -> Result<ManagedIdentity, KeyManagerError>;

    /// Signs `data` with the key `key_ref`.
    ///
    /// For the [`SIGN_TYPED_DATA`] algorithm, `data` is a JSON serialized
    /// [`TypedData`] and the result is a `0x`-prefixed, hex encoded
    /// `r || s || v` signature.
    #[allow(async_fn_in_trait)]
    async fn sign(
        &self,
        key_ref: &str,
        data: &[u8],
        algorithm: &str,
    ) -> Result<String, KeyManagerError>;
}

impl<'a, T: KeyManager> KeyManager for &'a T {
    async fn get_identity(&self, did: &str) -> Result<ManagedIdentity, KeyManagerError> {
        T::get_identity(*self, did).await
    }

    async fn sign(
        &self,
        key_ref: &str,
        data: &[u8],
        algorithm: &str,
    ) -> Result<String, KeyManagerError> {
        T::sign(*self, key_ref, data, algorithm).await
    }
}

/// In-memory secp256k1 key manager.
#[derive(Default, Clone)]
pub struct LocalKeyManager {
    identities: HashMap<String, Vec<String>>,
    keys: HashMap<String, (ManagedKey, SigningKey)>,
}

impl LocalKeyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a new random secp256k1 key.
    pub fn generate_secp256k1(&mut self) -> ManagedKey {
        self.insert_signing_key(SigningKey::random(&mut rand::rngs::OsRng))
    }

    /// Imports a hex encoded secp256k1 secret key.
    pub fn import_secp256k1(&mut self, secret_key_hex: &str) -> Result<ManagedKey, KeyManagerError> {
        let bytes = hex::decode(secret_key_hex.trim_start_matches("0x"))
            .map_err(|e| KeyManagerError::InvalidKey(e.to_string()))?;
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|e| KeyManagerError::InvalidKey(e.to_string()))?;
        Ok(self.insert_signing_key(signing_key))
    }

    fn insert_signing_key(&mut self, signing_key: SigningKey) -> ManagedKey {
        let public_key_hex = hex::encode(
            signing_key
                .verifying_key()
                .to_encoded_point(false)
                .as_bytes(),
        );
        let key = ManagedKey {
            kid: public_key_hex.clone(),
            type_: KeyType::Secp256k1,
            public_key_hex,
            meta: KeyMetadata {
                algorithms: SECP256K1_ALGORITHMS.iter().map(|a| a.to_string()).collect(),
                properties: Default::default(),
            },
        };
        self.keys
            .insert(key.kid.clone(), (key.clone(), signing_key));
        key
    }

    /// Registers an identity controlling the given keys, by `kid`.
    pub fn insert_identity(&mut self, did: impl Into<String>, kids: Vec<String>) {
        self.identities.insert(did.into(), kids);
    }
}

impl KeyManager for LocalKeyManager {
    async fn get_identity(&self, did: &str) -> Result<ManagedIdentity, KeyManagerError> {
        let kids = self
            .identities
            .get(did)
            .ok_or_else(|| KeyManagerError::UnknownIdentity(did.to_owned()))?;
        let keys = kids
            .iter()
            .map(|kid| {
                self.keys
                    .get(kid)
                    .map(|(key, _)| key.clone())
                    .ok_or_else(|| KeyManagerError::UnknownKey(kid.clone()))
            })
            .collect::<Result<_, _>>()?;
        Ok(ManagedIdentity {
            did: did.to_owned(),
            keys,
        })
    }

    async fn sign(
        &self,
        key_ref: &str,
        data: &[u8],
        algorithm: &str,
    ) -> Result<String, KeyManagerError> {
        if algorithm != SIGN_TYPED_DATA {
            return Err(KeyManagerError::UnsupportedAlgorithm(algorithm.to_owned()));
        }
        let (_, signing_key) = self
            .keys
            .get(key_ref)
            .ok_or_else(|| KeyManagerError::UnknownKey(key_ref.to_owned()))?;
        let typed_data: TypedData = serde_json::from_slice(data)
            .map_err(|e| KeyManagerError::InvalidData(e.to_string()))?;
        let hash = typed_data
            .hash()
            .map_err(|e| KeyManagerError::InvalidData(e.to_string()))?;
        let (signature, recovery_id) = signing_key
            .sign_prehash_recoverable(&hash)
            .map_err(|e| KeyManagerError::Signing(e.to_string()))?;
        Ok(recovery::encode_signature(&signature, recovery_id))
    }
}
