//! Signer recovery from EIP-712 signatures.
use eip712_dids::eip155;
use eip712_typed_data::TypedData;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("Unable to hash typed data: {0}")]
    Hash(#[from] eip712_typed_data::TypedDataHashError),
    #[error("Expected `0x`-prefixed hex signature")]
    SignatureEncoding,
    #[error("Expected signature length 65 but found {0}")]
    SignatureLength(usize),
    #[error("Invalid recovery id: {0}")]
    RecoveryId(u8),
    #[error("Invalid signature: {0}")]
    Signature(String),
}

/// Recovers the address of the signer of some typed data.
pub trait SignatureRecovery {
    /// Returns the lowercase Ethereum address that produced `signature` over
    /// `typed_data`.
    fn recover(&self, typed_data: &TypedData, signature: &str) -> Result<String, RecoveryError>;
}

impl<'a, T: SignatureRecovery> SignatureRecovery for &'a T {
    fn recover(&self, typed_data: &TypedData, signature: &str) -> Result<String, RecoveryError> {
        T::recover(*self, typed_data, signature)
    }
}

/// `eth_signTypedData` (v4) signature recovery.
#[derive(Debug, Default, Clone, Copy)]
pub struct Secp256k1Recovery;

impl SignatureRecovery for Secp256k1Recovery {
    fn recover(&self, typed_data: &TypedData, signature: &str) -> Result<String, RecoveryError> {
        let hash = typed_data.hash()?;
        let (signature, recovery_id) = decode_signature(signature)?;
        let verifying_key = VerifyingKey::recover_from_prehash(&hash, &signature, recovery_id)
            .map_err(|e| RecoveryError::Signature(e.to_string()))?;
        Ok(eip155::hash_public_key(&k256::PublicKey::from(verifying_key)))
    }
}

/// Encodes a signature as `0x`-prefixed hex of `r || s || v`.
pub(crate) fn encode_signature(signature: &Signature, recovery_id: RecoveryId) -> String {
    let mut bytes = signature.to_bytes().to_vec();
    // Recovery ID starts at 27 instead of 0.
    bytes.push(recovery_id.to_byte() + 27);
    eip155::bytes_to_lowerhex(&bytes)
}

fn decode_signature(signature: &str) -> Result<(Signature, RecoveryId), RecoveryError> {
    let bytes = signature
        .strip_prefix("0x")
        .and_then(|hex_str| hex::decode(hex_str).ok())
        .ok_or(RecoveryError::SignatureEncoding)?;
    if bytes.len() != 65 {
        return Err(RecoveryError::SignatureLength(bytes.len()));
    }
    let v = bytes[64];
    let recovery_id = match v {
        0 | 1 => RecoveryId::from_byte(v),
        27 | 28 => RecoveryId::from_byte(v - 27),
        _ => None,
    }
    .ok_or(RecoveryError::RecoveryId(v))?;
    let signature =
        Signature::from_slice(&bytes[..64]).map_err(|e| RecoveryError::Signature(e.to_string()))?;
    Ok((signature, recovery_id))
}
