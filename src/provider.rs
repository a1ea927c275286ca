use eip712_dids::DIDResolver;
use serde_json::Value;

use crate::{
    key::{self, KeyManager, ManagedKey},
    recovery::{Secp256k1Recovery, SignatureRecovery},
    Error, IssueOptions, ProofRole, VerifyOptions, VerifyResult, PROOF_TYPE,
};

/// Credential provider issuing and verifying `EthereumEip712Signature2021`
/// proofs.
///
/// Collaborators are given at construction: the key manager signing on
/// behalf of issuers and holders, the DID resolver, and the signature
/// recovery primitive.
#[derive(Debug, Clone)]
pub struct CredentialProviderEip712<K, R, S = Secp256k1Recovery> {
    key_manager: K,
    resolver: R,
    recovery: S,
}

impl<K, R> CredentialProviderEip712<K, R> {
    pub fn new(key_manager: K, resolver: R) -> Self {
        Self::with_recovery(key_manager, resolver, Secp256k1Recovery)
    }
}

impl<K, R, S> CredentialProviderEip712<K, R, S> {
    pub fn with_recovery(key_manager: K, resolver: R, recovery: S) -> Self {
        Self {
            key_manager,
            resolver,
            recovery,
        }
    }

    pub fn key_manager(&self) -> &K {
        &self.key_manager
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Proof format produced by this provider.
    pub fn type_proof_format(&self) -> &'static str {
        PROOF_TYPE
    }

    pub fn supports_proof_type(&self, proof_format: &str) -> bool {
        proof_format == PROOF_TYPE
    }

    pub fn can_issue_credential_type(&self, proof_format: &str) -> bool {
        self.supports_proof_type(proof_format)
    }

    /// Tells if the document carries a proof this provider can verify.
    pub fn can_verify_document_type(&self, document: &Value) -> bool {
        document.pointer("/proof/type").and_then(Value::as_str) == Some(PROOF_TYPE)
    }

    pub fn supports_key(&self, key: &ManagedKey) -> bool {
        key::matches_key(key)
    }
}

impl<K: KeyManager, R: DIDResolver, S: SignatureRecovery> CredentialProviderEip712<K, R, S> {
    pub async fn issue(
        &self,
        document: &Value,
        role: ProofRole,
        options: &IssueOptions,
    ) -> Result<Value, Error> {
        crate::issue(document, role, options, &self.key_manager, &self.resolver).await
    }

    pub async fn verify(
        &self,
        document: &Value,
        role: ProofRole,
        _options: &VerifyOptions,
    ) -> Result<VerifyResult, Error> {
        crate::verify(document, role, &self.resolver, &self.recovery).await
    }

    pub async fn issue_credential(
        &self,
        credential: &Value,
        options: &IssueOptions,
    ) -> Result<Value, Error> {
        self.issue(credential, ProofRole::Credential, options).await
    }

    pub async fn issue_presentation(
        &self,
        presentation: &Value,
        options: &IssueOptions,
    ) -> Result<Value, Error> {
        self.issue(presentation, ProofRole::Presentation, options)
            .await
    }

    pub async fn verify_credential(
        &self,
        credential: &Value,
        options: &VerifyOptions,
    ) -> Result<VerifyResult, Error> {
        self.verify(credential, ProofRole::Credential, options)
            .await
    }

    pub async fn verify_presentation(
        &self,
        presentation: &Value,
        options: &VerifyOptions,
    ) -> Result<VerifyResult, Error> {
        self.verify(presentation, ProofRole::Presentation, options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::LocalKeyManager;
    use eip712_dids::StaticDIDResolver;
    use serde_json::json;

    #[test]
    fn proof_types() {
        let provider = CredentialProviderEip712::new(LocalKeyManager::new(), StaticDIDResolver::new());
        assert_eq!(provider.type_proof_format(), "EthereumEip712Signature2021");
        assert!(provider.can_issue_credential_type("EthereumEip712Signature2021"));
        assert!(!provider.can_issue_credential_type("Ed25519Signature2018"));
        assert!(provider.can_verify_document_type(&json!({
            "proof": { "type": "EthereumEip712Signature2021" }
        })));
        assert!(!provider.can_verify_document_type(&json!({
            "proof": { "type": "JwtProof2020" }
        })));
        assert!(!provider.can_verify_document_type(&json!({})));
    }
}
